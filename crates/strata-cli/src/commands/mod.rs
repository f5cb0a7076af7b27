//! Command dispatch and handler modules.

mod conflicts;
mod files;
mod tree;
mod versions;
mod why;

use std::future::Future;
use std::path::PathBuf;

use miette::Result;
use strata_core::config::GlobalConfig;
use strata_core::manifest::MANIFEST_FILE;
use strata_ops::ResolveOptions;
use strata_util::errors::StrataError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let resolve = |scopes: Vec<String>| ResolveOptions {
        scopes,
        strict: cli.strict,
        verbose: cli.verbose,
    };
    match cli.command {
        Command::Tree { scopes, depth } => tree::exec(resolve(scopes), depth),
        Command::Files { scopes, classpath } => files::exec(resolve(scopes), classpath),
        Command::Why { module, scopes } => why::exec(resolve(scopes), module),
        Command::Versions { scopes, json } => versions::exec(resolve(scopes), json),
        Command::Conflicts { scopes } => conflicts::exec(resolve(scopes)),
    }
}

/// The current directory, which must hold a `Strata.toml`.
fn project_root() -> Result<PathBuf> {
    let project_root = std::env::current_dir().map_err(StrataError::Io)?;
    if !project_root.join(MANIFEST_FILE).is_file() {
        return Err(StrataError::Manifest {
            message: format!("No {MANIFEST_FILE} found in current directory"),
        }
        .into());
    }
    Ok(project_root)
}

fn global_config() -> Result<GlobalConfig> {
    let path = GlobalConfig::default_path();
    tracing::debug!("loading global config from {}", path.display());
    Ok(GlobalConfig::load_from(&path)?)
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| StrataError::Generic {
        message: format!("Failed to start async runtime: {e}"),
    })?;
    rt.block_on(future)
}
