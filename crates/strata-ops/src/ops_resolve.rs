//! Operation: resolve a project's dependencies against the local repository.
//!
//! Shared by every command that needs a resolved tree.

use std::path::Path;
use std::sync::Arc;

use strata_core::config::GlobalConfig;
use strata_core::manifest::{Manifest, Project, MANIFEST_FILE};
use strata_core::scope::Scope;
use strata_repo::LocalRepository;
use strata_resolver::{ResolveResult, Resolver, ResolverConfig};
use strata_util::progress::{spinner, status, status_warn};

/// Options shared by the resolving commands.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Target scope names; empty means every declared scope.
    pub scopes: Vec<String>,
    /// Fail on the first repository failure.
    pub strict: bool,
    /// Print the conflict report after resolving.
    pub verbose: bool,
}

/// A project together with its resolution.
pub struct ResolvedProject {
    pub project: Project,
    pub targets: Vec<Scope>,
    pub result: ResolveResult,
}

/// Load `Strata.toml` from `project_root`, then resolve it with `config`.
pub async fn resolve_project(
    project_root: &Path,
    config: &GlobalConfig,
    opts: &ResolveOptions,
) -> miette::Result<ResolvedProject> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;
    let project = manifest.to_project(project_root)?;

    let targets = opts
        .scopes
        .iter()
        .map(|name| project.registry.require(name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut resolver_config = ResolverConfig::from_settings(&config.resolve, project.registry.clone())?;
    if opts.strict {
        resolver_config = resolver_config.with_fail_fast(true);
    }
    if let Some((module, version)) = &project.holder {
        resolver_config = resolver_config.with_module_holder(module.clone(), version.clone());
    }

    let repository_path = config.repository.resolved_path();
    tracing::debug!("using repository at {}", repository_path.display());
    let resolver = Resolver::new(Arc::new(LocalRepository::new(repository_path)), resolver_config);

    status(
        "Resolving",
        &format!("{} declared dependencies", project.dependencies.len()),
    );
    let sp = spinner("Resolving dependencies...");
    let resolved = resolver.resolve(&project.dependencies, &targets).await;
    sp.finish_and_clear();
    let result = resolved?;

    for failure in result.errors() {
        status_warn("Warning", &failure.to_string());
    }
    if opts.strict {
        result.assert_no_error()?;
    }
    if opts.verbose && !result.conflicts().is_empty() {
        eprintln!("{}", result.conflicts());
    }
    status(
        "Resolved",
        &format!(
            "{} modules, {} files",
            result.version_provider.len(),
            result.files.len()
        ),
    );

    Ok(ResolvedProject {
        project,
        targets,
        result,
    })
}
