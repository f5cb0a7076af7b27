//! Operation: list the resolved files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use strata_core::config::GlobalConfig;
use strata_util::errors::StrataError;

use crate::ops_resolve::{resolve_project, ResolveOptions};

/// Options for `strata files`.
#[derive(Debug, Clone, Default)]
pub struct FilesOptions {
    pub resolve: ResolveOptions,
    /// Print one platform path list instead of one file per line.
    pub classpath: bool,
}

pub async fn files(project_root: &Path, config: &GlobalConfig, opts: &FilesOptions) -> miette::Result<()> {
    let resolved = resolve_project(project_root, config, &opts.resolve).await?;
    if opts.classpath {
        println!("{}", classpath_string(&resolved.result.files)?.to_string_lossy());
    } else {
        for file in &resolved.result.files {
            println!("{}", file.display());
        }
    }
    Ok(())
}

/// Join files with the platform path separator.
pub fn classpath_string(files: &[PathBuf]) -> Result<OsString, StrataError> {
    std::env::join_paths(files).map_err(|e| StrataError::Generic {
        message: format!("cannot build classpath: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_platform_separator() {
        let files = vec![PathBuf::from("a.jar"), PathBuf::from("lib/b.jar")];
        let joined = classpath_string(&files).unwrap();
        let split: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(split, files);
    }

    #[test]
    fn empty_classpath() {
        assert!(classpath_string(&[]).unwrap().is_empty());
    }
}
