//! Operation: show version conflicts.

use std::path::Path;

use strata_core::config::GlobalConfig;

use crate::ops_resolve::{resolve_project, ResolveOptions};

pub async fn conflicts(project_root: &Path, config: &GlobalConfig, opts: &ResolveOptions) -> miette::Result<()> {
    // The report goes to stdout here; keep resolve_project from also printing it.
    let opts = ResolveOptions {
        verbose: false,
        ..opts.clone()
    };
    let resolved = resolve_project(project_root, config, &opts).await?;
    let report = resolved.result.conflicts();
    if report.is_empty() {
        println!("{report}");
    } else {
        print!("{report}");
    }
    Ok(())
}
