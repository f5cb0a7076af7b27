//! Operation: display the dependency tree.

use std::path::Path;

use strata_core::config::GlobalConfig;
use strata_resolver::ResolveResult;

use crate::ops_resolve::{resolve_project, ResolveOptions};

/// Options for `strata tree`.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub resolve: ResolveOptions,
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
}

/// Display the dependency tree for the project.
pub async fn tree(project_root: &Path, config: &GlobalConfig, opts: &TreeOptions) -> miette::Result<()> {
    let resolved = resolve_project(project_root, config, &opts.resolve).await?;
    print!("{}", render_tree(&resolved.result, opts.depth));
    Ok(())
}

/// The rendered tree, or a placeholder line when nothing was declared.
pub fn render_tree(result: &ResolveResult, depth: Option<usize>) -> String {
    if result.tree.root().children().is_empty() {
        return "No dependencies.\n".to_string();
    }
    result.tree.render(depth)
}
