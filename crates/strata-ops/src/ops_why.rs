//! Operation: explain why a module is in the tree.

use std::path::Path;

use strata_core::config::GlobalConfig;
use strata_core::module_id::ModuleId;
use strata_resolver::ResolveResult;

use crate::ops_resolve::{resolve_project, ResolveOptions};

/// Options for `strata why`.
#[derive(Debug, Clone, Default)]
pub struct WhyOptions {
    pub resolve: ResolveOptions,
    /// `group:name` of the module to explain.
    pub module: String,
}

pub async fn why(project_root: &Path, config: &GlobalConfig, opts: &WhyOptions) -> miette::Result<()> {
    let module = ModuleId::parse(&opts.module)?;
    let resolved = resolve_project(project_root, config, &opts.resolve).await?;
    print!("{}", explain(&resolved.result, &module));
    Ok(())
}

/// The path from the root to the first live occurrence of `module`, one node per line.
pub fn explain(result: &ResolveResult, module: &ModuleId) -> String {
    let tree = result.dependency_tree();
    let Some(path) = tree.find_path(module) else {
        return format!("{module} is not in the resolved tree.\n");
    };

    let mut out = format!("Path to {module}:\n");
    for (i, node) in path.iter().enumerate() {
        out.push_str(&"  ".repeat(i));
        out.push_str(&node.label());
        out.push('\n');
    }
    if let Some(info) = path.get(1).and_then(|n| n.module_info()) {
        if &info.module != module {
            out.push_str(&format!("Brought in by {}\n", info.module));
        }
    }
    // The first direct dependency whose subtree mentions the module at any
    // version, evicted branches included, when the path above went elsewhere.
    let root = tree.root();
    if let Some(first) = root.root_ancestor(module).and_then(|n| n.module_info()) {
        let via_path = path.get(1).and_then(|n| n.module_info()).map(|m| &m.module);
        if &first.module != module && Some(&first.module) != via_path {
            out.push_str(&format!("Also requested through {}\n", first.module));
        }
    }
    out
}
