//! Handler for `strata tree`.

use miette::Result;
use strata_ops::ops_tree::{self, TreeOptions};
use strata_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions, depth: Option<usize>) -> Result<()> {
    let project_root = super::project_root()?;
    let config = super::global_config()?;
    let opts = TreeOptions { resolve, depth };
    super::block_on(ops_tree::tree(&project_root, &config, &opts))
}
