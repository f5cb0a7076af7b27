//! Handler for `strata conflicts`.

use miette::Result;
use strata_ops::ops_conflicts;
use strata_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions) -> Result<()> {
    let project_root = super::project_root()?;
    let config = super::global_config()?;
    super::block_on(ops_conflicts::conflicts(&project_root, &config, &resolve))
}
