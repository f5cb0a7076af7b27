//! Handler for `strata versions`.

use miette::Result;
use strata_ops::ops_versions::{self, VersionsOptions};
use strata_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions, json: bool) -> Result<()> {
    let project_root = super::project_root()?;
    let config = super::global_config()?;
    let opts = VersionsOptions { resolve, json };
    super::block_on(ops_versions::versions(&project_root, &config, &opts))
}
