//! Handler for `strata why`.

use miette::Result;
use strata_ops::ops_why::{self, WhyOptions};
use strata_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions, module: String) -> Result<()> {
    let project_root = super::project_root()?;
    let config = super::global_config()?;
    let opts = WhyOptions { resolve, module };
    super::block_on(ops_why::why(&project_root, &config, &opts))
}
