//! Handler for `strata files`.

use miette::Result;
use strata_ops::ops_files::{self, FilesOptions};
use strata_ops::ResolveOptions;

pub fn exec(resolve: ResolveOptions, classpath: bool) -> Result<()> {
    let project_root = super::project_root()?;
    let config = super::global_config()?;
    let opts = FilesOptions { resolve, classpath };
    super::block_on(ops_files::files(&project_root, &config, &opts))
}
