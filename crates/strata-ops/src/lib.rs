pub mod ops_conflicts;
pub mod ops_files;
pub mod ops_resolve;
pub mod ops_tree;
pub mod ops_versions;
pub mod ops_why;

pub use ops_resolve::{resolve_project, ResolveOptions, ResolvedProject};
