//! Core data types for the Strata dependency resolver.
//!
//! This crate defines the value types a resolution works on: module ids,
//! versions and version ranges, scopes and their hierarchy, scope mappings,
//! scoped dependencies and dependency sets, plus the `Strata.toml` manifest
//! and the global configuration file.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod dependency;
pub mod dependency_set;
pub mod manifest;
pub mod module_id;
pub mod scope;
pub mod scope_mapping;
pub mod version;
pub mod version_provider;

pub use dependency::{
    Dependency, Exclusion, FileDependency, ModuleDependency, ScopeSpec, ScopeType,
    ScopedDependency, Transitivity,
};
pub use dependency_set::DependencySet;
pub use module_id::ModuleId;
pub use scope::{Scope, ScopeRegistry};
pub use scope_mapping::ScopeMapping;
pub use version::{Version, VersionRange};
pub use version_provider::VersionProvider;
