//! Dependency resolution engine: scope-pruned tree expansion, configuration
//! mapping per level, exclusions, dynamic versions, conflict eviction, and
//! artifact collection.

pub mod cache;
pub mod config;
pub mod conflict;
pub mod resolver;
pub mod result;
pub mod tree;

pub use config::ResolverConfig;
pub use conflict::{ConflictReport, VersionConflict};
pub use resolver::Resolver;
pub use result::{FailureKind, ResolutionFailure, ResolveResult};
pub use tree::{DependencyNode, DependencyTree, ModuleNodeInfo, NodeInfo};
