//! The repository collaborator consulted during resolution: a module's own
//! declared dependencies, its available versions, and its artifact files.

pub mod descriptor;
pub mod error;
pub mod local;
pub mod memory;
pub mod repository;

pub use error::RepositoryError;
pub use local::LocalRepository;
pub use memory::MemoryRepository;
pub use repository::{DeclaredDependency, Repository};
