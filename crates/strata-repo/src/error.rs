use miette::Diagnostic;
use thiserror::Error;

/// Failures reported by a [`Repository`](crate::Repository).
#[derive(Debug, Error, Diagnostic)]
pub enum RepositoryError {
    /// The module, or the requested version of it, is not in the repository.
    #[error("Module not found: {module}")]
    ModuleNotFound { module: String },

    /// The module exists but the requested artifact file does not.
    #[error("Artifact not found: {path}")]
    ArtifactNotFound { path: String },

    /// The repository could not be reached.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The module's descriptor could not be read.
    #[error("Invalid descriptor for {module}: {message}")]
    #[diagnostic(help("Each version directory may hold a module.toml listing [[dependencies]]"))]
    Descriptor { module: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
