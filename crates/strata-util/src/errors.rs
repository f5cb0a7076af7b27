use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Strata operations.
#[derive(Debug, Error, Diagnostic)]
pub enum StrataError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (e.g. Strata.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Strata.toml for syntax errors"))]
    Manifest { message: String },

    /// Invalid global configuration.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.strata/config.toml"))]
    Config { message: String },

    /// A version string could not be parsed.
    #[error("Malformed version '{input}': {reason}")]
    MalformedVersion { input: String, reason: String },

    /// A scope would (transitively) extend itself.
    #[error("Scope cycle: '{scope}' cannot extend '{parent}'")]
    #[diagnostic(help("The extends relationship between scopes must be acyclic"))]
    ScopeCycle { scope: String, parent: String },

    /// A scope mapping lookup found no target configurations.
    #[error("No mapped scope declared for '{scope}'. Declared scopes are [{declared}]")]
    #[diagnostic(help("Add a mapping entry for this scope or declare the dependency with simple scopes"))]
    UnmappedScope { scope: String, declared: String },

    /// A dependency has no version and none could be provided.
    #[error("No version specified for '{module}' and none provided")]
    #[diagnostic(help("Declare a version or add the module to the version provider ([versions])"))]
    UnresolvedVersion { module: String },

    /// Dependency resolution failed (unreachable modules, timeouts, etc.).
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type StrataResult<T> = miette::Result<T>;
