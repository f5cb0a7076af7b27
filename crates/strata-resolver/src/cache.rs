//! Per-call memo of repository answers.
//!
//! One cache lives for the duration of one `resolve` call, so a module reached
//! through several paths is fetched once and two calls never share answers.

use std::collections::HashMap;
use std::fmt;

use strata_core::module_id::ModuleId;
use strata_core::version::Version;
use strata_repo::{DeclaredDependency, RepositoryError};

use crate::result::FailureKind;

/// A remembered repository answer. Failures are kept by kind and message so
/// a module failing on one path is reported the same on every path.
pub type Fetched<T> = Result<T, FetchError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for FetchError {
    fn from(e: RepositoryError) -> Self {
        let kind = match &e {
            RepositoryError::ModuleNotFound { .. } => FailureKind::ModuleNotFound,
            RepositoryError::ArtifactNotFound { .. } => FailureKind::ArtifactNotFound,
            RepositoryError::Network { .. } => FailureKind::Network,
            RepositoryError::Descriptor { .. } => FailureKind::Descriptor,
            RepositoryError::Io(_) => FailureKind::Io,
        };
        Self::new(kind, e.to_string())
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Default)]
pub struct FetchCache {
    declared: HashMap<(ModuleId, String), Fetched<Vec<DeclaredDependency>>>,
    versions: HashMap<ModuleId, Fetched<Vec<Version>>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declared(&self, module: &ModuleId, version: &Version) -> Option<&Fetched<Vec<DeclaredDependency>>> {
        self.declared.get(&(module.clone(), version.as_str().to_string()))
    }

    pub fn has_declared(&self, module: &ModuleId, version: &Version) -> bool {
        self.declared(module, version).is_some()
    }

    pub fn insert_declared(&mut self, module: ModuleId, version: &Version, answer: Fetched<Vec<DeclaredDependency>>) {
        self.declared.insert((module, version.as_str().to_string()), answer);
    }

    pub fn versions(&self, module: &ModuleId) -> Option<&Fetched<Vec<Version>>> {
        self.versions.get(module)
    }

    pub fn insert_versions(&mut self, module: ModuleId, answer: Fetched<Vec<Version>>) {
        self.versions.insert(module, answer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_keyed_by_module_and_version() {
        let mut cache = FetchCache::new();
        let module = ModuleId::new("org.example", "lib");
        let v1 = Version::parse("1.0").unwrap();
        let v2 = Version::parse("2.0").unwrap();
        cache.insert_declared(module.clone(), &v1, Ok(Vec::new()));
        let missing = RepositoryError::ModuleNotFound {
            module: "org.example:lib:2.0".to_string(),
        };
        cache.insert_declared(module.clone(), &v2, Err(missing.into()));

        assert!(cache.has_declared(&module, &v1));
        match cache.declared(&module, &v2) {
            Some(Err(e)) => {
                assert_eq!(e.kind, FailureKind::ModuleNotFound);
                assert_eq!(e.to_string(), "Module not found: org.example:lib:2.0");
            }
            other => panic!("expected a failure, got {other:?}"),
        }
        assert!(!cache.has_declared(&ModuleId::new("org.example", "other"), &v1));
        assert!(cache.versions(&module).is_none());
    }
}
