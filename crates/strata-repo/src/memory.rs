//! An in-process repository, for tests and for embedding the resolver.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use strata_core::module_id::{ModuleCoordinate, ModuleId};
use strata_core::version::Version;
use strata_util::errors::StrataError;

use crate::error::RepositoryError;
use crate::repository::{artifact_file_name, coordinate_path, DeclaredDependency, Repository};

/// Modules held in memory. Artifact paths point below `root` and are not
/// created on disk.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    root: PathBuf,
    modules: BTreeMap<ModuleId, BTreeMap<String, (Version, Vec<DeclaredDependency>)>>,
    unreachable: BTreeSet<ModuleId>,
    latency: Option<Duration>,
    fetches: Mutex<HashMap<(ModuleId, String), usize>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("memory"),
            ..Self::default()
        }
    }

    /// Directory artifact paths are reported under.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Publish `coordinate` (`group:name:version`) with dependencies given as
    /// `(coordinate, configuration)` pairs.
    pub fn module(self, coordinate: &str, dependencies: &[(&str, &str)]) -> Result<Self, StrataError> {
        let declared = dependencies
            .iter()
            .map(|(dep, conf)| DeclaredDependency::parse(dep, conf))
            .collect::<Result<Vec<_>, _>>()?;
        self.module_with(coordinate, declared)
    }

    /// Publish `coordinate` with fully specified dependencies.
    pub fn module_with(mut self, coordinate: &str, dependencies: Vec<DeclaredDependency>) -> Result<Self, StrataError> {
        let parsed = ModuleCoordinate::parse(coordinate)?;
        let version = Version::parse(&parsed.version)?;
        self.modules
            .entry(parsed.module_id)
            .or_default()
            .insert(version.as_str().to_string(), (version, dependencies));
        Ok(self)
    }

    /// Make every request about `module` fail with a network error.
    pub fn unreachable(mut self, module: ModuleId) -> Self {
        self.unreachable.insert(module);
        self
    }

    /// Delay every declared-dependency fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// How many times the declared dependencies of `module` at `version` were fetched.
    pub fn fetch_count(&self, module: &ModuleId, version: &str) -> usize {
        self.fetches
            .lock()
            .map(|f| f.get(&(module.clone(), version.to_string())).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Whether `module` was fetched at any version.
    pub fn was_fetched(&self, module: &ModuleId) -> bool {
        self.fetches
            .lock()
            .map(|f| f.keys().any(|(m, _)| m == module))
            .unwrap_or(false)
    }

    fn check_reachable(&self, module: &ModuleId) -> Result<(), RepositoryError> {
        if self.unreachable.contains(module) {
            return Err(RepositoryError::Network {
                message: format!("connection refused while fetching {module}"),
            });
        }
        Ok(())
    }

    fn lookup(&self, module: &ModuleId, version: &Version) -> Result<&(Version, Vec<DeclaredDependency>), RepositoryError> {
        self.modules
            .get(module)
            .and_then(|versions| versions.get(version.as_str()))
            .ok_or_else(|| RepositoryError::ModuleNotFound {
                module: format!("{module}:{version}"),
            })
    }
}

impl Repository for MemoryRepository {
    async fn fetch_declared_dependencies(
        &self,
        module: &ModuleId,
        version: &Version,
    ) -> Result<Vec<DeclaredDependency>, RepositoryError> {
        if let Ok(mut fetches) = self.fetches.lock() {
            *fetches
                .entry((module.clone(), version.as_str().to_string()))
                .or_default() += 1;
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.check_reachable(module)?;
        Ok(self.lookup(module, version)?.1.clone())
    }

    async fn list_available_versions(&self, module: &ModuleId) -> Result<Vec<Version>, RepositoryError> {
        self.check_reachable(module)?;
        self.modules
            .get(module)
            .map(|versions| versions.values().map(|(v, _)| v.clone()).collect())
            .ok_or_else(|| RepositoryError::ModuleNotFound {
                module: module.to_string(),
            })
    }

    async fn fetch_artifact_file(
        &self,
        module: &ModuleId,
        version: &Version,
        classifier: Option<&str>,
        artifact_type: Option<&str>,
    ) -> Result<PathBuf, RepositoryError> {
        self.check_reachable(module)?;
        self.lookup(module, version)?;
        Ok(self
            .root
            .join(coordinate_path(module, version))
            .join(artifact_file_name(module, version, classifier, artifact_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> MemoryRepository {
        MemoryRepository::new()
            .module("org.a:a:1.0", &[("org.b:b:2.0", "compile")])
            .unwrap()
            .module("org.a:a:1.1", &[])
            .unwrap()
    }

    #[tokio::test]
    async fn fetch_counts_declared_dependency_lookups() {
        let repo = repo();
        let a = ModuleId::new("org.a", "a");
        let v = Version::parse("1.0").unwrap();
        let deps = repo.fetch_declared_dependencies(&a, &v).await.unwrap();
        assert_eq!(deps.len(), 1);
        repo.fetch_declared_dependencies(&a, &v).await.unwrap();
        assert_eq!(repo.fetch_count(&a, "1.0"), 2);
        assert!(repo.was_fetched(&a));
        assert!(!repo.was_fetched(&ModuleId::new("org.b", "b")));
    }

    #[tokio::test]
    async fn lists_versions_and_reports_missing_modules() {
        let repo = repo();
        let mut versions = repo
            .list_available_versions(&ModuleId::new("org.a", "a"))
            .await
            .unwrap();
        versions.sort();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1].as_str(), "1.1");

        let err = repo
            .list_available_versions(&ModuleId::new("org.x", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ModuleNotFound { .. }));
    }

    #[tokio::test]
    async fn unreachable_module_is_network_error() {
        let a = ModuleId::new("org.a", "a");
        let repo = repo().unreachable(a.clone());
        let err = repo
            .fetch_declared_dependencies(&a, &Version::parse("1.0").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Network { .. }));
    }

    #[tokio::test]
    async fn artifact_path_follows_layout() {
        let repo = repo().with_root("/repo");
        let path = repo
            .fetch_artifact_file(
                &ModuleId::new("org.a", "a"),
                &Version::parse("1.0").unwrap(),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from("/repo/org/a/a/1.0/a-1.0.jar"));
    }
}
