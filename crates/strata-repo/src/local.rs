//! A repository on the local filesystem.
//!
//! Layout: `<root>/<group-path>/<name>/<version>/` holding an optional
//! `module.toml` descriptor and the module's artifacts. The version
//! directories of a module are its available versions.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use strata_core::module_id::ModuleId;
use strata_core::version::Version;

use crate::descriptor::{ModuleDescriptor, DESCRIPTOR_FILE};
use crate::error::RepositoryError;
use crate::repository::{
    artifact_file_name, coordinate_path, module_path, DeclaredDependency, Repository,
};

#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this repository.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one version of a module.
    pub fn version_dir(&self, module: &ModuleId, version: &Version) -> PathBuf {
        self.root.join(coordinate_path(module, version))
    }

    /// Write a module version: its descriptor and, optionally, its main artifact.
    ///
    /// Returns the version directory.
    pub async fn install(
        &self,
        module: &ModuleId,
        version: &Version,
        dependencies: &[DeclaredDependency],
        artifact: Option<&[u8]>,
    ) -> Result<PathBuf, RepositoryError> {
        let dir = self.version_dir(module, version);
        tokio::fs::create_dir_all(&dir).await?;
        let descriptor = ModuleDescriptor::from_dependencies(dependencies);
        tokio::fs::write(dir.join(DESCRIPTOR_FILE), descriptor.to_toml()).await?;
        if let Some(bytes) = artifact {
            let file = dir.join(artifact_file_name(module, version, None, None));
            tokio::fs::write(file, bytes).await?;
        }
        tracing::debug!("installed {module}:{version} into {}", dir.display());
        Ok(dir)
    }
}

impl Repository for LocalRepository {
    async fn fetch_declared_dependencies(
        &self,
        module: &ModuleId,
        version: &Version,
    ) -> Result<Vec<DeclaredDependency>, RepositoryError> {
        let dir = self.version_dir(module, version);
        match tokio::fs::read_to_string(dir.join(DESCRIPTOR_FILE)).await {
            Ok(content) => ModuleDescriptor::parse(module, &content)?.declared_dependencies(module),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if tokio::fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
                    // A version directory without descriptor declares nothing.
                    Ok(Vec::new())
                } else {
                    Err(RepositoryError::ModuleNotFound {
                        module: format!("{module}:{version}"),
                    })
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_available_versions(&self, module: &ModuleId) -> Result<Vec<Version>, RepositoryError> {
        let dir = self.root.join(module_path(module));
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RepositoryError::ModuleNotFound {
                    module: module.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            match Version::parse(&name.to_string_lossy()) {
                Ok(version) => versions.push(version),
                Err(_) => tracing::debug!("skipping {} in {}", name.to_string_lossy(), dir.display()),
            }
        }
        versions.sort();
        Ok(versions)
    }

    async fn fetch_artifact_file(
        &self,
        module: &ModuleId,
        version: &Version,
        classifier: Option<&str>,
        artifact_type: Option<&str>,
    ) -> Result<PathBuf, RepositoryError> {
        let path = self
            .version_dir(module, version)
            .join(artifact_file_name(module, version, classifier, artifact_type));
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(RepositoryError::ArtifactNotFound {
                path: path.display().to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RepositoryError::ArtifactNotFound {
                path: path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
