use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use strata_core::dependency::{Exclusion, Transitivity};
use strata_core::module_id::{ModuleCoordinate, ModuleId};
use strata_core::version::{Version, VersionRange};
use strata_util::errors::StrataError;

use crate::error::RepositoryError;

/// Default artifact type when a dependency names none.
pub const DEFAULT_ARTIFACT_TYPE: &str = "jar";

/// One dependency as declared by a published module, tagged with the
/// configuration of that module it belongs to (`compile`, `runtime`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub module: ModuleId,
    pub version: VersionRange,
    pub configuration: String,
    pub exclusions: Vec<Exclusion>,
    pub transitivity: Transitivity,
    pub classifier: Option<String>,
    pub artifact_type: Option<String>,
}

impl DeclaredDependency {
    pub fn new(module: ModuleId, version: VersionRange, configuration: impl Into<String>) -> Self {
        Self {
            module,
            version,
            configuration: configuration.into(),
            exclusions: Vec::new(),
            transitivity: Transitivity::All,
            classifier: None,
            artifact_type: None,
        }
    }

    /// Parse `"group:name:version"` declared for `configuration`.
    pub fn parse(description: &str, configuration: &str) -> Result<Self, StrataError> {
        let coordinate = ModuleCoordinate::parse(description)?;
        Ok(Self::new(
            coordinate.module_id,
            VersionRange::parse(&coordinate.version)?,
            configuration,
        ))
    }

    pub fn excluding(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    pub fn with_transitivity(mut self, transitivity: Transitivity) -> Self {
        self.transitivity = transitivity;
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = Some(artifact_type.into());
        self
    }
}

impl fmt::Display for DeclaredDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.module, self.version, self.configuration)
    }
}

/// Source of module metadata and artifacts.
///
/// Returned futures are `Send` so a resolver can fan requests out on a
/// multi-threaded runtime.
pub trait Repository: Send + Sync {
    /// Dependencies `module` at `version` declares, each tagged with its configuration.
    fn fetch_declared_dependencies(
        &self,
        module: &ModuleId,
        version: &Version,
    ) -> impl Future<Output = Result<Vec<DeclaredDependency>, RepositoryError>> + Send;

    /// Every published version of `module`, in no particular order.
    fn list_available_versions(
        &self,
        module: &ModuleId,
    ) -> impl Future<Output = Result<Vec<Version>, RepositoryError>> + Send;

    /// Local path of the artifact, downloading it first if the repository is remote.
    fn fetch_artifact_file(
        &self,
        module: &ModuleId,
        version: &Version,
        classifier: Option<&str>,
        artifact_type: Option<&str>,
    ) -> impl Future<Output = Result<PathBuf, RepositoryError>> + Send;
}

/// `<name>-<version>[-<classifier>].<type>`
pub fn artifact_file_name(
    module: &ModuleId,
    version: &Version,
    classifier: Option<&str>,
    artifact_type: Option<&str>,
) -> String {
    let extension = artifact_type.unwrap_or(DEFAULT_ARTIFACT_TYPE);
    match classifier {
        Some(c) => format!("{}-{version}-{c}.{extension}", module.name),
        None => format!("{}-{version}.{extension}", module.name),
    }
}

/// `<group as path>/<name>/<version>`
pub fn coordinate_path(module: &ModuleId, version: &Version) -> PathBuf {
    module_path(module).join(version.as_str())
}

/// `<group as path>/<name>`
pub fn module_path(module: &ModuleId) -> PathBuf {
    let mut path: PathBuf = module.group.split('.').collect();
    path.push(&module.name);
    path
}
