//! `module.toml` descriptors stored beside each published module version.
//!
//! ```toml
//! [[dependencies]]
//! module = "org.yaml:snakeyaml:1.17"
//! configuration = "runtime"
//! exclusions = ["junit:junit"]
//! transitivity = "all"
//! ```

use serde::{Deserialize, Serialize};
use strata_core::dependency::{Exclusion, Transitivity};
use strata_core::module_id::ModuleId;

use crate::error::RepositoryError;
use crate::repository::DeclaredDependency;

/// File name of a module descriptor inside a version directory.
pub const DESCRIPTOR_FILE: &str = "module.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(default)]
    pub dependencies: Vec<DescriptorEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorEntry {
    pub module: String,
    #[serde(default = "default_configuration")]
    pub configuration: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default_transitivity")]
    pub transitivity: Transitivity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
}

fn default_configuration() -> String {
    strata_core::scope::COMPILE.to_string()
}

fn is_default_transitivity(t: &Transitivity) -> bool {
    *t == Transitivity::All
}

impl ModuleDescriptor {
    pub fn parse(owner: &ModuleId, content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| RepositoryError::Descriptor {
            module: owner.to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_dependencies(dependencies: &[DeclaredDependency]) -> Self {
        Self {
            dependencies: dependencies.iter().map(DescriptorEntry::from).collect(),
        }
    }

    pub fn to_toml(&self) -> String {
        // Only strings, sequences and enums: serialization cannot fail.
        toml::to_string(self).unwrap_or_default()
    }

    /// Convert entries, reporting the first malformed one against `owner`.
    pub fn declared_dependencies(&self, owner: &ModuleId) -> Result<Vec<DeclaredDependency>, RepositoryError> {
        let invalid = |e: strata_util::errors::StrataError| RepositoryError::Descriptor {
            module: owner.to_string(),
            message: e.to_string(),
        };
        self.dependencies
            .iter()
            .map(|entry| {
                let mut dep = DeclaredDependency::parse(&entry.module, &entry.configuration)
                    .map_err(invalid)?
                    .with_transitivity(entry.transitivity);
                for exclusion in &entry.exclusions {
                    dep = dep.excluding(Exclusion::parse(exclusion).map_err(invalid)?);
                }
                dep.classifier = entry.classifier.clone();
                dep.artifact_type = entry.artifact_type.clone();
                Ok(dep)
            })
            .collect()
    }
}

impl From<&DeclaredDependency> for DescriptorEntry {
    fn from(dep: &DeclaredDependency) -> Self {
        Self {
            module: format!("{}:{}", dep.module, dep.version),
            configuration: dep.configuration.clone(),
            exclusions: dep.exclusions.iter().map(ToString::to_string).collect(),
            transitivity: dep.transitivity,
            classifier: dep.classifier.clone(),
            artifact_type: dep.artifact_type.clone(),
        }
    }
}
