use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use strata_util::errors::StrataError;

use crate::dependency::{
    Exclusion, FileDependency, ModuleDependency, ScopedDependency, Transitivity,
};
use crate::dependency_set::DependencySet;
use crate::module_id::ModuleId;
use crate::scope::{Scope, ScopeRegistry};
use crate::scope_mapping::ScopeMapping;
use crate::version::Version;
use crate::version_provider::VersionProvider;

/// File name of a project manifest.
pub const MANIFEST_FILE: &str = "Strata.toml";

/// The parsed representation of a `Strata.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub package: Option<PackageMetadata>,

    /// Extra scopes: `name = [parents]`.
    #[serde(default)]
    pub scopes: BTreeMap<String, Vec<String>>,

    /// Pinned versions, keyed by `group:name`.
    #[serde(default)]
    pub versions: BTreeMap<String, String>,

    /// Exclusions applied to the whole tree.
    #[serde(default)]
    pub exclusions: Vec<String>,

    /// Scopes given to dependencies declared without any.
    #[serde(default, rename = "default-scopes")]
    pub default_scopes: Vec<String>,

    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

/// Project identity from the `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub group: String,
    pub name: String,
    pub version: String,
}

/// One `[[dependencies]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyEntry {
    /// `group:name[:version]`
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub mapping: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub transitivity: Option<Transitivity>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default, rename = "type")]
    pub artifact_type: Option<String>,
}

/// Everything a manifest declares, in resolver terms.
#[derive(Debug, Clone)]
pub struct Project {
    pub holder: Option<(ModuleId, Version)>,
    pub registry: ScopeRegistry,
    pub dependencies: DependencySet,
}

impl Manifest {
    /// Load and parse a `Strata.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_str(&content)
    }

    /// Parse a `Strata.toml` from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            StrataError::Manifest {
                message: format!("Failed to parse Strata.toml: {e}"),
            }
            .into()
        })
    }

    /// Build the scope registry, the dependency set and the module holder.
    ///
    /// Relative file dependencies are resolved against `base_dir`.
    pub fn to_project(&self, base_dir: &Path) -> Result<Project, StrataError> {
        let mut registry = ScopeRegistry::standard();
        registry.define_all(&self.scopes)?;

        let holder = match &self.package {
            Some(package) => Some((
                ModuleId::new(&package.group, &package.name),
                Version::parse(&package.version)?,
            )),
            None => None,
        };

        let mut provider = VersionProvider::new();
        for (module, version) in &self.versions {
            provider.insert(ModuleId::parse(module)?, Version::parse(version)?);
        }

        let exclusions = self
            .exclusions
            .iter()
            .map(|e| Exclusion::parse(e))
            .collect::<Result<Vec<_>, _>>()?;

        let default_scopes = scopes_named(&registry, &self.default_scopes)?;

        let mut dependencies = DependencySet::new()
            .with_version_provider(provider)
            .with_global_exclusions(exclusions);
        if !default_scopes.is_empty() {
            dependencies = dependencies.with_default_scopes(&default_scopes);
        }
        for (index, entry) in self.dependencies.iter().enumerate() {
            let scoped = entry.to_scoped(&registry, base_dir).map_err(|e| match e {
                StrataError::Manifest { message } => StrataError::Manifest {
                    message: format!("dependency #{}: {message}", index + 1),
                },
                other => other,
            })?;
            dependencies = dependencies.and(scoped);
        }

        Ok(Project {
            holder,
            registry,
            dependencies,
        })
    }
}

impl DependencyEntry {
    fn to_scoped(&self, registry: &ScopeRegistry, base_dir: &Path) -> Result<ScopedDependency, StrataError> {
        let dependency: crate::dependency::Dependency = match (&self.module, self.files.is_empty()) {
            (Some(module), true) => {
                let mut dep = ModuleDependency::parse(module)?;
                for exclusion in &self.exclusions {
                    dep = dep.excluding(Exclusion::parse(exclusion)?);
                }
                if let Some(transitivity) = self.transitivity {
                    dep = dep.with_transitivity(transitivity);
                }
                if let Some(classifier) = &self.classifier {
                    dep = dep.with_classifier(classifier);
                }
                if let Some(artifact_type) = &self.artifact_type {
                    dep = dep.with_type(artifact_type);
                }
                dep.into()
            }
            (None, false) => FileDependency::new(self.files.iter().map(|f| base_dir.join(f))).into(),
            (Some(_), false) => {
                return Err(StrataError::Manifest {
                    message: "'module' and 'files' are mutually exclusive".to_string(),
                })
            }
            (None, true) => {
                return Err(StrataError::Manifest {
                    message: "either 'module' or 'files' is required".to_string(),
                })
            }
        };

        match &self.mapping {
            Some(_) if !self.scopes.is_empty() => Err(StrataError::Manifest {
                message: "'scopes' and 'mapping' are mutually exclusive".to_string(),
            }),
            Some(mapping) => {
                let mut result = ScopeMapping::empty();
                for (from, to) in mapping {
                    let targets: Vec<&str> = to.iter().map(String::as_str).collect();
                    result = result.and(&[registry.require(from)?]).to(&targets);
                }
                Ok(ScopedDependency::mapped(dependency, result))
            }
            None => Ok(ScopedDependency::of(
                dependency,
                &scopes_named(registry, &self.scopes)?,
            )),
        }
    }
}

fn scopes_named(registry: &ScopeRegistry, names: &[String]) -> Result<Vec<Scope>, StrataError> {
    names.iter().map(|name| registry.require(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::ScopeType;

    #[test]
    fn empty_manifest_is_valid() {
        let manifest = Manifest::from_str("").unwrap();
        let project = manifest.to_project(Path::new(".")).unwrap();
        assert!(project.holder.is_none());
        assert!(project.dependencies.is_empty());
    }

    #[test]
    fn scopes_and_mapping_are_exclusive() {
        let manifest = Manifest::from_str(
            r#"
[[dependencies]]
module = "a:b:1.0"
scopes = ["compile"]
mapping = { test = ["master"] }
"#,
        )
        .unwrap();
        let err = manifest.to_project(Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"), "got: {err}");
        assert!(err.to_string().contains("dependency #1"), "got: {err}");
    }

    #[test]
    fn unknown_scope_is_rejected() {
        let manifest = Manifest::from_str(
            r#"
[[dependencies]]
module = "a:b:1.0"
scopes = ["integration"]
"#,
        )
        .unwrap();
        assert!(manifest.to_project(Path::new(".")).is_err());
    }

    #[test]
    fn mapping_entry_builds_mapped_dependency() {
        let manifest = Manifest::from_str(
            r#"
[[dependencies]]
module = "a:b:1.0"
mapping = { test = ["master", "runtime"] }
"#,
        )
        .unwrap();
        let project = manifest.to_project(Path::new(".")).unwrap();
        let dep = &project.dependencies.dependencies()[0];
        assert_eq!(dep.scope_type(), ScopeType::Mapped);
    }

    #[test]
    fn files_are_relative_to_base_dir() {
        let manifest = Manifest::from_str(
            r#"
[[dependencies]]
files = ["lib/local.jar"]
scopes = ["compile"]
"#,
        )
        .unwrap();
        let project = manifest.to_project(Path::new("/work/app")).unwrap();
        let dep = project.dependencies.dependencies()[0].dependency();
        match dep {
            crate::dependency::Dependency::Files(files) => {
                assert_eq!(files.files, [PathBuf::from("/work/app/lib/local.jar")]);
            }
            other => panic!("expected files, got {other}"),
        }
    }
}
