use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strata_util::errors::StrataError;

use crate::module_id::{ModuleCoordinate, ModuleId};
use crate::scope::Scope;
use crate::scope_mapping::ScopeMapping;
use crate::version::VersionRange;

/// How far the transitive dependencies of a module are followed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transitivity {
    /// Only the module itself.
    None,
    /// Only what the module needs at runtime.
    Runtime,
    #[default]
    All,
}

impl Transitivity {
    /// The narrower of two settings, for settings inherited down a branch.
    pub fn restrict(self, other: Transitivity) -> Transitivity {
        match (self, other) {
            (Self::None, _) | (_, Self::None) => Self::None,
            (Self::Runtime, _) | (_, Self::Runtime) => Self::Runtime,
            _ => Self::All,
        }
    }
}

/// A rule dropping matching modules from a dependency's transitive closure.
///
/// Group and name accept `*` as a wildcard; classifier and extension only
/// restrict the match when set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exclusion {
    pub group: String,
    pub name: String,
    pub classifier: Option<String>,
    pub extension: Option<String>,
}

impl Exclusion {
    pub fn of(module: &ModuleId) -> Self {
        Self {
            group: module.group.clone(),
            name: module.name.clone(),
            classifier: None,
            extension: None,
        }
    }

    /// Parse `"group:name[:classifier[:extension]]"`; `"group"` alone excludes the whole group.
    pub fn parse(s: &str) -> Result<Self, StrataError> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let non_empty = |p: &str| (!p.is_empty()).then(|| p.to_string());
        match parts.as_slice() {
            [group] if !group.is_empty() => Ok(Self {
                group: group.to_string(),
                name: "*".to_string(),
                classifier: None,
                extension: None,
            }),
            [group, name, rest @ ..] if !group.is_empty() && !name.is_empty() && rest.len() <= 2 => {
                Ok(Self {
                    group: group.to_string(),
                    name: name.to_string(),
                    classifier: rest.first().and_then(|c| non_empty(*c)),
                    extension: rest.get(1).and_then(|e| non_empty(*e)),
                })
            }
            _ => Err(StrataError::Manifest {
                message: format!("invalid exclusion '{s}', expected 'group[:name[:classifier[:extension]]]'"),
            }),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Whether this rule drops `module` published with the given classifier and type.
    pub fn matches(&self, module: &ModuleId, classifier: Option<&str>, extension: Option<&str>) -> bool {
        wildcard_eq(&self.group, &module.group)
            && wildcard_eq(&self.name, &module.name)
            && optional_eq(self.classifier.as_deref(), classifier)
            && optional_eq(self.extension.as_deref(), extension)
    }
}

fn wildcard_eq(pattern: &str, value: &str) -> bool {
    pattern == "*" || pattern == value
}

fn optional_eq(pattern: Option<&str>, value: Option<&str>) -> bool {
    match pattern {
        None | Some("*") => true,
        Some(p) => value == Some(p),
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if let Some(extension) = &self.extension {
            write!(f, ":{extension}")?;
        }
        Ok(())
    }
}

/// A dependency on a module published in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDependency {
    pub module: ModuleId,
    pub version: VersionRange,
    pub classifier: Option<String>,
    /// Artifact type (file extension); `jar` when unset.
    pub artifact_type: Option<String>,
    pub transitivity: Transitivity,
    pub exclusions: Vec<Exclusion>,
}

impl ModuleDependency {
    pub fn new(module: ModuleId, version: VersionRange) -> Self {
        Self {
            module,
            version,
            classifier: None,
            artifact_type: None,
            transitivity: Transitivity::All,
            exclusions: Vec::new(),
        }
    }

    /// Parse `"group:name[:version]"`.
    pub fn parse(description: &str) -> Result<Self, StrataError> {
        let coordinate = ModuleCoordinate::parse(description)?;
        let version = VersionRange::parse(&coordinate.version)?;
        Ok(Self::new(coordinate.module_id, version))
    }

    pub fn with_version(&self, version: VersionRange) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = Some(artifact_type.into());
        self
    }

    pub fn with_transitivity(mut self, transitivity: Transitivity) -> Self {
        self.transitivity = transitivity;
        self
    }

    pub fn excluding(mut self, exclusion: Exclusion) -> Self {
        if !self.exclusions.contains(&exclusion) {
            self.exclusions.push(exclusion);
        }
        self
    }
}

impl fmt::Display for ModuleDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_unspecified() {
            write!(f, "{}", self.module)
        } else {
            write!(f, "{}:{}", self.module, self.version)
        }
    }
}

/// Local files taken as they are, with no transitive dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDependency {
    pub files: Vec<PathBuf>,
}

impl FileDependency {
    pub fn new(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for FileDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files: Vec<String> = self.files.iter().map(|p| p.display().to_string()).collect();
        write!(f, "files [{}]", files.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Module(ModuleDependency),
    Files(FileDependency),
}

impl Dependency {
    pub fn as_module(&self) -> Option<&ModuleDependency> {
        match self {
            Dependency::Module(module) => Some(module),
            Dependency::Files(_) => None,
        }
    }

    pub fn module_id(&self) -> Option<&ModuleId> {
        self.as_module().map(|m| &m.module)
    }
}

impl From<ModuleDependency> for Dependency {
    fn from(module: ModuleDependency) -> Self {
        Dependency::Module(module)
    }
}

impl From<FileDependency> for Dependency {
    fn from(files: FileDependency) -> Self {
        Dependency::Files(files)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Module(module) => fmt::Display::fmt(module, f),
            Dependency::Files(files) => fmt::Display::fmt(files, f),
        }
    }
}

/// How a dependency's scopes were declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    Unset,
    Simple,
    Mapped,
}

/// The scope declaration of a [`ScopedDependency`]: never both a scope set and a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScopeSpec {
    #[default]
    Unset,
    Simple(BTreeSet<Scope>),
    Mapped(ScopeMapping),
}

impl ScopeSpec {
    pub fn simple(scopes: &[Scope]) -> Self {
        if scopes.is_empty() {
            ScopeSpec::Unset
        } else {
            ScopeSpec::Simple(scopes.iter().cloned().collect())
        }
    }

    pub fn scope_type(&self) -> ScopeType {
        match self {
            ScopeSpec::Unset => ScopeType::Unset,
            ScopeSpec::Simple(_) => ScopeType::Simple,
            ScopeSpec::Mapped(_) => ScopeType::Mapped,
        }
    }

    /// The simple scopes, or the left side of the mapping.
    pub fn declared_scopes(&self) -> BTreeSet<Scope> {
        match self {
            ScopeSpec::Unset => BTreeSet::new(),
            ScopeSpec::Simple(scopes) => scopes.clone(),
            ScopeSpec::Mapped(mapping) => mapping.entries().cloned().collect(),
        }
    }
}

/// A dependency together with the scopes it is declared for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedDependency {
    dependency: Dependency,
    scope: ScopeSpec,
}

impl ScopedDependency {
    pub fn unscoped(dependency: impl Into<Dependency>) -> Self {
        Self {
            dependency: dependency.into(),
            scope: ScopeSpec::Unset,
        }
    }

    /// Declare for a set of scopes; an empty slice leaves the scope unset.
    pub fn of(dependency: impl Into<Dependency>, scopes: &[Scope]) -> Self {
        Self {
            dependency: dependency.into(),
            scope: ScopeSpec::simple(scopes),
        }
    }

    pub fn mapped(dependency: impl Into<Dependency>, mapping: ScopeMapping) -> Self {
        Self {
            dependency: dependency.into(),
            scope: ScopeSpec::Mapped(mapping),
        }
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn module_dependency(&self) -> Option<&ModuleDependency> {
        self.dependency.as_module()
    }

    pub fn module_id(&self) -> Option<&ModuleId> {
        self.dependency.module_id()
    }

    pub fn scope_spec(&self) -> &ScopeSpec {
        &self.scope
    }

    pub fn scope_type(&self) -> ScopeType {
        self.scope.scope_type()
    }

    /// Simple scopes, when declared that way.
    pub fn scopes(&self) -> Option<&BTreeSet<Scope>> {
        match &self.scope {
            ScopeSpec::Simple(scopes) => Some(scopes),
            _ => None,
        }
    }

    /// The scope mapping, when declared that way.
    pub fn mapping(&self) -> Option<&ScopeMapping> {
        match &self.scope {
            ScopeSpec::Mapped(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn declared_scopes(&self) -> BTreeSet<Scope> {
        self.scope.declared_scopes()
    }

    /// A copy with a different dependency and the same scope declaration.
    pub fn with_dependency(&self, dependency: impl Into<Dependency>) -> Self {
        Self {
            dependency: dependency.into(),
            scope: self.scope.clone(),
        }
    }

    pub fn with_scopes(&self, scopes: &[Scope]) -> Self {
        Self {
            dependency: self.dependency.clone(),
            scope: ScopeSpec::simple(scopes),
        }
    }

    pub fn with_mapping(&self, mapping: ScopeMapping) -> Self {
        Self {
            dependency: self.dependency.clone(),
            scope: ScopeSpec::Mapped(mapping),
        }
    }
}

impl fmt::Display for ScopedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            ScopeSpec::Unset => write!(f, "{}", self.dependency),
            ScopeSpec::Simple(scopes) => {
                let names: Vec<&str> = scopes.iter().map(Scope::name).collect();
                write!(f, "{} ({})", self.dependency, names.join(", "))
            }
            ScopeSpec::Mapped(mapping) => write!(f, "{} ({mapping})", self.dependency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{compile, runtime, test};

    #[test]
    fn transitivity_restrict_keeps_narrowest() {
        assert_eq!(Transitivity::All.restrict(Transitivity::Runtime), Transitivity::Runtime);
        assert_eq!(Transitivity::Runtime.restrict(Transitivity::None), Transitivity::None);
        assert_eq!(Transitivity::All.restrict(Transitivity::All), Transitivity::All);
    }

    #[test]
    fn exclusion_wildcards() {
        let exclusion = Exclusion::parse("org.slf4j:*").unwrap();
        assert!(exclusion.matches(&ModuleId::new("org.slf4j", "slf4j-api"), None, None));
        assert!(!exclusion.matches(&ModuleId::new("org.slf4jx", "slf4j-api"), None, None));

        let group_only = Exclusion::parse("commons-logging").unwrap();
        assert!(group_only.matches(&ModuleId::new("commons-logging", "commons-logging"), None, None));
    }

    #[test]
    fn exclusion_classifier_restricts_match() {
        let exclusion = Exclusion::of(&ModuleId::new("io.netty", "netty-transport"))
            .with_classifier("linux-x86_64");
        let module = ModuleId::new("io.netty", "netty-transport");
        assert!(exclusion.matches(&module, Some("linux-x86_64"), None));
        assert!(!exclusion.matches(&module, None, None));
        assert_eq!(exclusion.to_string(), "io.netty:netty-transport:linux-x86_64");
    }

    #[test]
    fn exclusion_parse_rejects_garbage() {
        assert!(Exclusion::parse("").is_err());
        assert!(Exclusion::parse("a:b:c:d:e").is_err());
        let full = Exclusion::parse("a:b:sources:zip").unwrap();
        assert_eq!(full.extension.as_deref(), Some("zip"));
    }

    #[test]
    fn module_dependency_parse() {
        let dep = ModuleDependency::parse("com.google.guava:guava:22.0").unwrap();
        assert_eq!(dep.module, ModuleId::new("com.google.guava", "guava"));
        assert!(dep.version.is_fixed());
        assert_eq!(dep.to_string(), "com.google.guava:guava:22.0");

        let unversioned = ModuleDependency::parse("com.google.guava:guava").unwrap();
        assert!(unversioned.version.is_unspecified());
        assert_eq!(unversioned.to_string(), "com.google.guava:guava");
    }

    #[test]
    fn scoped_dependency_holds_one_kind_of_scope() {
        let dep = ModuleDependency::parse("a:b:1.0").unwrap();
        let simple = ScopedDependency::of(dep.clone(), &[compile(), runtime()]);
        assert_eq!(simple.scope_type(), ScopeType::Simple);
        assert!(simple.mapping().is_none());

        let mapped = simple.with_mapping(ScopeMapping::of(&[test()]).to(&["master"]));
        assert_eq!(mapped.scope_type(), ScopeType::Mapped);
        assert!(mapped.scopes().is_none());
        assert_eq!(mapped.declared_scopes(), BTreeSet::from([test()]));

        let unset = ScopedDependency::of(dep, &[]);
        assert_eq!(unset.scope_type(), ScopeType::Unset);
    }

    #[test]
    fn file_dependency_has_no_module() {
        let files = ScopedDependency::of(FileDependency::new(["lib/a.jar"]), &[compile()]);
        assert!(files.module_id().is_none());
        assert_eq!(files.to_string(), "files [lib/a.jar] (compile)");
    }
}
