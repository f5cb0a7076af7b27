//! The ordered dependency declarations of one module.

use std::collections::BTreeSet;
use std::path::PathBuf;

use strata_util::errors::StrataError;

use crate::dependency::{
    Dependency, Exclusion, FileDependency, ModuleDependency, ScopeSpec, ScopedDependency,
};
use crate::module_id::ModuleId;
use crate::scope::Scope;
use crate::scope_mapping::ScopeMapping;
use crate::version::{Version, VersionRange};
use crate::version_provider::VersionProvider;

/// Ordered [`ScopedDependency`] list plus the policies applied to it.
///
/// Every builder method returns a new value; declaration order is kept and
/// used for tie-breaking during conflict resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    dependencies: Vec<ScopedDependency>,
    default_scope: ScopeSpec,
    version_provider: VersionProvider,
    global_exclusions: Vec<Exclusion>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(dependencies: impl IntoIterator<Item = ScopedDependency>) -> Self {
        Self {
            dependencies: dependencies.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn and(mut self, dependency: ScopedDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Add a module from its `"group:name[:version]"` description.
    pub fn and_module(self, description: &str, scopes: &[Scope]) -> Result<Self, StrataError> {
        let module = ModuleDependency::parse(description)?;
        Ok(self.and(ScopedDependency::of(module, scopes)))
    }

    /// Add a module consumed through an explicit scope mapping.
    pub fn and_mapped_module(
        self,
        description: &str,
        mapping: ScopeMapping,
    ) -> Result<Self, StrataError> {
        let module = ModuleDependency::parse(description)?;
        Ok(self.and(ScopedDependency::mapped(module, mapping)))
    }

    pub fn and_files(
        self,
        files: impl IntoIterator<Item = impl Into<PathBuf>>,
        scopes: &[Scope],
    ) -> Self {
        self.and(ScopedDependency::of(FileDependency::new(files), scopes))
    }

    /// A copy without any declaration of `module`.
    pub fn without(&self, module: &ModuleId) -> Self {
        Self {
            dependencies: self
                .dependencies
                .iter()
                .filter(|d| d.module_id() != Some(module))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// This set followed by `other`'s declarations.
    ///
    /// Version providers are merged with `other` winning; global exclusions are
    /// unioned; this set's default scope is kept unless it has none.
    pub fn merge(&self, other: &DependencySet) -> Self {
        let mut global_exclusions = self.global_exclusions.clone();
        for exclusion in &other.global_exclusions {
            if !global_exclusions.contains(exclusion) {
                global_exclusions.push(exclusion.clone());
            }
        }
        let default_scope = match self.default_scope {
            ScopeSpec::Unset => other.default_scope.clone(),
            _ => self.default_scope.clone(),
        };
        Self {
            dependencies: self
                .dependencies
                .iter()
                .chain(other.dependencies.iter())
                .cloned()
                .collect(),
            default_scope,
            version_provider: self.version_provider.merge(&other.version_provider),
            global_exclusions,
        }
    }

    /// Scopes applied to declarations that have none.
    pub fn with_default_scopes(&self, scopes: &[Scope]) -> Self {
        Self {
            default_scope: ScopeSpec::simple(scopes),
            ..self.clone()
        }
    }

    /// Mapping applied to declarations that have no scope.
    pub fn with_default_mapping(&self, mapping: ScopeMapping) -> Self {
        Self {
            default_scope: ScopeSpec::Mapped(mapping),
            ..self.clone()
        }
    }

    pub fn with_version_provider(&self, provider: VersionProvider) -> Self {
        Self {
            version_provider: provider,
            ..self.clone()
        }
    }

    pub fn and_version(&self, module: ModuleId, version: Version) -> Self {
        Self {
            version_provider: self.version_provider.and(module, version),
            ..self.clone()
        }
    }

    /// Exclusions applied at every level of the resolved tree.
    pub fn with_global_exclusions(&self, exclusions: Vec<Exclusion>) -> Self {
        Self {
            global_exclusions: exclusions,
            ..self.clone()
        }
    }

    pub fn and_exclusion(&self, exclusion: Exclusion) -> Self {
        let mut next = self.clone();
        if !next.global_exclusions.contains(&exclusion) {
            next.global_exclusions.push(exclusion);
        }
        next
    }

    pub fn dependencies(&self) -> &[ScopedDependency] {
        &self.dependencies
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopedDependency> {
        self.dependencies.iter()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn default_scope(&self) -> &ScopeSpec {
        &self.default_scope
    }

    pub fn version_provider(&self) -> &VersionProvider {
        &self.version_provider
    }

    pub fn global_exclusions(&self) -> &[Exclusion] {
        &self.global_exclusions
    }

    /// The scope declaration in effect for `dependency`: its own, or the default one.
    pub fn effective_scope<'a>(&'a self, dependency: &'a ScopedDependency) -> &'a ScopeSpec {
        match dependency.scope_spec() {
            ScopeSpec::Unset => &self.default_scope,
            declared => declared,
        }
    }

    /// First declaration of `module`.
    pub fn get(&self, module: &ModuleId) -> Option<&ScopedDependency> {
        self.dependencies
            .iter()
            .find(|d| d.module_id() == Some(module))
    }

    pub fn contains_module_dependency(&self) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.module_dependency().is_some())
    }

    pub fn has_dynamic_versions(&self) -> bool {
        self.dependencies
            .iter()
            .filter_map(ScopedDependency::module_dependency)
            .any(|m| m.version.is_dynamic())
    }

    /// Every scope some declaration is made for, default scopes included.
    pub fn declared_scopes(&self) -> BTreeSet<Scope> {
        self.dependencies
            .iter()
            .flat_map(|d| self.effective_scope(d).declared_scopes())
            .collect()
    }

    /// Declarations made for exactly `scope` (not inherited through the hierarchy).
    pub fn dependencies_declared_with(&self, scope: &Scope) -> Vec<&ScopedDependency> {
        self.dependencies
            .iter()
            .filter(|d| self.effective_scope(d).declared_scopes().contains(scope))
            .collect()
    }

    /// A copy where dynamic or missing versions are replaced by the ones `provider` pins.
    pub fn resolved_with(&self, provider: &VersionProvider) -> Self {
        let dependencies = self
            .dependencies
            .iter()
            .map(|scoped| match scoped.dependency() {
                Dependency::Module(module) if !module.version.is_fixed() => {
                    match provider.version_of(&module.module) {
                        Some(version) => scoped
                            .with_dependency(module.with_version(VersionRange::fixed(version.clone()))),
                        None => scoped.clone(),
                    }
                }
                _ => scoped.clone(),
            })
            .collect();
        Self {
            dependencies,
            ..self.clone()
        }
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a ScopedDependency;
    type IntoIter = std::slice::Iter<'a, ScopedDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.iter()
    }
}
