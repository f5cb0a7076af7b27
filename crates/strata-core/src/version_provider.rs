use std::collections::BTreeMap;

use crate::module_id::ModuleId;
use crate::version::Version;

/// Module to version overrides, used to pin unspecified or dynamic versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionProvider {
    versions: BTreeMap<ModuleId, Version>,
}

impl VersionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy with `module` pinned to `version`.
    pub fn and(&self, module: ModuleId, version: Version) -> Self {
        let mut versions = self.versions.clone();
        versions.insert(module, version);
        Self { versions }
    }

    pub fn insert(&mut self, module: ModuleId, version: Version) {
        self.versions.insert(module, version);
    }

    pub fn version_of(&self, module: &ModuleId) -> Option<&Version> {
        self.versions.get(module)
    }

    pub fn contains(&self, module: &ModuleId) -> bool {
        self.versions.contains_key(module)
    }

    /// Union of both providers; `other` wins on conflicts.
    pub fn merge(&self, other: &VersionProvider) -> Self {
        let mut versions = self.versions.clone();
        versions.extend(other.versions.iter().map(|(m, v)| (m.clone(), v.clone())));
        Self { versions }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &Version)> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl FromIterator<(ModuleId, Version)> for VersionProvider {
    fn from_iter<I: IntoIterator<Item = (ModuleId, Version)>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn merge_prefers_other() {
        let guava = ModuleId::new("com.google.guava", "guava");
        let base = VersionProvider::new().and(guava.clone(), v("21.0"));
        let merged = base.merge(&VersionProvider::new().and(guava.clone(), v("22.0")));
        assert_eq!(merged.version_of(&guava), Some(&v("22.0")));
        assert_eq!(base.version_of(&guava), Some(&v("21.0")));
    }

    #[test]
    fn iteration_is_sorted_by_module() {
        let provider: VersionProvider = [
            (ModuleId::new("z", "z"), v("1")),
            (ModuleId::new("a", "a"), v("2")),
        ]
        .into_iter()
        .collect();
        let modules: Vec<String> = provider.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(modules, ["a:a", "z:z"]);
    }
}
