//! Mapping from declaring-side scopes to the configurations pulled from a
//! dependency.
//!
//! `compile -> master, compile` reads: when this dependency is used for
//! `compile`, take its main artifact (`master`) plus whatever the dependency
//! itself declares for its `compile` configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use strata_util::errors::StrataError;

use crate::scope::{self, Scope};

/// Configuration standing for a module's own artifact.
pub const MASTER: &str = "master";

/// An immutable many-to-many mapping `scope -> {configuration...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeMapping {
    map: BTreeMap<Scope, BTreeSet<String>>,
}

/// The left side of a mapping entry waiting for its targets.
#[derive(Debug, Clone)]
pub struct PartialMapping {
    from: Vec<Scope>,
    mapping: ScopeMapping,
}

impl ScopeMapping {
    /// Start a mapping with `from` on the left side.
    pub fn of(from: &[Scope]) -> PartialMapping {
        PartialMapping {
            from: from.to_vec(),
            mapping: Self::default(),
        }
    }

    /// An empty mapping.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The mapping applied to dependencies declared with simple scopes:
    ///
    /// | scope    | configurations     |
    /// |----------|--------------------|
    /// | compile  | master, compile    |
    /// | provided | master, compile    |
    /// | runtime  | master, runtime    |
    /// | test     | master, runtime    |
    pub fn default_mapping() -> Self {
        Self::of(&[scope::compile()])
            .to(&[MASTER, scope::COMPILE])
            .and(&[scope::provided()])
            .to(&[MASTER, scope::COMPILE])
            .and(&[scope::runtime()])
            .to(&[MASTER, scope::RUNTIME])
            .and(&[scope::test()])
            .to(&[MASTER, scope::RUNTIME])
    }

    /// Continue this mapping with more left-side scopes.
    pub fn and(&self, from: &[Scope]) -> PartialMapping {
        PartialMapping {
            from: from.to_vec(),
            mapping: self.clone(),
        }
    }

    /// Configurations mapped to `from`.
    ///
    /// Fails with [`StrataError::UnmappedScope`] when `from` is absent or was
    /// explicitly mapped to nothing.
    pub fn mapped_scopes(&self, from: &Scope) -> Result<&BTreeSet<String>, StrataError> {
        match self.map.get(from) {
            Some(targets) if !targets.is_empty() => Ok(targets),
            Some(_) => Err(StrataError::UnmappedScope {
                scope: format!("{from} (mapped to nothing)"),
                declared: self.entries_label(),
            }),
            None => Err(StrataError::UnmappedScope {
                scope: from.to_string(),
                declared: self.entries_label(),
            }),
        }
    }

    /// Whether `from` has an entry, even an empty one.
    pub fn contains(&self, from: &Scope) -> bool {
        self.map.contains_key(from)
    }

    /// A copy without the entry for `scope`.
    pub fn minus(&self, scope: &Scope) -> Self {
        let mut map = self.map.clone();
        map.remove(scope);
        Self { map }
    }

    /// The left-side scopes of this mapping.
    pub fn entries(&self) -> impl Iterator<Item = &Scope> {
        self.map.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn entries_label(&self) -> String {
        self.map
            .keys()
            .map(Scope::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl PartialMapping {
    /// Bind the pending left-side scopes to `targets`.
    ///
    /// Mapping a scope that already has an entry unions the targets.
    pub fn to(self, targets: &[&str]) -> ScopeMapping {
        let mut mapping = self.mapping;
        for from in self.from {
            mapping
                .map
                .entry(from)
                .or_default()
                .extend(targets.iter().map(|t| t.to_string()));
        }
        mapping
    }
}

impl fmt::Display for ScopeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .map
            .iter()
            .map(|(from, to)| {
                format!(
                    "{from} -> {}",
                    to.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
                )
            })
            .collect();
        f.write_str(&entries.join("; "))
    }
}
