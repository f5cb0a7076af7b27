//! Named dependency scopes with an acyclic "extends" hierarchy.
//!
//! A dependency declared for scope `S` is visible to every scope that
//! transitively extends `S`: with the standard hierarchy a `compile`
//! dependency is visible when resolving for `test`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strata_util::errors::StrataError;

pub const COMPILE: &str = "compile";
pub const PROVIDED: &str = "provided";
pub const RUNTIME: &str = "runtime";
pub const TEST: &str = "test";

/// A named scope. Equality, ordering and hashing use the name only.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    name: String,
    parents: Vec<Scope>,
    ancestors: BTreeSet<Scope>,
}

impl Scope {
    /// A scope extending nothing.
    pub fn of(name: &str) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                name: name.to_string(),
                parents: Vec::new(),
                ancestors: BTreeSet::new(),
            }),
        }
    }

    /// A copy of this scope additionally extending `parents`.
    ///
    /// Fails with [`StrataError::ScopeCycle`] if a parent is this scope or
    /// already (transitively) extends it.
    pub fn extending(&self, parents: &[Scope]) -> Result<Self, StrataError> {
        let mut all_parents = self.inner.parents.clone();
        let mut ancestors = self.inner.ancestors.clone();
        for parent in parents {
            if parent == self || parent.inner.ancestors.contains(self) {
                return Err(StrataError::ScopeCycle {
                    scope: self.name().to_string(),
                    parent: parent.name().to_string(),
                });
            }
            if !all_parents.contains(parent) {
                all_parents.push(parent.clone());
            }
            ancestors.insert(parent.clone());
            ancestors.extend(parent.inner.ancestors.iter().cloned());
        }
        Ok(Self {
            inner: Arc::new(ScopeInner {
                name: self.inner.name.clone(),
                parents: all_parents,
                ancestors,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Scopes this one directly extends.
    pub fn parents(&self) -> &[Scope] {
        &self.inner.parents
    }

    /// Every scope this one transitively extends, excluding itself.
    pub fn all_ancestors(&self) -> &BTreeSet<Scope> {
        &self.inner.ancestors
    }

    /// Whether `other` transitively extends this scope (strictly).
    pub fn is_transitively_extended_by(&self, other: &Scope) -> bool {
        other.inner.ancestors.contains(self)
    }

    /// Whether something declared for this scope is visible when resolving `target`.
    pub fn is_visible_in(&self, target: &Scope) -> bool {
        self == target || self.is_transitively_extended_by(target)
    }

    /// Whether something declared for this scope is visible in any of `targets`.
    pub fn is_visible_in_any(&self, targets: &[Scope]) -> bool {
        targets.iter().any(|t| self.is_visible_in(t))
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for Scope {}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.name.cmp(&other.inner.name)
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({})", self.inner.name)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

/// Dependencies needed to compile.
pub fn compile() -> Scope {
    Scope::of(COMPILE)
}

/// Dependencies needed to compile and test but supplied by the runtime environment.
pub fn provided() -> Scope {
    Scope::of(PROVIDED)
}

/// Dependencies needed to run; extends `compile`.
pub fn runtime() -> Scope {
    Scope {
        inner: Arc::new(ScopeInner {
            name: RUNTIME.to_string(),
            parents: vec![compile()],
            ancestors: BTreeSet::from([compile()]),
        }),
    }
}

/// Dependencies needed to run tests; extends `runtime` and `provided`.
pub fn test() -> Scope {
    Scope {
        inner: Arc::new(ScopeInner {
            name: TEST.to_string(),
            parents: vec![runtime(), provided()],
            ancestors: BTreeSet::from([runtime(), compile(), provided()]),
        }),
    }
}

/// An explicit name-to-scope table owned by whoever resolves, never global.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    definitions: BTreeMap<String, Vec<String>>,
    scopes: BTreeMap<String, Scope>,
}

impl ScopeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard hierarchy: `compile`, `provided`, `runtime` extends
    /// `compile`, `test` extends `runtime` and `provided`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (name, parents) in [
            (COMPILE, vec![]),
            (PROVIDED, vec![]),
            (RUNTIME, vec![COMPILE]),
            (TEST, vec![RUNTIME, PROVIDED]),
        ] {
            registry
                .definitions
                .insert(name.to_string(), parents.into_iter().map(String::from).collect());
        }
        registry.rebuild();
        registry
    }

    /// Define (or extend) a scope. Parents must already be defined.
    pub fn define(&mut self, name: &str, parents: &[&str]) -> Result<Scope, StrataError> {
        for parent in parents {
            if !self.definitions.contains_key(*parent) && *parent != name {
                return Err(StrataError::Config {
                    message: format!("scope '{name}' extends unknown scope '{parent}'"),
                });
            }
        }
        let previous = self.definitions.get(name).cloned();
        let entry = self.definitions.entry(name.to_string()).or_default();
        for parent in parents {
            if !entry.iter().any(|p| p == parent) {
                entry.push(parent.to_string());
            }
        }
        if let Some(parent) = self.find_cycle(name) {
            match previous {
                Some(previous) => self.definitions.insert(name.to_string(), previous),
                None => self.definitions.remove(name),
            };
            return Err(StrataError::ScopeCycle {
                scope: name.to_string(),
                parent,
            });
        }
        self.rebuild();
        Ok(self.scopes[name].clone())
    }

    /// Define several scopes at once, in dependency order regardless of map order.
    pub fn define_all(&mut self, defs: &BTreeMap<String, Vec<String>>) -> Result<(), StrataError> {
        let mut pending: Vec<(&String, &Vec<String>)> = defs.iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            let mut rest = Vec::new();
            for (name, parents) in pending {
                let ready = parents
                    .iter()
                    .all(|p| self.definitions.contains_key(p) || p == name);
                if ready {
                    let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
                    self.define(name, &parents)?;
                } else {
                    rest.push((name, parents));
                }
            }
            if rest.len() == before {
                let (name, parents) = rest[0];
                let waiting: BTreeSet<&String> = rest.iter().map(|(n, _)| *n).collect();
                return Err(match parents.iter().find(|p| waiting.contains(p)) {
                    Some(parent) => StrataError::ScopeCycle {
                        scope: name.to_string(),
                        parent: parent.to_string(),
                    },
                    None => StrataError::Config {
                        message: format!("scope '{name}' extends an unknown scope"),
                    },
                });
            }
            pending = rest;
        }
        Ok(())
    }

    /// Look up a scope by name.
    pub fn get(&self, name: &str) -> Option<&Scope> {
        self.scopes.get(name)
    }

    /// Look up a scope by name, falling back to a standalone scope for unknown names.
    pub fn scope(&self, name: &str) -> Scope {
        self.scopes
            .get(name)
            .cloned()
            .unwrap_or_else(|| Scope::of(name))
    }

    /// Look up a scope, failing for unknown names.
    pub fn require(&self, name: &str) -> Result<Scope, StrataError> {
        self.scopes
            .get(name)
            .cloned()
            .ok_or_else(|| StrataError::Config {
                message: format!("unknown scope '{name}'"),
            })
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    /// Returns the parent through which `start` reaches itself, if any.
    fn find_cycle(&self, start: &str) -> Option<String> {
        let direct = self.definitions.get(start)?;
        for parent in direct {
            let mut stack = vec![parent.as_str()];
            let mut seen = BTreeSet::new();
            while let Some(current) = stack.pop() {
                if current == start {
                    return Some(parent.clone());
                }
                if !seen.insert(current) {
                    continue;
                }
                if let Some(next) = self.definitions.get(current) {
                    stack.extend(next.iter().map(String::as_str));
                }
            }
        }
        None
    }

    fn rebuild(&mut self) {
        let mut built: BTreeMap<String, Scope> = BTreeMap::new();
        while built.len() < self.definitions.len() {
            let mut progressed = false;
            for (name, parents) in &self.definitions {
                if built.contains_key(name) || !parents.iter().all(|p| built.contains_key(p)) {
                    continue;
                }
                let parent_scopes: Vec<Scope> = parents.iter().map(|p| built[p].clone()).collect();
                // Definitions are checked for cycles before rebuilding.
                if let Ok(scope) = Scope::of(name).extending(&parent_scopes) {
                    built.insert(name.clone(), scope);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
        self.scopes = built;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_hierarchy() {
        let registry = ScopeRegistry::standard();
        let compile = registry.require(COMPILE).unwrap();
        let runtime = registry.require(RUNTIME).unwrap();
        let test = registry.require(TEST).unwrap();
        let provided = registry.require(PROVIDED).unwrap();

        assert!(compile.is_transitively_extended_by(&runtime));
        assert!(compile.is_transitively_extended_by(&test));
        assert!(provided.is_transitively_extended_by(&test));
        assert!(!provided.is_transitively_extended_by(&runtime));
        assert!(!test.is_transitively_extended_by(&compile));
        assert!(!compile.is_transitively_extended_by(&compile));
        assert!(compile.is_visible_in(&compile));
    }

    #[test]
    fn free_functions_match_registry() {
        let registry = ScopeRegistry::standard();
        assert_eq!(test().all_ancestors(), registry.require(TEST).unwrap().all_ancestors());
        assert_eq!(runtime().parents(), &[compile()]);
    }

    #[test]
    fn value_equality_by_name() {
        assert_eq!(Scope::of("test"), test());
        assert!(Scope::of("test").all_ancestors().is_empty());
    }

    #[test]
    fn extending_detects_cycles() {
        let err = compile().extending(&[test()]).unwrap_err();
        assert!(matches!(err, StrataError::ScopeCycle { .. }));
        let err = compile().extending(&[compile()]).unwrap_err();
        assert!(matches!(err, StrataError::ScopeCycle { .. }));
    }

    #[test]
    fn registry_rejects_cycle_and_keeps_previous_definition() {
        let mut registry = ScopeRegistry::standard();
        let err = registry.define(COMPILE, &[TEST]).unwrap_err();
        assert!(matches!(err, StrataError::ScopeCycle { .. }));
        assert!(registry.require(COMPILE).unwrap().parents().is_empty());
    }

    #[test]
    fn registry_custom_scope_inherits_transitively() {
        let mut registry = ScopeRegistry::standard();
        let it = registry.define("integration", &[TEST]).unwrap();
        assert!(compile().is_transitively_extended_by(&it));
        assert!(provided().is_transitively_extended_by(&it));
    }

    #[test]
    fn registry_unknown_parent() {
        let mut registry = ScopeRegistry::standard();
        assert!(registry.define("x", &["nope"]).is_err());
        assert!(registry.get("x").is_none());
    }

    #[test]
    fn define_all_orders_definitions() {
        let mut registry = ScopeRegistry::standard();
        let defs = BTreeMap::from([
            ("a".to_string(), vec!["b".to_string()]),
            ("b".to_string(), vec![TEST.to_string()]),
        ]);
        registry.define_all(&defs).unwrap();
        let a = registry.require("a").unwrap();
        assert!(compile().is_transitively_extended_by(&a));
    }

    #[test]
    fn define_all_detects_cycle() {
        let mut registry = ScopeRegistry::standard();
        let defs = BTreeMap::from([
            ("a".to_string(), vec!["b".to_string()]),
            ("b".to_string(), vec!["a".to_string()]),
        ]);
        let err = registry.define_all(&defs).unwrap_err();
        assert!(matches!(err, StrataError::ScopeCycle { .. }));
    }

    #[test]
    fn unknown_name_falls_back_to_standalone_scope() {
        let registry = ScopeRegistry::standard();
        let optional = registry.scope("optional");
        assert!(optional.all_ancestors().is_empty());
    }
}
