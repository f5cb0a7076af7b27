//! Version conflict resolution and reporting.
//!
//! When one module occurs at several versions in a tree, one version wins:
//!
//! 1. a version pinned directly at the root (declared fixed or supplied by the
//!    version provider), first declaration first;
//! 2. otherwise the highest version among live occurrences;
//! 3. on equal versions, the first occurrence in pre-order.
//!
//! Occurrences asking for another version are evicted: they stay in the tree
//! but their subtrees no longer count. Evicting a branch can remove the
//! occurrence that made a version win elsewhere, so winners are recomputed
//! until the evicted set is stable.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use petgraph::graph::NodeIndex;
use strata_core::module_id::ModuleId;
use strata_core::version::Version;

use crate::tree::{DependencyTree, NodeInfo};

const MAX_ROUNDS: usize = 32;

/// A report of all version conflicts encountered during resolution.
#[derive(Debug, Clone, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<VersionConflict>,
}

/// A version of a module that was requested but lost to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    pub module: ModuleId,
    pub requested: Version,
    pub resolved: Version,
    pub reason: String,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: VersionConflict) {
        self.conflicts.push(conflict);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionConflict> {
        self.conflicts.iter()
    }

    /// Conflicts about `module`.
    pub fn for_module<'a, 'b>(&'a self, module: &'b ModuleId) -> impl Iterator<Item = &'a VersionConflict> + 'b
    where
        'a: 'b,
    {
        self.conflicts.iter().filter(move |c| &c.module == module)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(
                f,
                "  {} requested {} but resolved {} ({})",
                c.module, c.requested, c.resolved, c.reason
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} ({})",
            self.module, self.requested, self.resolved, self.reason
        )
    }
}

#[derive(Debug, Clone)]
struct Winner {
    version: Version,
    reason: &'static str,
}

const ROOT_FIXED: &str = "fixed root declaration";
const HIGHEST: &str = "highest version wins";

/// Mark evicted occurrences and set the resolved version of every module node.
pub fn resolve_conflicts(tree: &mut DependencyTree) -> ConflictReport {
    let authoritative = root_fixed_versions(tree);

    let mut winners = HashMap::new();
    let mut stable = false;
    for round in 1..=MAX_ROUNDS {
        winners = pick_winners(tree, &authoritative);
        let evicted = evicted_occurrences(tree, &winners);
        let previous: BTreeSet<NodeIndex> = module_indices(tree)
            .into_iter()
            .filter(|&i| matches!(tree.info(i), NodeInfo::Module(m) if m.evicted))
            .collect();
        if evicted == previous {
            stable = true;
            break;
        }
        for index in module_indices(tree) {
            if let Some(info) = tree.module_info_mut(index) {
                info.evicted = evicted.contains(&index);
            }
        }
        tracing::debug!("conflict round {round}: {} evicted occurrences", evicted.len());
    }
    if !stable {
        tracing::warn!("conflict resolution did not settle after {MAX_ROUNDS} rounds");
    }

    let mut report = ConflictReport::new();
    let mut reported = BTreeSet::new();
    for index in tree.live_indices() {
        let Some(info) = tree.module_info_mut(index) else {
            continue;
        };
        let Some(candidate) = info.candidate_version.clone() else {
            continue;
        };
        let Some(winner) = winners.get(&info.module) else {
            info.resolved_version = Some(candidate);
            continue;
        };
        info.resolved_version = Some(winner.version.clone());
        if info.evicted && reported.insert((info.module.clone(), candidate.as_str().to_string())) {
            tracing::debug!("evicted {}:{candidate} in favour of {}", info.module, winner.version);
            report.add(VersionConflict {
                module: info.module.clone(),
                requested: candidate,
                resolved: winner.version.clone(),
                reason: winner.reason.to_string(),
            });
        }
    }
    report
}

fn module_indices(tree: &DependencyTree) -> Vec<NodeIndex> {
    tree.flatten()
        .into_iter()
        .filter(|n| n.module_info().is_some())
        .map(|n| n.index())
        .collect()
}

/// Versions pinned directly at the root; the first declaration of a module wins.
fn root_fixed_versions(tree: &DependencyTree) -> HashMap<ModuleId, Version> {
    let mut fixed = HashMap::new();
    for child in tree.root().children() {
        let Some(info) = child.module_info() else {
            continue;
        };
        if info.failure.is_some() || !info.pinned {
            continue;
        }
        if let Some(version) = &info.candidate_version {
            fixed
                .entry(info.module.clone())
                .or_insert_with(|| version.clone());
        }
    }
    fixed
}

fn pick_winners(tree: &DependencyTree, authoritative: &HashMap<ModuleId, Version>) -> HashMap<ModuleId, Winner> {
    let mut winners: HashMap<ModuleId, Winner> = HashMap::new();
    for index in tree.live_indices() {
        let NodeInfo::Module(info) = tree.info(index) else {
            continue;
        };
        let Some(candidate) = &info.candidate_version else {
            continue;
        };
        if info.failure.is_some() {
            continue;
        }
        if let Some(fixed) = authoritative.get(&info.module) {
            winners.entry(info.module.clone()).or_insert_with(|| Winner {
                version: fixed.clone(),
                reason: ROOT_FIXED,
            });
            continue;
        }
        match winners.get_mut(&info.module) {
            Some(current) if candidate > &current.version => {
                current.version = candidate.clone();
            }
            Some(_) => {}
            None => {
                winners.insert(
                    info.module.clone(),
                    Winner {
                        version: candidate.clone(),
                        reason: HIGHEST,
                    },
                );
            }
        }
    }
    winners
}

/// Occurrences, outside already evicted branches, asking for a version other than the winner.
fn evicted_occurrences(tree: &DependencyTree, winners: &HashMap<ModuleId, Winner>) -> BTreeSet<NodeIndex> {
    tree.live_indices()
        .into_iter()
        .filter(|&index| {
            let NodeInfo::Module(info) = tree.info(index) else {
                return false;
            };
            match (&info.candidate_version, winners.get(&info.module)) {
                (Some(candidate), Some(winner)) if info.failure.is_none() => {
                    candidate.as_str() != winner.version.as_str()
                }
                _ => false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ModuleNodeInfo;
    use strata_core::version::VersionRange;

    fn node(module: &str, declared: &str, candidate: &str) -> NodeInfo {
        let (group, name) = module.split_once(':').unwrap();
        let mut info = ModuleNodeInfo::new(ModuleId::new(group, name), VersionRange::parse(declared).unwrap());
        info.candidate_version = Some(Version::parse(candidate).unwrap());
        info.pinned = info.declared_version.is_fixed();
        NodeInfo::Module(info)
    }

    fn resolved(tree: &DependencyTree, index: NodeIndex) -> (bool, String) {
        let NodeInfo::Module(info) = tree.info(index) else {
            panic!("not a module node");
        };
        (info.evicted, info.resolved_version.as_ref().unwrap().to_string())
    }

    #[test]
    fn fixed_root_declaration_beats_higher_transitive() {
        let mut tree = DependencyTree::new(None);
        let root = tree.root_index();
        let direct = tree.add_child(root, node("org:x", "1.0", "1.0"));
        let other = tree.add_child(root, node("org:y", "1.0", "1.0"));
        let transitive = tree.add_child(other, node("org:x", "2.0", "2.0"));

        let report = resolve_conflicts(&mut tree);
        assert_eq!(resolved(&tree, direct), (false, "1.0".to_string()));
        assert_eq!(resolved(&tree, transitive), (true, "1.0".to_string()));
        assert_eq!(report.len(), 1);
        assert_eq!(report.conflicts[0].reason, ROOT_FIXED);
        assert_eq!(report.conflicts[0].requested.as_str(), "2.0");
    }

    #[test]
    fn highest_transitive_wins() {
        let mut tree = DependencyTree::new(None);
        let root = tree.root_index();
        let a = tree.add_child(root, node("org:a", "1.0", "1.0"));
        let b = tree.add_child(root, node("org:b", "1.0", "1.0"));
        let low = tree.add_child(a, node("org:x", "1.2", "1.2"));
        let high = tree.add_child(b, node("org:x", "1.5", "1.5"));

        let report = resolve_conflicts(&mut tree);
        assert_eq!(resolved(&tree, low), (true, "1.5".to_string()));
        assert_eq!(resolved(&tree, high), (false, "1.5".to_string()));
        assert_eq!(report.to_string().lines().count(), 2);
    }

    #[test]
    fn dynamic_root_declaration_is_not_authoritative() {
        let mut tree = DependencyTree::new(None);
        let root = tree.root_index();
        let direct = tree.add_child(root, node("org:x", "1.+", "1.9"));
        let other = tree.add_child(root, node("org:y", "1.0", "1.0"));
        tree.add_child(other, node("org:x", "2.0", "2.0"));

        resolve_conflicts(&mut tree);
        assert_eq!(resolved(&tree, direct), (true, "2.0".to_string()));
    }

    #[test]
    fn winner_inside_evicted_branch_is_recomputed() {
        // y:1.0 wins over y:0.9 at root level, so the z:3.0 under y:0.9 is
        // gone and z:2.0 must win.
        let mut tree = DependencyTree::new(None);
        let root = tree.root_index();
        tree.add_child(root, node("org:y", "1.0", "1.0"));
        let a = tree.add_child(root, node("org:a", "1.0", "1.0"));
        let old_y = tree.add_child(a, node("org:y", "0.9", "0.9"));
        tree.add_child(old_y, node("org:z", "3.0", "3.0"));
        let z = tree.add_child(a, node("org:z", "2.0", "2.0"));

        resolve_conflicts(&mut tree);
        assert_eq!(resolved(&tree, old_y), (true, "1.0".to_string()));
        assert_eq!(resolved(&tree, z), (false, "2.0".to_string()));
        let provider = tree.to_version_provider();
        assert_eq!(provider.version_of(&ModuleId::new("org", "z")).unwrap().as_str(), "2.0");
    }

    #[test]
    fn empty_report() {
        let report = ConflictReport::new();
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "No version conflicts.");
    }
}
