//! The resolved dependency tree.
//!
//! Nodes live in a petgraph arena; [`DependencyNode`] is a borrowed view of
//! one node. A module reachable through several paths appears once per path,
//! but only one occurrence per module, version and request carries the
//! dependencies below it; the others are marked `repeated`.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use strata_core::module_id::ModuleId;
use strata_core::scope::Scope;
use strata_core::scope_mapping::MASTER;
use strata_core::version::{Version, VersionRange};
use strata_core::version_provider::VersionProvider;

/// What a tree node stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeInfo {
    /// The root: the project module when known, otherwise anonymous.
    Root { holder: Option<(ModuleId, Version)> },
    Module(ModuleNodeInfo),
    Files(FileNodeInfo),
}

/// One occurrence of a module in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleNodeInfo {
    pub module: ModuleId,
    /// The version expression as declared by the parent.
    pub declared_version: VersionRange,
    /// The version this occurrence asked for, once defaulted and resolved.
    pub candidate_version: Option<Version>,
    /// The candidate was declared fixed or supplied by the version provider,
    /// not picked from a dynamic range.
    pub pinned: bool,
    /// The version chosen for the module after conflict resolution.
    pub resolved_version: Option<Version>,
    /// Root level: the declared scopes. Deeper: the configurations of the
    /// parent declaring this module.
    pub declared_scopes: BTreeSet<Scope>,
    /// Configurations requested from this module (`master` means its own artifact).
    pub configurations: BTreeSet<String>,
    pub classifier: Option<String>,
    pub artifact_type: Option<String>,
    pub evicted: bool,
    /// Same module, version and request as an occurrence expanded elsewhere;
    /// its dependencies are shown there only.
    pub repeated: bool,
    pub failure: Option<String>,
    pub files: Vec<PathBuf>,
}

impl ModuleNodeInfo {
    pub fn new(module: ModuleId, declared_version: VersionRange) -> Self {
        Self {
            module,
            declared_version,
            candidate_version: None,
            pinned: false,
            resolved_version: None,
            declared_scopes: BTreeSet::new(),
            configurations: BTreeSet::new(),
            classifier: None,
            artifact_type: None,
            evicted: false,
            repeated: false,
            failure: None,
            files: Vec::new(),
        }
    }

    /// Whether the module's own artifact was requested.
    pub fn includes_artifact(&self) -> bool {
        self.configurations.contains(MASTER)
    }

    /// Resolved and not evicted.
    pub fn is_live(&self) -> bool {
        !self.evicted && self.failure.is_none() && self.resolved_version.is_some()
    }
}

impl fmt::Display for ModuleNodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declared = self.declared_version.as_str();
        let asked = self
            .candidate_version
            .as_ref()
            .map(Version::as_str)
            .unwrap_or(declared);
        if declared.is_empty() {
            write!(f, "{}:{asked}", self.module)?;
        } else {
            write!(f, "{}:{declared}", self.module)?;
            if asked != declared {
                write!(f, " -> {asked}")?;
            }
        }
        if let Some(resolved) = &self.resolved_version {
            if resolved.as_str() != asked {
                write!(f, " -> {resolved}")?;
            }
        }
        Ok(())
    }
}

/// Local files declared directly.
#[derive(Debug, Clone, PartialEq)]
pub struct FileNodeInfo {
    pub files: Vec<PathBuf>,
    pub declared_scopes: BTreeSet<Scope>,
}

/// A resolved dependency tree.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    graph: DiGraph<NodeInfo, ()>,
    root: NodeIndex,
}

impl DependencyTree {
    pub fn new(holder: Option<(ModuleId, Version)>) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(NodeInfo::Root { holder });
        Self { graph, root }
    }

    pub fn root(&self) -> DependencyNode<'_> {
        self.node(self.root)
    }

    pub fn root_index(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, index: NodeIndex) -> DependencyNode<'_> {
        DependencyNode { tree: self, index }
    }

    /// Append a child under `parent`, after its existing children.
    pub fn add_child(&mut self, parent: NodeIndex, info: NodeInfo) -> NodeIndex {
        let index = self.graph.add_node(info);
        self.graph.add_edge(parent, index, ());
        index
    }

    pub fn info(&self, index: NodeIndex) -> &NodeInfo {
        &self.graph[index]
    }

    pub fn module_info_mut(&mut self, index: NodeIndex) -> Option<&mut ModuleNodeInfo> {
        match &mut self.graph[index] {
            NodeInfo::Module(info) => Some(info),
            _ => None,
        }
    }

    /// Children of `index` in insertion order.
    pub fn child_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first.
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    pub fn parent_index(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .next()
    }

    /// Every node except the root, pre-order.
    pub fn flatten(&self) -> Vec<DependencyNode<'_>> {
        self.root().descendants()
    }

    /// Indices of nodes not inside an evicted subtree, pre-order, root excluded.
    ///
    /// Evicted nodes themselves are included; their children are not.
    pub fn live_indices(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.child_indices(self.root).into_iter().rev().collect();
        while let Some(index) = stack.pop() {
            out.push(index);
            let evicted = matches!(&self.graph[index], NodeInfo::Module(m) if m.evicted);
            if !evicted {
                stack.extend(self.child_indices(index).into_iter().rev());
            }
        }
        out
    }

    /// First occurrence of `module`, pre-order.
    pub fn first(&self, module: &ModuleId) -> Option<DependencyNode<'_>> {
        self.flatten()
            .into_iter()
            .find(|n| n.module_id() == Some(module))
    }

    /// Winning versions of live module nodes.
    pub fn to_version_provider(&self) -> VersionProvider {
        let mut provider = VersionProvider::new();
        for index in self.live_indices() {
            if let NodeInfo::Module(info) = &self.graph[index] {
                if let (true, Some(version)) = (info.is_live(), &info.resolved_version) {
                    if !provider.contains(&info.module) {
                        provider.insert(info.module.clone(), version.clone());
                    }
                }
            }
        }
        provider
    }

    /// Path from the root to the first live, non-evicted occurrence of `module`.
    pub fn find_path(&self, module: &ModuleId) -> Option<Vec<DependencyNode<'_>>> {
        let target = self.live_indices().into_iter().find(|&index| {
            matches!(&self.graph[index], NodeInfo::Module(m) if &m.module == module && !m.evicted)
        })?;
        let mut path = vec![self.node(target)];
        let mut current = target;
        while let Some(parent) = self.parent_index(current) {
            path.push(self.node(parent));
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// A tree holding this tree's children plus those of `other` whose module
    /// is not already a child here. This tree's occurrence wins on collision.
    pub fn merge(&self, other: &DependencyTree) -> DependencyTree {
        let mut merged = self.clone();
        let present: HashSet<ModuleId> = self
            .root()
            .children()
            .iter()
            .filter_map(|c| c.module_id().cloned())
            .collect();
        for child in other.child_indices(other.root) {
            let keep = match other.info(child) {
                NodeInfo::Module(m) => !present.contains(&m.module),
                NodeInfo::Files(f) => !self
                    .child_indices(self.root)
                    .iter()
                    .any(|&c| matches!(self.info(c), NodeInfo::Files(own) if own.files == f.files)),
                NodeInfo::Root { .. } => false,
            };
            if keep {
                let root = merged.root;
                merged.copy_subtree(root, other, child, &mut Vec::new());
            }
        }
        merged
    }

    /// Copy the subtrees below `from` under `to`, returning `(original, copy)` pairs.
    pub(crate) fn copy_children(&mut self, from: NodeIndex, to: NodeIndex) -> Vec<(NodeIndex, NodeIndex)> {
        let source = self.clone();
        let mut copies = Vec::new();
        for child in source.child_indices(from) {
            self.copy_subtree(to, &source, child, &mut copies);
        }
        copies
    }

    fn copy_subtree(
        &mut self,
        parent: NodeIndex,
        source: &DependencyTree,
        index: NodeIndex,
        copies: &mut Vec<(NodeIndex, NodeIndex)>,
    ) {
        let copy = self.add_child(parent, source.info(index).clone());
        copies.push((index, copy));
        for child in source.child_indices(index) {
            self.copy_subtree(copy, source, child, copies);
        }
    }

    /// Number of nodes, root excluded.
    pub fn len(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the whole tree.
    pub fn to_string_tree(&self) -> String {
        self.render(None)
    }

    /// Render the tree, expanding each module once: later occurrences of an
    /// already expanded module are marked `(*)`. Evicted nodes are shown but
    /// not expanded.
    pub fn render(&self, max_depth: Option<usize>) -> String {
        let mut output = format!("{}\n", self.root().label());
        let mut expanded = HashSet::new();
        let children = self.child_indices(self.root);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.render_subtree(&mut output, child, "", i == count - 1, 1, max_depth, &mut expanded);
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn render_subtree(
        &self,
        output: &mut String,
        index: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        expanded: &mut HashSet<ModuleId>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = self.node(index);
        let children = self.child_indices(index);

        let mut descend = !children.is_empty();
        let mut label = node.label();
        if let NodeInfo::Module(info) = node.info() {
            if info.evicted {
                descend = false;
            } else if info.repeated {
                label.push_str(" (*)");
            } else if descend && !expanded.insert(info.module.clone()) {
                label.push_str(" (*)");
                descend = false;
            }
        }
        output.push_str(&format!("{prefix}{connector}{label}\n"));

        if !descend || max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.render_subtree(
                output,
                child,
                &child_prefix,
                i == count - 1,
                depth + 1,
                max_depth,
                expanded,
            );
        }
    }
}

/// A borrowed view of one node of a [`DependencyTree`].
#[derive(Clone, Copy)]
pub struct DependencyNode<'a> {
    tree: &'a DependencyTree,
    index: NodeIndex,
}

impl<'a> DependencyNode<'a> {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn info(&self) -> &'a NodeInfo {
        self.tree.info(self.index)
    }

    pub fn module_info(&self) -> Option<&'a ModuleNodeInfo> {
        match self.info() {
            NodeInfo::Module(info) => Some(info),
            _ => None,
        }
    }

    pub fn module_id(&self) -> Option<&'a ModuleId> {
        match self.info() {
            NodeInfo::Module(info) => Some(&info.module),
            NodeInfo::Root { holder } => holder.as_ref().map(|(module, _)| module),
            NodeInfo::Files(_) => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.index == self.tree.root
    }

    pub fn parent(&self) -> Option<DependencyNode<'a>> {
        self.tree.parent_index(self.index).map(|i| self.tree.node(i))
    }

    /// Direct children in declaration order.
    pub fn children(&self) -> Vec<DependencyNode<'a>> {
        self.tree
            .child_indices(self.index)
            .into_iter()
            .map(|i| self.tree.node(i))
            .collect()
    }

    /// The first direct child for `module`, preferring one not evicted.
    pub fn child(&self, module: &ModuleId) -> Option<DependencyNode<'a>> {
        let matching = self.get_children(module);
        matching
            .iter()
            .find(|c| c.module_info().is_some_and(|m| !m.evicted))
            .or(matching.first())
            .copied()
    }

    /// Every direct child for `module`, evicted ones included.
    pub fn get_children(&self, module: &ModuleId) -> Vec<DependencyNode<'a>> {
        self.children()
            .into_iter()
            .filter(|c| c.module_id() == Some(module))
            .collect()
    }

    /// Every node below this one, pre-order.
    pub fn descendants(&self) -> Vec<DependencyNode<'a>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.tree.child_indices(self.index).into_iter().rev().collect();
        while let Some(index) = stack.pop() {
            out.push(self.tree.node(index));
            stack.extend(self.tree.child_indices(index).into_iter().rev());
        }
        out
    }

    /// The direct child of this node through which `module` was brought in.
    pub fn root_ancestor(&self, module: &ModuleId) -> Option<DependencyNode<'a>> {
        self.children().into_iter().find(|child| {
            child.module_id() == Some(module)
                || child
                    .descendants()
                    .iter()
                    .any(|d| d.module_id() == Some(module))
        })
    }

    /// One-line description used when rendering.
    pub fn label(&self) -> String {
        match self.info() {
            NodeInfo::Root { holder: Some((module, version)) } => format!("{module}:{version}"),
            NodeInfo::Root { holder: None } => "(anonymous)".to_string(),
            NodeInfo::Files(files) => {
                let names: Vec<String> = files.files.iter().map(|p| p.display().to_string()).collect();
                format!("files [{}]{}", names.join(", "), scopes_suffix(&files.declared_scopes, true))
            }
            NodeInfo::Module(info) => {
                let mut label = info.to_string();
                let at_root = self.parent().is_some_and(|p| p.is_root());
                label.push_str(&scopes_suffix(&info.declared_scopes, at_root));
                if info.evicted {
                    label.push_str(" (evicted)");
                }
                if let Some(failure) = &info.failure {
                    label.push_str(&format!(" (failed: {failure})"));
                }
                label
            }
        }
    }
}

fn scopes_suffix(scopes: &BTreeSet<Scope>, show: bool) -> String {
    if !show || scopes.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = scopes.iter().map(Scope::name).collect();
    format!(" [{}]", names.join(", "))
}

impl fmt::Debug for DependencyNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyNode")
            .field("index", &self.index.index())
            .field("info", self.info())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::scope;

    fn module(coordinate: &str) -> NodeInfo {
        let mut parts = coordinate.split(':');
        let group = parts.next().unwrap();
        let name = parts.next().unwrap();
        let version = Version::parse(parts.next().unwrap()).unwrap();
        let mut info = ModuleNodeInfo::new(ModuleId::new(group, name), VersionRange::fixed(version.clone()));
        info.candidate_version = Some(version.clone());
        info.resolved_version = Some(version);
        info.configurations.insert(MASTER.to_string());
        NodeInfo::Module(info)
    }

    /// root
    /// ├── a:a:1.0
    /// │   └── c:c:1.0
    /// │       └── d:d:1.0
    /// └── b:b:1.0
    ///     └── c:c:1.0
    ///         └── d:d:1.0
    fn diamond() -> DependencyTree {
        let mut tree = DependencyTree::new(Some((ModuleId::new("com.example", "app"), Version::parse("0.1.0").unwrap())));
        let root = tree.root_index();
        let a = tree.add_child(root, module("a:a:1.0"));
        let b = tree.add_child(root, module("b:b:1.0"));
        let c1 = tree.add_child(a, module("c:c:1.0"));
        tree.add_child(c1, module("d:d:1.0"));
        let c2 = tree.add_child(b, module("c:c:1.0"));
        tree.add_child(c2, module("d:d:1.0"));
        tree
    }

    #[test]
    fn children_keep_insertion_order() {
        let tree = diamond();
        let names: Vec<String> = tree
            .root()
            .children()
            .iter()
            .map(|c| c.module_id().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a:a", "b:b"]);
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = diamond();
        let names: Vec<String> = tree
            .flatten()
            .iter()
            .map(|c| c.module_id().unwrap().name.clone())
            .collect();
        assert_eq!(names, ["a", "c", "d", "b", "c", "d"]);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn diamond_renders_once_expanded() {
        let rendered = diamond().to_string_tree();
        assert_eq!(
            rendered,
            "com.example:app:0.1.0\n\
             ├── a:a:1.0\n\
             │   └── c:c:1.0\n\
             │       └── d:d:1.0\n\
             └── b:b:1.0\n\
             \u{20}   └── c:c:1.0 (*)\n"
        );
    }

    #[test]
    fn render_respects_max_depth() {
        let rendered = diamond().render(Some(1));
        assert!(rendered.contains("a:a:1.0"));
        assert!(!rendered.contains("c:c"));
    }

    #[test]
    fn root_ancestor_and_path() {
        let tree = diamond();
        let d = ModuleId::new("d", "d");
        let ancestor = tree.root().root_ancestor(&d).unwrap();
        assert_eq!(ancestor.module_id().unwrap().name, "a");

        let path = tree.find_path(&d).unwrap();
        let labels: Vec<String> = path.iter().map(|n| n.label()).collect();
        assert_eq!(labels, ["com.example:app:0.1.0", "a:a:1.0", "c:c:1.0", "d:d:1.0"]);
        assert!(tree.find_path(&ModuleId::new("x", "x")).is_none());
    }

    #[test]
    fn child_lookup_prefers_live_occurrence() {
        let mut tree = DependencyTree::new(None);
        let root = tree.root_index();
        let old = tree.add_child(root, module("x:x:1.0"));
        tree.add_child(root, module("x:x:2.0"));
        tree.module_info_mut(old).unwrap().evicted = true;

        let x = ModuleId::new("x", "x");
        assert_eq!(tree.root().get_children(&x).len(), 2);
        let child = tree.root().child(&x).unwrap();
        assert_eq!(child.module_info().unwrap().candidate_version.as_ref().unwrap().as_str(), "2.0");
    }

    #[test]
    fn evicted_subtree_is_not_live() {
        let mut tree = diamond();
        let b = tree.root().child(&ModuleId::new("b", "b")).unwrap().index();
        tree.module_info_mut(b).unwrap().evicted = true;
        assert_eq!(tree.live_indices().len(), 4);
        let provider = tree.to_version_provider();
        assert!(provider.contains(&ModuleId::new("d", "d")));
        assert!(!provider.contains(&ModuleId::new("b", "b")));
    }

    #[test]
    fn merge_keeps_own_occurrence() {
        let left = diamond();
        let mut right = DependencyTree::new(None);
        let root = right.root_index();
        right.add_child(root, module("a:a:9.0"));
        let e = right.add_child(root, module("e:e:1.0"));
        right.add_child(e, module("f:f:1.0"));

        let merged = left.merge(&right);
        let a = merged.root().child(&ModuleId::new("a", "a")).unwrap();
        assert_eq!(a.module_info().unwrap().resolved_version.as_ref().unwrap().as_str(), "1.0");
        let e = merged.root().child(&ModuleId::new("e", "e")).unwrap();
        assert_eq!(e.children().len(), 1);
        assert_eq!(merged.len(), 8);
    }

    #[test]
    fn labels_show_scopes_eviction_and_resolution() {
        let mut tree = DependencyTree::new(None);
        let root = tree.root_index();
        let mut info = ModuleNodeInfo::new(ModuleId::new("x", "x"), VersionRange::parse("1.4.+").unwrap());
        info.candidate_version = Some(Version::parse("1.4.7").unwrap());
        info.resolved_version = Some(Version::parse("1.5.0").unwrap());
        info.evicted = true;
        info.declared_scopes.insert(scope::test());
        let x = tree.add_child(root, NodeInfo::Module(info));
        assert_eq!(tree.node(x).label(), "x:x:1.4.+ -> 1.4.7 -> 1.5.0 [test] (evicted)");
        assert_eq!(tree.root().label(), "(anonymous)");
    }
}
