//! Core resolution algorithm: scope pruning at the root, level-wise transitive
//! expansion through configuration mappings, exclusions and transitivity,
//! then conflict resolution and artifact collection.
//!
//! Each level is expanded concurrently: dynamic versions are resolved and
//! declared dependencies fetched for every node of the level at once, bounded
//! by `jobs` and `fetch_timeout`. Answers are memoized for the rest of the call.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use petgraph::graph::NodeIndex;
use strata_core::dependency::{Dependency, Exclusion, ScopeSpec, ScopedDependency, Transitivity};
use strata_core::dependency_set::DependencySet;
use strata_core::module_id::ModuleId;
use strata_core::scope::{self, Scope};
use strata_core::scope_mapping::MASTER;
use strata_core::version::{Version, VersionRange};
use strata_repo::{DeclaredDependency, Repository, RepositoryError};
use strata_util::errors::StrataError;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::{FetchCache, FetchError, Fetched};
use crate::config::ResolverConfig;
use crate::conflict::{resolve_conflicts, ConflictReport};
use crate::result::{FailureKind, ResolutionFailure, ResolveResult};
use crate::tree::{DependencyTree, FileNodeInfo, ModuleNodeInfo, NodeInfo};

/// Resolves dependency sets against one repository.
pub struct Resolver<R> {
    repo: Arc<R>,
    config: ResolverConfig,
}

impl<R: Repository + 'static> Resolver<R> {
    pub fn new(repo: Arc<R>, config: ResolverConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Resolve `dependencies` for `targets`; no targets means every scope
    /// the set declares.
    ///
    /// Configuration defects (unmapped scopes, missing versions) fail the
    /// call. Repository failures are recorded in the result, or fail the call
    /// when `fail_fast` is set.
    pub async fn resolve(&self, dependencies: &DependencySet, targets: &[Scope]) -> Result<ResolveResult, StrataError> {
        let targets = self.target_scopes(dependencies, targets);
        let names: Vec<&str> = targets.iter().map(Scope::name).collect();
        tracing::debug!("resolving {} declarations for [{}]", dependencies.len(), names.join(", "));

        let mut session = Session::new(self, dependencies);
        session.expand_root(&targets)?;
        session.expand_levels().await?;
        let conflicts = session.settle_conflicts();
        let files = session.collect_files().await?;

        let Session { tree, failures, .. } = session;
        let version_provider = tree.to_version_provider();
        tracing::info!(
            "resolved {} modules, {} files, {} conflicts, {} failures",
            version_provider.len(),
            files.len(),
            conflicts.len(),
            failures.len()
        );
        Ok(ResolveResult {
            tree,
            files,
            version_provider,
            conflicts,
            failures,
        })
    }

    /// Targets looked up in the registry so custom hierarchies apply.
    fn target_scopes(&self, dependencies: &DependencySet, targets: &[Scope]) -> Vec<Scope> {
        let registry = &self.config.registry;
        if targets.is_empty() {
            let declared: BTreeSet<Scope> = dependencies
                .iter()
                .flat_map(|d| self.effective_spec(dependencies, d).declared_scopes())
                .collect();
            return declared.iter().map(|s| registry.scope(s.name())).collect();
        }
        targets
            .iter()
            .map(|s| registry.get(s.name()).cloned().unwrap_or_else(|| s.clone()))
            .collect()
    }

    fn effective_spec(&self, dependencies: &DependencySet, dependency: &ScopedDependency) -> ScopeSpec {
        match dependencies.effective_scope(dependency) {
            ScopeSpec::Unset => ScopeSpec::simple(&self.config.default_scopes),
            spec => spec.clone(),
        }
    }

    /// Configurations of a dependency selected by `configuration` of its dependent.
    fn translate(&self, configuration: &str) -> BTreeSet<String> {
        match self.config.default_mapping.mapped_scopes(&Scope::of(configuration)) {
            Ok(targets) => targets.clone(),
            Err(_) => BTreeSet::from([MASTER.to_string(), configuration.to_string()]),
        }
    }

    /// Run `fetch` for every key, at most `jobs` at a time, each bounded by the
    /// fetch timeout. Outcomes come back in key order.
    async fn fetch_all<K, T, F, Fut>(&self, keys: Vec<K>, fetch: F) -> Vec<(K, Fetched<T>)>
    where
        K: Clone + Send + 'static,
        T: Send + 'static,
        F: Fn(Arc<R>, K) -> Fut,
        Fut: Future<Output = Result<T, RepositoryError>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.jobs.max(1)));
        let timeout = self.config.fetch_timeout;
        let mut join_set = JoinSet::new();
        for (i, key) in keys.iter().cloned().enumerate() {
            let sem = semaphore.clone();
            let request = fetch(self.repo.clone(), key);
            join_set.spawn(async move {
                let _permit = sem.acquire().await;
                (i, bounded(timeout, request).await)
            });
        }

        let mut outcomes: Vec<Option<Fetched<T>>> = keys.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((i, outcome)) => outcomes[i] = Some(outcome),
                Err(e) => tracing::warn!("fetch task failed: {e}"),
            }
        }
        keys.into_iter()
            .zip(outcomes)
            .map(|(key, outcome)| {
                let outcome = outcome
                    .unwrap_or_else(|| Err(FetchError::new(FailureKind::Aborted, "fetch task aborted")));
                (key, outcome)
            })
            .collect()
    }
}

async fn bounded<T>(timeout: Duration, request: impl Future<Output = Result<T, RepositoryError>>) -> Fetched<T> {
    match tokio::time::timeout(timeout, request).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(FetchError::new(FailureKind::Timeout, format!("timed out after {timeout:?}"))),
    }
}

/// Keep the first item for every distinct `key`.
fn dedup_by<T, K: Eq + Hash>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Rules inherited down one branch of the tree.
#[derive(Debug, Clone, Default)]
struct Branch {
    exclusions: Vec<Exclusion>,
    transitivity: Transitivity,
}

impl Branch {
    fn excludes(&self, dependency: &DeclaredDependency) -> bool {
        self.exclusions.iter().any(|e| {
            e.matches(
                &dependency.module,
                dependency.classifier.as_deref(),
                dependency.artifact_type.as_deref(),
            )
        })
    }

    fn child(&self, dependency: &DeclaredDependency) -> Branch {
        let mut exclusions = self.exclusions.clone();
        for exclusion in &dependency.exclusions {
            if !exclusions.contains(exclusion) {
                exclusions.push(exclusion.clone());
            }
        }
        Branch {
            exclusions,
            transitivity: self.transitivity.restrict(dependency.transitivity),
        }
    }
}

/// What makes two occurrences of a module expand to the same subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExpansionKey {
    module: ModuleId,
    version: String,
    configurations: BTreeSet<String>,
    transitivity: Transitivity,
    exclusions: BTreeSet<Exclusion>,
}

const MAX_SETTLE_ROUNDS: usize = 32;

/// State of one `resolve` call.
struct Session<'a, R> {
    resolver: &'a Resolver<R>,
    dependencies: &'a DependencySet,
    tree: DependencyTree,
    branches: HashMap<NodeIndex, Branch>,
    cache: FetchCache,
    failures: Vec<ResolutionFailure>,
    /// The occurrence expanded for each key.
    expanded: HashMap<ExpansionKey, NodeIndex>,
    /// Repeated occurrence to the occurrence holding its dependencies.
    twins: HashMap<NodeIndex, NodeIndex>,
}

impl<'a, R: Repository + 'static> Session<'a, R> {
    fn new(resolver: &'a Resolver<R>, dependencies: &'a DependencySet) -> Self {
        Self {
            resolver,
            dependencies,
            tree: DependencyTree::new(resolver.config.module_holder.clone()),
            branches: HashMap::new(),
            cache: FetchCache::new(),
            failures: Vec::new(),
            expanded: HashMap::new(),
            twins: HashMap::new(),
        }
    }

    /// Add a child for every declaration visible in `targets`. Declarations
    /// for other scopes are dropped here and never reach the repository.
    fn expand_root(&mut self, targets: &[Scope]) -> Result<(), StrataError> {
        let resolver = self.resolver;
        let root = self.tree.root_index();
        for declared in self.dependencies {
            let spec = resolver.effective_spec(self.dependencies, declared);
            let scopes = spec.declared_scopes();
            let active: Vec<&Scope> = scopes.iter().filter(|s| s.is_visible_in_any(targets)).collect();
            if active.is_empty() {
                tracing::debug!("skipping {declared}: not visible in the target scopes");
                continue;
            }

            let module = match declared.dependency() {
                Dependency::Files(files) => {
                    self.tree.add_child(
                        root,
                        NodeInfo::Files(FileNodeInfo {
                            files: files.files.clone(),
                            declared_scopes: scopes.clone(),
                        }),
                    );
                    continue;
                }
                Dependency::Module(module) => module,
            };

            let mut configurations = BTreeSet::new();
            for scope in &active {
                match &spec {
                    ScopeSpec::Mapped(mapping) => configurations.extend(mapping.mapped_scopes(scope)?.iter().cloned()),
                    _ => configurations.extend(resolver.translate(scope.name())),
                }
            }

            let candidate = self.initial_version(&module.module, &module.version)?;
            if let Some(existing) = self.root_duplicate(&module.module, &module.version) {
                if let Some(info) = self.tree.module_info_mut(existing) {
                    info.configurations.extend(configurations);
                    info.declared_scopes.extend(scopes);
                }
                continue;
            }

            let mut info = ModuleNodeInfo::new(module.module.clone(), module.version.clone());
            info.pinned = candidate.is_some();
            info.candidate_version = candidate;
            info.declared_scopes = scopes;
            info.configurations = configurations;
            info.classifier = module.classifier.clone();
            info.artifact_type = module.artifact_type.clone();
            let index = self.tree.add_child(root, NodeInfo::Module(info));

            let mut exclusions = module.exclusions.clone();
            for exclusion in self.dependencies.global_exclusions() {
                if !exclusions.contains(exclusion) {
                    exclusions.push(exclusion.clone());
                }
            }
            self.branches.insert(
                index,
                Branch {
                    exclusions,
                    transitivity: module.transitivity,
                },
            );
        }
        Ok(())
    }

    /// A root child already declaring `module` at the same version.
    fn root_duplicate(&self, module: &ModuleId, version: &VersionRange) -> Option<NodeIndex> {
        self.tree
            .root()
            .children()
            .into_iter()
            .find(|c| {
                c.module_info()
                    .is_some_and(|m| &m.module == module && m.declared_version == *version)
            })
            .map(|c| c.index())
    }

    /// The version a root occurrence starts from; `None` for a dynamic range
    /// still to be resolved against the repository.
    fn initial_version(&self, module: &ModuleId, declared: &VersionRange) -> Result<Option<Version>, StrataError> {
        if let Some(version) = declared.fixed_version() {
            return Ok(Some(version.clone()));
        }
        if let Some(pinned) = self.dependencies.version_provider().version_of(module) {
            tracing::debug!("{module}: using provided version {pinned} for '{declared}'");
            return Ok(Some(pinned.clone()));
        }
        if declared.is_unspecified() {
            return Err(StrataError::UnresolvedVersion {
                module: module.to_string(),
            });
        }
        Ok(None)
    }

    async fn expand_levels(&mut self) -> Result<(), StrataError> {
        let mut level: Vec<NodeIndex> = self
            .tree
            .child_indices(self.tree.root_index())
            .into_iter()
            .filter(|&i| self.branches.contains_key(&i))
            .collect();
        let mut depth = 1;
        while !level.is_empty() {
            tracing::debug!("expanding level {depth}: {} nodes", level.len());
            self.resolve_dynamic_versions(&level).await?;
            let expandable: Vec<NodeIndex> = level.iter().copied().filter(|&i| self.is_expandable(i)).collect();
            self.fetch_declared(&expandable).await;

            let mut next = Vec::new();
            for index in expandable {
                next.extend(self.add_children(index)?);
            }
            level = next;
            depth += 1;
        }
        Ok(())
    }

    async fn resolve_dynamic_versions(&mut self, level: &[NodeIndex]) -> Result<(), StrataError> {
        let pending: Vec<NodeIndex> = level
            .iter()
            .copied()
            .filter(|&i| {
                matches!(self.tree.info(i), NodeInfo::Module(m) if m.candidate_version.is_none() && m.failure.is_none())
            })
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let to_fetch = dedup_by(
            pending.iter().filter_map(|&i| {
                let module = self.tree.node(i).module_id()?;
                self.cache.versions(module).is_none().then(|| module.clone())
            }),
            ModuleId::clone,
        );
        let fetched = self
            .resolver
            .fetch_all(to_fetch, |repo, module: ModuleId| async move {
                repo.list_available_versions(&module).await
            })
            .await;
        for (module, outcome) in fetched {
            self.cache.insert_versions(module, outcome);
        }

        for index in pending {
            let Some(info) = self.tree.module_info_mut(index) else {
                continue;
            };
            let outcome = match self.cache.versions(&info.module) {
                Some(Ok(available)) => info
                    .declared_version
                    .select(available)
                    .cloned()
                    .ok_or_else(|| {
                        FetchError::new(
                            FailureKind::NoMatchingVersion,
                            format!("no version matching '{}'", info.declared_version),
                        )
                    }),
                Some(Err(error)) => Err(error.clone()),
                None => Err(FetchError::new(FailureKind::Aborted, "available versions unknown")),
            };
            match outcome {
                Ok(version) => {
                    tracing::debug!("{}: '{}' resolved to {version}", info.module, info.declared_version);
                    info.candidate_version = Some(version);
                }
                Err(error) => self.fail(index, error)?,
            }
        }
        Ok(())
    }

    /// Whether the declared dependencies of a node are wanted.
    fn is_expandable(&self, index: NodeIndex) -> bool {
        let NodeInfo::Module(info) = self.tree.info(index) else {
            return false;
        };
        if info.failure.is_some() || info.candidate_version.is_none() {
            return false;
        }
        if info.configurations.iter().all(|c| c == MASTER) {
            return false;
        }
        if self
            .branches
            .get(&index)
            .is_some_and(|b| b.transitivity == Transitivity::None)
        {
            return false;
        }
        !self.is_cycle(index, &info.module)
    }

    /// Whether `module` already occurs among the ancestors of `index`.
    fn is_cycle(&self, index: NodeIndex, module: &ModuleId) -> bool {
        let mut current = self.tree.parent_index(index);
        while let Some(parent) = current {
            if self.tree.node(parent).module_info().is_some_and(|m| &m.module == module) {
                tracing::debug!("{module}: cycle, not expanding again");
                return true;
            }
            current = self.tree.parent_index(parent);
        }
        false
    }

    async fn fetch_declared(&mut self, nodes: &[NodeIndex]) {
        let to_fetch = dedup_by(
            nodes.iter().filter_map(|&i| {
                let info = self.tree.node(i).module_info()?;
                let version = info.candidate_version.as_ref()?;
                (!self.cache.has_declared(&info.module, version)).then(|| (info.module.clone(), version.clone()))
            }),
            |(module, version)| (module.clone(), version.as_str().to_string()),
        );
        if to_fetch.is_empty() {
            return;
        }
        let fetched = self
            .resolver
            .fetch_all(to_fetch, |repo, (module, version): (ModuleId, Version)| async move {
                repo.fetch_declared_dependencies(&module, &version).await
            })
            .await;
        for ((module, version), outcome) in fetched {
            match &outcome {
                Ok(declared) => tracing::debug!("fetched {module}:{version}: {} declared", declared.len()),
                Err(e) => tracing::debug!("fetching {module}:{version} failed: {e}"),
            }
            self.cache.insert_declared(module, &version, outcome);
        }
    }

    /// Add the declared dependencies of `index` selected by its requested
    /// configurations. Returns the new children.
    fn add_children(&mut self, index: NodeIndex) -> Result<Vec<NodeIndex>, StrataError> {
        let (module, version, mut requests) = match self.tree.info(index) {
            NodeInfo::Module(info) => match &info.candidate_version {
                Some(version) => (info.module.clone(), version.clone(), info.configurations.clone()),
                None => return Ok(Vec::new()),
            },
            _ => return Ok(Vec::new()),
        };
        let declared = match self.cache.declared(&module, &version) {
            Some(Ok(declared)) => declared.clone(),
            Some(Err(error)) => {
                let error = error.clone();
                self.fail(index, error)?;
                return Ok(Vec::new());
            }
            None => return Ok(Vec::new()),
        };

        let branch = self.branches.get(&index).cloned().unwrap_or_default();
        let key = ExpansionKey {
            module: module.clone(),
            version: version.as_str().to_string(),
            configurations: requests.clone(),
            transitivity: branch.transitivity,
            exclusions: branch.exclusions.iter().cloned().collect(),
        };
        if let Some(&twin) = self.expanded.get(&key) {
            tracing::debug!("{module}:{version}: already expanded, not repeating");
            if let Some(info) = self.tree.module_info_mut(index) {
                info.repeated = true;
            }
            self.twins.insert(index, twin);
            return Ok(Vec::new());
        }
        self.expanded.insert(key, index);

        let resolver = self.resolver;
        let registry = &resolver.config.registry;
        requests.remove(MASTER);
        if branch.transitivity == Transitivity::Runtime {
            // Anything beyond runtime is narrowed down to runtime.
            let runtime = registry.scope(scope::RUNTIME);
            requests = requests
                .into_iter()
                .map(|r| {
                    if registry.scope(&r).is_visible_in(&runtime) {
                        r
                    } else {
                        scope::RUNTIME.to_string()
                    }
                })
                .collect();
        }
        let requested: Vec<Scope> = requests.iter().map(|r| registry.scope(r)).collect();

        let mut added: Vec<NodeIndex> = Vec::new();
        for dependency in &declared {
            if branch.excludes(dependency) {
                tracing::debug!("{module}:{version}: excluded {}", dependency.module);
                continue;
            }
            let configuration = registry.scope(&dependency.configuration);
            let mut configurations = BTreeSet::new();
            for request in requested.iter().filter(|r| configuration.is_visible_in(r)) {
                configurations.extend(resolver.translate(request.name()));
            }
            if configurations.is_empty() {
                continue;
            }

            let sibling = added.iter().copied().find(|&c| {
                self.tree.node(c).module_id() == Some(&dependency.module)
            });
            if let Some(sibling) = sibling {
                if let Some(info) = self.tree.module_info_mut(sibling) {
                    info.configurations.extend(configurations);
                    info.declared_scopes.insert(configuration);
                }
                continue;
            }

            let mut info = ModuleNodeInfo::new(dependency.module.clone(), dependency.version.clone());
            info.declared_scopes.insert(configuration);
            info.configurations = configurations;
            info.classifier = dependency.classifier.clone();
            info.artifact_type = dependency.artifact_type.clone();
            let unresolved = match self.transitive_version(&dependency.module, &dependency.version) {
                Ok(candidate) => {
                    info.pinned = candidate.is_some();
                    info.candidate_version = candidate;
                    None
                }
                Err(error) => Some(error),
            };
            let child = self.tree.add_child(index, NodeInfo::Module(info));
            self.branches.insert(child, branch.child(dependency));
            if let Some(error) = unresolved {
                self.fail(child, error)?;
            }
            added.push(child);
        }
        Ok(added)
    }

    /// Resolve conflicts. A repeated occurrence that stays live while its twin
    /// sits in an evicted branch gets a copy of the twin's subtree, and
    /// conflicts are resolved again.
    fn settle_conflicts(&mut self) -> ConflictReport {
        let mut report = resolve_conflicts(&mut self.tree);
        for _ in 0..MAX_SETTLE_ROUNDS {
            let live: HashSet<NodeIndex> = self
                .tree
                .live_indices()
                .into_iter()
                .filter(|&i| matches!(self.tree.info(i), NodeInfo::Module(m) if !m.evicted))
                .collect();
            let mut orphaned: Vec<(NodeIndex, NodeIndex)> = self
                .twins
                .iter()
                .filter(|(repeated, twin)| live.contains(repeated) && !live.contains(twin))
                .map(|(&repeated, &twin)| (repeated, twin))
                .collect();
            if orphaned.is_empty() {
                return report;
            }
            orphaned.sort();
            for (repeated, twin) in orphaned {
                tracing::debug!("expanding a repeated occurrence: its twin was evicted");
                self.twins.remove(&repeated);
                if let Some(info) = self.tree.module_info_mut(repeated) {
                    info.repeated = false;
                }
                for (original, copy) in self.tree.copy_children(twin, repeated) {
                    if let Some(&nested) = self.twins.get(&original) {
                        self.twins.insert(copy, nested);
                    }
                }
            }
            report = resolve_conflicts(&mut self.tree);
        }
        tracing::warn!("repeated occurrences did not settle after {MAX_SETTLE_ROUNDS} rounds");
        report
    }

    /// Like [`initial_version`](Self::initial_version), but a missing version
    /// is a failure of the occurrence rather than of the whole resolution.
    fn transitive_version(&self, module: &ModuleId, declared: &VersionRange) -> Result<Option<Version>, FetchError> {
        if let Some(version) = declared.fixed_version() {
            return Ok(Some(version.clone()));
        }
        if let Some(pinned) = self.dependencies.version_provider().version_of(module) {
            return Ok(Some(pinned.clone()));
        }
        if declared.is_unspecified() {
            return Err(FetchError::new(
                FailureKind::MissingVersion,
                "no version specified and none provided",
            ));
        }
        Ok(None)
    }

    /// Record a failure on a node; fatal when failing fast.
    fn fail(&mut self, index: NodeIndex, error: FetchError) -> Result<(), StrataError> {
        let Some(info) = self.tree.module_info_mut(index) else {
            return Ok(());
        };
        info.failure = Some(error.message.clone());
        let failure = ResolutionFailure {
            module: info.module.clone(),
            version: info
                .candidate_version
                .as_ref()
                .map(|v| v.as_str().to_string())
                .unwrap_or_else(|| info.declared_version.as_str().to_string()),
            kind: error.kind,
            reason: error.message,
        };
        self.record(failure)
    }

    fn record(&mut self, failure: ResolutionFailure) -> Result<(), StrataError> {
        if self.resolver.config.fail_fast {
            return Err(StrataError::Resolution {
                message: failure.to_string(),
            });
        }
        tracing::warn!("{failure}");
        if !self.failures.contains(&failure) {
            self.failures.push(failure);
        }
        Ok(())
    }

    /// Fetch artifacts of live modules whose own artifact was requested and
    /// list them with declared local files, pre-order, without duplicates.
    async fn collect_files(&mut self) -> Result<Vec<PathBuf>, StrataError> {
        let live = self.tree.live_indices();
        let mut wanted: Vec<(NodeIndex, ArtifactRequest)> = Vec::new();
        for &index in &live {
            let NodeInfo::Module(info) = self.tree.info(index) else {
                continue;
            };
            if !info.is_live() || !info.includes_artifact() {
                continue;
            }
            if let Some(version) = &info.resolved_version {
                let request = ArtifactRequest {
                    module: info.module.clone(),
                    version: version.clone(),
                    classifier: info.classifier.clone(),
                    artifact_type: info.artifact_type.clone(),
                };
                wanted.push((index, request));
            }
        }

        let requests = dedup_by(wanted.iter().map(|(_, r)| r.clone()), ArtifactRequest::key);
        let fetched: HashMap<ArtifactKey, Fetched<PathBuf>> = self
            .resolver
            .fetch_all(requests, |repo, request: ArtifactRequest| async move {
                repo.fetch_artifact_file(
                    &request.module,
                    &request.version,
                    request.classifier.as_deref(),
                    request.artifact_type.as_deref(),
                )
                .await
            })
            .await
            .into_iter()
            .map(|(request, outcome)| (request.key(), outcome))
            .collect();

        let mut reported = HashSet::new();
        for (index, request) in &wanted {
            match fetched.get(&request.key()) {
                Some(Ok(path)) => {
                    if let Some(info) = self.tree.module_info_mut(*index) {
                        info.files = vec![path.clone()];
                    }
                }
                Some(Err(error)) if reported.insert(request.key()) => {
                    let failure = ResolutionFailure {
                        module: request.module.clone(),
                        version: request.version.as_str().to_string(),
                        kind: error.kind,
                        reason: error.message.clone(),
                    };
                    self.record(failure)?;
                }
                _ => {}
            }
        }

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for index in live {
            let paths = match self.tree.info(index) {
                NodeInfo::Module(info) if info.is_live() => &info.files,
                NodeInfo::Files(declared) => &declared.files,
                _ => continue,
            };
            for path in paths {
                if seen.insert(path.clone()) {
                    files.push(path.clone());
                }
            }
        }
        Ok(files)
    }
}

type ArtifactKey = (ModuleId, String, Option<String>, Option<String>);

#[derive(Debug, Clone)]
struct ArtifactRequest {
    module: ModuleId,
    version: Version,
    classifier: Option<String>,
    artifact_type: Option<String>,
}

impl ArtifactRequest {
    fn key(&self) -> ArtifactKey {
        (
            self.module.clone(),
            self.version.as_str().to_string(),
            self.classifier.clone(),
            self.artifact_type.clone(),
        )
    }
}
