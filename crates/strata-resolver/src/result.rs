//! What a resolution produces.

use std::fmt;
use std::path::PathBuf;

use strata_core::module_id::ModuleId;
use strata_core::version::Version;
use strata_core::version_provider::VersionProvider;
use strata_util::errors::StrataError;

use crate::conflict::ConflictReport;
use crate::tree::{DependencyTree, NodeInfo};

/// What went wrong for a module occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ModuleNotFound,
    ArtifactNotFound,
    Network,
    Descriptor,
    Io,
    /// The repository call exceeded the fetch timeout.
    Timeout,
    /// No available version satisfies a dynamic range.
    NoMatchingVersion,
    /// No version declared and none provided.
    MissingVersion,
    /// The fetch task died before answering.
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ModuleNotFound => "module not found",
            Self::ArtifactNotFound => "artifact not found",
            Self::Network => "network",
            Self::Descriptor => "descriptor",
            Self::Io => "i/o",
            Self::Timeout => "timeout",
            Self::NoMatchingVersion => "no matching version",
            Self::MissingVersion => "missing version",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// A repository failure recorded against one module occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    pub module: ModuleId,
    /// The version asked for, as declared when it never resolved.
    pub version: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}: {}", self.module, self.reason)
        } else {
            write!(f, "{}:{}: {}", self.module, self.version, self.reason)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolveResult {
    pub tree: DependencyTree,
    /// Artifact files of live modules and declared local files, pre-order, no duplicates.
    pub files: Vec<PathBuf>,
    /// Winning version of every live module.
    pub version_provider: VersionProvider,
    pub conflicts: ConflictReport,
    pub failures: Vec<ResolutionFailure>,
}

impl ResolveResult {
    pub fn dependency_tree(&self) -> &DependencyTree {
        &self.tree
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn resolved_version_provider(&self) -> &VersionProvider {
        &self.version_provider
    }

    /// Whether `module` resolved to a live occurrence.
    pub fn contains(&self, module: &ModuleId) -> bool {
        self.version_provider.contains(module)
    }

    pub fn version_of(&self, module: &ModuleId) -> Option<&Version> {
        self.version_provider.version_of(module)
    }

    pub fn errors(&self) -> &[ResolutionFailure] {
        &self.failures
    }

    /// Failures of one kind.
    pub fn errors_of(&self, kind: FailureKind) -> impl Iterator<Item = &ResolutionFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn conflicts(&self) -> &ConflictReport {
        &self.conflicts
    }

    /// Fail with every recorded repository failure, if any.
    pub fn assert_no_error(&self) -> Result<(), StrataError> {
        if self.failures.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        Err(StrataError::Resolution {
            message: messages.join("; "),
        })
    }

    /// Number of module occurrences in the tree that were not evicted.
    pub fn live_module_count(&self) -> usize {
        self.tree
            .live_indices()
            .into_iter()
            .filter(|&i| matches!(self.tree.info(i), NodeInfo::Module(m) if !m.evicted))
            .count()
    }
}
