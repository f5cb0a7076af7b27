//! Parameters of a resolution, built by the caller and passed in whole.

use std::time::Duration;

use strata_core::config::ResolveConfig;
use strata_core::module_id::ModuleId;
use strata_core::scope::{self, Scope, ScopeRegistry};
use strata_core::scope_mapping::ScopeMapping;
use strata_core::version::Version;
use strata_util::errors::StrataError;

const DEFAULT_JOBS: usize = 8;
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Scopes known to this resolution; configuration names from the
    /// repository are looked up here too.
    pub registry: ScopeRegistry,
    /// Mapping applied to dependencies declared with simple scopes and to
    /// every transitive level.
    pub default_mapping: ScopeMapping,
    /// Scopes of dependencies declared without any.
    pub default_scopes: Vec<Scope>,
    /// Maximum concurrent repository calls.
    pub jobs: usize,
    /// Limit for a single repository call.
    pub fetch_timeout: Duration,
    /// Abort on the first repository failure instead of recording it.
    pub fail_fast: bool,
    /// Module the tree root stands for.
    pub module_holder: Option<(ModuleId, Version)>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            registry: ScopeRegistry::standard(),
            default_mapping: ScopeMapping::default_mapping(),
            default_scopes: vec![scope::compile()],
            jobs: DEFAULT_JOBS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fail_fast: false,
            module_holder: None,
        }
    }
}

impl ResolverConfig {
    /// Build from the `[resolve]` settings of the global config and a project registry.
    pub fn from_settings(settings: &ResolveConfig, registry: ScopeRegistry) -> Result<Self, StrataError> {
        let default_scope = registry.require(&settings.default_scope)?;
        Ok(Self {
            registry,
            default_scopes: vec![default_scope],
            jobs: settings.jobs.max(1),
            fetch_timeout: Duration::from_secs(settings.fetch_timeout_secs),
            fail_fast: settings.fail_fast,
            ..Self::default()
        })
    }

    pub fn with_registry(mut self, registry: ScopeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_default_mapping(mut self, mapping: ScopeMapping) -> Self {
        self.default_mapping = mapping;
        self
    }

    pub fn with_default_scopes(mut self, scopes: &[Scope]) -> Self {
        self.default_scopes = scopes.to_vec();
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_module_holder(mut self, module: ModuleId, version: Version) -> Self {
        self.module_holder = Some((module, version));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_over() {
        let settings = ResolveConfig {
            jobs: 0,
            fetch_timeout_secs: 5,
            fail_fast: true,
            default_scope: "runtime".to_string(),
        };
        let config = ResolverConfig::from_settings(&settings, ScopeRegistry::standard()).unwrap();
        assert_eq!(config.jobs, 1);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert!(config.fail_fast);
        assert_eq!(config.default_scopes, vec![scope::runtime()]);
        assert!(config.default_scopes[0].all_ancestors().contains(&scope::compile()));
    }

    #[test]
    fn unknown_default_scope_is_config_error() {
        let settings = ResolveConfig {
            default_scope: "integration".to_string(),
            ..ResolveConfig::default()
        };
        let err = ResolverConfig::from_settings(&settings, ScopeRegistry::standard()).unwrap_err();
        assert!(matches!(err, StrataError::Config { .. }));
    }
}
