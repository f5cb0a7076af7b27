use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use strata_util::errors::StrataError;

/// Global user configuration loaded from `~/.strata/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub repository: RepositoryConfig,
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolveConfig {
    /// Maximum concurrent repository fetches within one tree level.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default = "default_scope")]
    pub default_scope: String,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            fetch_timeout_secs: default_fetch_timeout(),
            fail_fast: false,
            default_scope: default_scope(),
        }
    }
}

fn default_jobs() -> usize {
    8
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_scope() -> String {
    crate::scope::COMPILE.to_string()
}

/// Local repository settings from `[repository]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_repository_path")]
    pub path: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: default_repository_path(),
        }
    }
}

fn default_repository_path() -> String {
    "~/.strata/repository".to_string()
}

impl RepositoryConfig {
    /// The repository path with a leading `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.path)
    }
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> Result<Self, StrataError> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, StrataError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, StrataError> {
        toml::from_str(content).map_err(|e| StrataError::Config {
            message: format!("Failed to parse global config: {e}"),
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the Strata data directory: `$STRATA_HOME`, else `~/.strata/`.
pub fn dirs_path() -> PathBuf {
    if let Ok(home) = std::env::var("STRATA_HOME") {
        if !home.is_empty() {
            return PathBuf::from(home);
        }
    }
    home_dir().join(".strata")
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None if path == "~" => home_dir(),
        None => PathBuf::from(path),
    }
}
