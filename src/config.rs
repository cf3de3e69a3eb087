//! Layered configuration: defaults, then an optional file, then environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use subwatch_reconciler::ReconcilerConfig;
use subwatch_store::StoreConfig;
use subwatch_tracker::TrackerConfig;
use subwatch_upstream::UpstreamConfig;

/// Environment variable holding the issue tracker token.
pub const TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";
pub const STORE_URL_VAR: &str = "SUBWATCH_STORE_URL";
pub const OWNER_VAR: &str = "SUBWATCH_GITHUB_OWNER";
pub const REPO_VAR: &str = "SUBWATCH_GITHUB_REPO";
pub const TEMPLATES_DIR_VAR: &str = "SUBWATCH_TEMPLATES_DIR";

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("unsupported config format for {} (expected .toml or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// Complete configuration for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubwatchConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub cycle: ReconcilerConfig,
}

impl SubwatchConfig {
    /// Load defaults, overlay `path` if given, then the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Parse a `.toml` or `.json` file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has another extension, or
    /// does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |reason: String| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Overlay environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(TOKEN_VAR) {
            self.tracker.token = Some(token);
        }
        if let Some(url) = lookup(STORE_URL_VAR) {
            self.store.url = url;
        }
        if let Some(owner) = lookup(OWNER_VAR) {
            self.tracker.owner = owner;
        }
        if let Some(repo) = lookup(REPO_VAR) {
            self.tracker.repo = repo;
        }
        if let Some(dir) = lookup(TEMPLATES_DIR_VAR) {
            self.tracker.templates_dir = PathBuf::from(dir);
        }
        self
    }
}
