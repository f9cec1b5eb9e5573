//! Configuration handling for the mirror.
//!
//! Configuration is stored in `.spyglass/config.yaml` and includes:
//! - The default repository to mirror
//! - The GitHub authentication token
//! - Polling intervals for items and labels

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::remote::{RepoRef, RepoSession};

/// Directory holding the config file, relative to the working directory.
pub const CONFIG_DIR: &str = ".spyglass";

/// Reference polling period for the item mirror.
const DEFAULT_ITEM_INTERVAL_SECS: u64 = 20;

/// Reference polling period for the lighter auxiliary label poll.
const DEFAULT_LABEL_INTERVAL_SECS: u64 = 5;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default repository to mirror, as `owner/repo`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_repo: Option<String>,

    /// Authentication tokens
    #[serde(default)]
    pub auth: AuthConfig,

    /// Polling periods
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubAuth>,
}

/// GitHub authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubAuth {
    pub token: String,
}

/// Polling periods, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_item_interval")]
    pub items_interval_secs: u64,
    #[serde(default = "default_label_interval")]
    pub labels_interval_secs: u64,
}

fn default_item_interval() -> u64 {
    DEFAULT_ITEM_INTERVAL_SECS
}

fn default_label_interval() -> u64 {
    DEFAULT_LABEL_INTERVAL_SECS
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            items_interval_secs: DEFAULT_ITEM_INTERVAL_SECS,
            labels_interval_secs: DEFAULT_LABEL_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get GitHub token from environment variable or config file
    pub fn github_token(&self) -> Option<String> {
        if let Ok(token) = env::var("GITHUB_TOKEN")
            && !token.is_empty()
        {
            return Some(token);
        }

        self.auth.github.as_ref().map(|g| g.token.clone())
    }

    /// Set GitHub token
    pub fn set_github_token(&mut self, token: String) {
        self.auth.github = Some(GitHubAuth { token });
    }

    /// Set the default repository
    pub fn set_default_repo(&mut self, repo: &RepoRef) {
        self.default_repo = Some(repo.to_string());
    }

    /// Build a session for the configured default repository, if any
    pub fn default_session(&self) -> Result<Option<RepoSession>> {
        match &self.default_repo {
            Some(raw) => Ok(Some(RepoSession::new(RepoRef::parse(raw)?))),
            None => Ok(None),
        }
    }

    /// Polling period for the item mirror
    pub fn item_poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.items_interval_secs)
    }

    /// Polling period for the label poll
    pub fn label_poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.labels_interval_secs)
    }
}
