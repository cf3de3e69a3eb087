//! Configuration for the issue tracker and banned-list commits.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`GitHubClient`](crate::GitHubClient),
/// [`IssueNotifier`](crate::IssueNotifier) and
/// [`GitHubBannedList`](crate::GitHubBannedList).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// REST API base.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Repository owner.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Repository name.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Access token. Never written back out.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Value of the `X-GitHub-Api-Version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// `User-Agent` header; the API rejects requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory holding `potential-addition.md` and `potential-removal.md`.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Labels applied to every created issue.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Site URL that `%post-link%` permalinks are joined onto.
    #[serde(default = "default_link_base")]
    pub link_base: String,

    /// Repository path of the banned list.
    #[serde(default = "default_banned_path")]
    pub banned_path: String,

    /// Delay between failed issue submissions.
    #[serde(
        with = "subwatch_core::duration::secs",
        default = "default_retry_delay"
    )]
    pub retry_delay: Duration,

    /// Pause after every successful issue submission.
    #[serde(with = "subwatch_core::duration::secs", default = "default_cooldown")]
    pub cooldown: Duration,

    /// Per-request timeout.
    #[serde(with = "subwatch_core::duration::secs", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: default_owner(),
            repo: default_repo(),
            token: None,
            api_version: default_api_version(),
            user_agent: default_user_agent(),
            templates_dir: default_templates_dir(),
            labels: Vec::new(),
            link_base: default_link_base(),
            banned_path: default_banned_path(),
            retry_delay: default_retry_delay(),
            cooldown: default_cooldown(),
            timeout: default_timeout(),
        }
    }
}

impl TrackerConfig {
    /// Create a config pointed at a different API base (e.g. a mock server).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Default::default()
        }
    }

    /// Set the access token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the templates directory.
    #[must_use]
    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the issue labels.
    #[must_use]
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Set the retry delay.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the post-submission cooldown.
    #[must_use]
    pub const fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_owner() -> String {
    "username-is-required".to_string()
}

fn default_repo() -> String {
    "reddark-subinfo".to_string()
}

fn default_api_version() -> String {
    "2022-11-28".to_string()
}

fn default_user_agent() -> String {
    "reddark-subinfo-update-checker".to_string()
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_link_base() -> String {
    "https://www.reddit.com".to_string()
}

fn default_banned_path() -> String {
    "banned-subs.json".to_string()
}

const fn default_retry_delay() -> Duration {
    Duration::from_secs(10)
}

const fn default_cooldown() -> Duration {
    Duration::from_secs(5)
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
