//! Configuration for the upstream client and the documents it reads.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for [`UpstreamClient`](crate::UpstreamClient) and friends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL that API-relative paths are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Identifying `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Hard per-request timeout.
    #[serde(with = "subwatch_core::duration::secs", default = "default_timeout")]
    pub timeout: Duration,

    /// Fixed delay between attempts when a body is unusable.
    #[serde(
        with = "subwatch_core::duration::secs",
        default = "default_retry_delay"
    )]
    pub retry_delay: Duration,

    /// API-relative path of the wiki page listing participating subs.
    #[serde(default = "default_directory_path")]
    pub directory_path: String,

    /// Directory entries known to be invalid.
    #[serde(default = "default_excluded_subs")]
    pub excluded_subs: Vec<String>,

    /// Absolute URL of the `{ johnOliverSubs: [...] }` document.
    #[serde(default = "default_membership_url")]
    pub membership_url: String,

    /// Absolute URL of the `{ bannedSubs: [...] }` document.
    #[serde(default = "default_banned_url")]
    pub banned_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            retry_delay: default_retry_delay(),
            directory_path: default_directory_path(),
            excluded_subs: default_excluded_subs(),
            membership_url: default_membership_url(),
            banned_url: default_banned_url(),
        }
    }
}

impl UpstreamConfig {
    /// Create a config pointed at a different API base (e.g. a mock server).
    pub fn with_base_url(base_url: &Url) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry delay.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the directory wiki path.
    #[must_use]
    pub fn directory_path(mut self, path: impl Into<String>) -> Self {
        self.directory_path = path.into();
        self
    }
}

fn default_base_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_user_agent() -> String {
    "Reddark Subinfo Update Checker (https://github.com/username-is-required/reddark-subinfo-update-checker)"
        .to_string()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(300) // 5 minutes
}

const fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_directory_path() -> String {
    "/r/ModCoord/wiki/index.json".to_string()
}

fn default_excluded_subs() -> Vec<String> {
    vec!["r/speziscool".to_string()]
}

fn default_membership_url() -> String {
    "https://raw.githubusercontent.com/username-is-required/reddark-subinfo/main/john-oliver-subs.json"
        .to_string()
}

fn default_banned_url() -> String {
    "https://raw.githubusercontent.com/username-is-required/reddark-subinfo/main/banned-subs.json"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, "https://www.reddit.com");
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert_eq!(config.excluded_subs, vec!["r/speziscool".to_string()]);
    }

    #[test]
    fn test_config_builder() -> Result<(), url::ParseError> {
        let config = UpstreamConfig::with_base_url(&Url::parse("http://127.0.0.1:9000")?)
            .timeout(Duration::from_secs(1))
            .retry_delay(Duration::from_millis(10))
            .directory_path("/wiki.json");

        assert_eq!(config.base_url, "http://127.0.0.1:9000/");
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.retry_delay, Duration::from_millis(10));
        assert_eq!(config.directory_path, "/wiki.json");
        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<(), serde_json::Error> {
        let config: UpstreamConfig = serde_json::from_str(r#"{"retry_delay": 1}"#)?;
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.directory_path, "/r/ModCoord/wiki/index.json");
        Ok(())
    }
}
