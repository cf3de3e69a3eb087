//! Error types for the upstream crate.

use thiserror::Error;

/// Result type for upstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the upstream API.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a body (connect, timeout, read).
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The URL could not be resolved against the API base.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The payload parsed as JSON but does not have the expected shape.
    #[error("unexpected payload from {url}: {reason}")]
    InvalidPayload { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] subwatch_core::Error),
}

impl Error {
    /// Create a transport error.
    pub fn transport(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a client build error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Check if this is a transport failure.
    ///
    /// Transport failures are surfaced, not retried: the fetcher only retries
    /// bodies that arrived but could not be used.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether this error must stop the whole run.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Core(inner) => inner.is_fatal(),
            Self::ClientBuild { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = Error::transport("https://www.reddit.com/r/a.json", "timed out");
        assert!(err.is_transport());
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "request to https://www.reddit.com/r/a.json failed: timed out"
        );
    }

    #[test]
    fn test_invalid_payload_is_not_transport() {
        let err = Error::invalid_payload("/r/a.json", "data.children is not an array");
        assert!(!err.is_transport());
        assert!(err.to_string().contains("data.children"));
    }
}
