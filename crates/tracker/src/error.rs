//! Error types for the tracker crate.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the issue tracker and content API.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a response.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The API answered with a non-success status.
    #[error("{url} responded {status}: {body}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },

    /// The API answered successfully but the body was not what was expected.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// An issue template could not be read.
    #[error("failed to read template {}: {reason}", path.display())]
    TemplateUnreadable { path: PathBuf, reason: String },

    /// The banned document could not be serialized.
    #[error("failed to serialize banned list: {0}")]
    Serialization(String),

    /// The configured API base or repository path is not a URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },
}

impl Error {
    /// Create a transport error.
    pub fn transport(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an API status error.
    pub fn api(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a template unreadable error.
    pub fn template_unreadable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::TemplateUnreadable {
            path: path.into(),
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

    /// Create a client build error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Whether a submission that failed this way is worth repeating.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Api { .. } | Self::InvalidResponse { .. }
        )
    }

    /// Whether this error must stop the whole run.
    pub const fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}
