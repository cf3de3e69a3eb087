//! Core error types for subwatch.
//!
//! Invariant violations are explicit variants so callers can tell a bad input
//! apart from a broken assumption about the data.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid sub identifier '{raw}': {reason}")]
    InvalidIdentifier { raw: String, reason: String },

    #[error("cannot persist {count} stickied posts for {sub}: at most {max} allowed")]
    TooManyStickiedPosts {
        sub: String,
        count: usize,
        max: usize,
    },

    #[error("invalid record for {sub}: {reason}")]
    InvalidRecord { sub: String, reason: String },
}

impl Error {
    /// Create an invalid identifier error.
    pub fn invalid_identifier(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Create a too-many-stickied-posts error.
    pub fn too_many_stickied_posts(sub: impl Into<String>, count: usize, max: usize) -> Self {
        Self::TooManyStickiedPosts {
            sub: sub.into(),
            count,
            max,
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(sub: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            sub: sub.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must stop the whole run.
    ///
    /// A stickied-post overflow or a corrupt stored record means the data no
    /// longer matches the model; neither can be skipped past.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TooManyStickiedPosts { .. } | Self::InvalidRecord { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_stickied_posts_is_fatal() {
        let err = Error::too_many_stickied_posts("r/example", 3, 2);
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "cannot persist 3 stickied posts for r/example: at most 2 allowed"
        );
    }

    #[test]
    fn test_invalid_identifier_is_not_fatal() {
        let err = Error::invalid_identifier("example", "missing r/ prefix");
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("missing r/ prefix"));
    }
}
