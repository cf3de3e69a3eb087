//! Error types for the reconciler crate.

use std::fmt;

use subwatch_core::SubIdentifier;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A cycle input (directory, membership, banned list) could not be read.
    CycleInput { input: String, reason: String },
    /// A sub's listing could not be fetched or decoded.
    SubFetch {
        sub: String,
        reason: String,
        fatal: bool,
    },
    /// Reading or writing a sub's state failed.
    Store {
        sub: String,
        reason: String,
        fatal: bool,
    },
    /// Filing a review notification failed.
    Notify {
        sub: String,
        reason: String,
        fatal: bool,
    },
    /// The current stickied posts cannot be represented as stored state.
    InvalidState { sub: String, reason: String },
    /// A removal names a sub the banned list does not have.
    BannedListInconsistent { sub: String },
    /// The banned-list commit was not made.
    CommitFailed { reason: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleInput { input, reason } => {
                write!(f, "failed to read {input}: {reason}")
            }
            Self::SubFetch { sub, reason, .. } => {
                write!(f, "{sub}: fetch failed: {reason}")
            }
            Self::Store { sub, reason, .. } => {
                write!(f, "{sub}: state store failed: {reason}")
            }
            Self::Notify { sub, reason, .. } => {
                write!(f, "{sub}: notification failed: {reason}")
            }
            Self::InvalidState { sub, reason } => {
                write!(f, "{sub}: invalid state: {reason}")
            }
            Self::BannedListInconsistent { sub } => {
                write!(
                    f,
                    "{sub}: on list to remove from banned list, but not found on banned list"
                )
            }
            Self::CommitFailed { reason } => {
                write!(f, "failed to update banned list: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a cycle input error.
    pub fn cycle_input(input: impl Into<String>, err: &subwatch_upstream::Error) -> Self {
        Self::CycleInput {
            input: input.into(),
            reason: err.to_string(),
        }
    }

    /// Create a sub fetch error.
    pub fn sub_fetch(sub: &SubIdentifier, err: &subwatch_upstream::Error) -> Self {
        Self::SubFetch {
            sub: sub.to_string(),
            reason: err.to_string(),
            fatal: err.is_fatal(),
        }
    }

    /// Create a store error.
    pub fn store(sub: &SubIdentifier, err: &subwatch_store::PersistenceError) -> Self {
        Self::Store {
            sub: sub.to_string(),
            reason: err.to_string(),
            fatal: err.is_fatal(),
        }
    }

    /// Create a notification error.
    pub fn notify(sub: &SubIdentifier, err: &subwatch_tracker::Error) -> Self {
        Self::Notify {
            sub: sub.to_string(),
            reason: err.to_string(),
            fatal: err.is_fatal(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(sub: &SubIdentifier, err: &subwatch_core::Error) -> Self {
        Self::InvalidState {
            sub: sub.to_string(),
            reason: err.to_string(),
        }
    }

    /// Create a banned list inconsistency error.
    pub fn banned_list_inconsistent(sub: &SubIdentifier) -> Self {
        Self::BannedListInconsistent {
            sub: sub.to_string(),
        }
    }

    /// Create a commit failed error.
    pub fn commit_failed(err: &subwatch_tracker::Error) -> Self {
        Self::CommitFailed {
            reason: err.to_string(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the cycle.
    ///
    /// Only failures confined to one sub let the cycle move on.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::SubFetch { fatal, .. } | Self::Store { fatal, .. } | Self::Notify { fatal, .. } => {
                *fatal
            }
            Self::CycleInput { .. }
            | Self::InvalidState { .. }
            | Self::BannedListInconsistent { .. }
            | Self::CommitFailed { .. }
            | Self::InvalidConfig { .. } => true,
        }
    }
}
