//! Change detection and banned-list reconciliation for protest subs.
//!
//! Each cycle:
//! 1. Reads the participating subs, the membership list and the banned list
//! 2. Reconciles every sub: fetch its listing, diff the leading stickied posts
//!    against stored state, file a review and persist on change
//! 3. Collects banned-list deltas in traversal order
//! 4. Commits the banned list once, if anything changed
//!
//! # Actions
//!
//! - `FlagAddition` - a non-member's stickied posts mention the keyword and
//!   changed since last flagged
//! - `FlagRemoval` - a member's stickied posts changed since last flagged
//! - `NoOp` - nothing for a human to look at
//!
//! Independently of the action, a sub may ask for a banned-list `Add` (the
//! upstream reports it banned) or `Remove` (it serves a listing again).
//!
//! # Example
//!
//! ```ignore
//! use subwatch_reconciler::{CycleRunner, ListSources, Reconciler, ReconcilerConfig};
//! use std::sync::Arc;
//!
//! let reconciler = Arc::new(Reconciler::new(
//!     fetcher.clone(),
//!     store,
//!     notifier,
//!     ReconcilerConfig::default(),
//! ));
//! let runner = CycleRunner::new(directory, fetcher, list_sources, reconciler, banned_sink);
//! let report = runner.run().await?;
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod banned;
pub mod cycle;
pub mod error;
pub mod reconciler;
pub mod types;

// Re-export main types
pub use banned::{apply_banned_changes, changelog_message, updated_banned_set};
pub use cycle::{CycleRunner, ListSources};
pub use error::{Error, Result};
pub use reconciler::{Reconciler, ReconcilerConfig};
pub use types::{BannedChanges, BannedDelta, CycleReport, FailedSub, ReconcileAction, SubOutcome};
