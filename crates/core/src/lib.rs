//! # subwatch-core
//!
//! Types shared by every subwatch crate:
//!
//! - [`SubIdentifier`]: canonical lowercase `r/name`
//! - [`StickiedPost`] and [`SubSnapshot`]: what a sub looks like this cycle
//! - [`PersistedSubState`]: what it looked like when last flagged
//! - [`MembershipSet`] and [`BannedSet`]: the two external lists
//!
//! plus the stickied-run extraction and positional diff that decide whether a
//! sub needs a human to look at it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod duration;
pub mod error;
pub mod result;
pub mod stickied;
pub mod types;

pub use error::{Error, Result};
pub use result::ResultExt;
pub use stickied::{ListedPost, contains_keyword, leading_stickied_run, stickied_changed};
pub use types::{
    ApiStatus, BannedSet, MAX_STICKIED_POSTS, MembershipSet, PersistedSubState, SUB_PREFIX,
    StickiedPost, SubIdentifier, SubSnapshot,
};
