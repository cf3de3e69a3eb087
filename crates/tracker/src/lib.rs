#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # subwatch-tracker
//!
//! Write side of subwatch, all against one GitHub repository:
//!
//! - [`IssueNotifier`]: files "possible addition" and "possible removal"
//!   issues from Markdown templates, retrying until accepted
//! - [`GitHubBannedList`]: replaces `banned-subs.json` in a single commit
//!
//! Both sit behind traits ([`NotificationSink`], [`BannedListSink`]) so the
//! reconciler can be driven against recording fakes.

pub mod banned;
pub mod client;
pub mod config;
pub mod error;
pub mod notifier;

pub use banned::{BannedListSink, GitHubBannedList, render_banned_document};
pub use client::{CommitReceipt, ContentUpdate, CreatedIssue, GitHubClient, NewIssue};
pub use config::TrackerConfig;
pub use error::{Error, Result};
pub use notifier::{IssueNotifier, NotificationKind, NotificationSink, render_template};
