#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # subwatch-upstream
//!
//! Read side of subwatch: everything fetched over plain HTTP GET.
//!
//! ## Features
//!
//! - [`UpstreamClient`]: raw GETs with the identifying user agent and timeout
//! - [`ResilientFetcher`]: JSON fetching that retries unusable bodies forever
//! - [`SubDirectoryReader`]: the participating-sub list from a wiki page
//! - [`fetch_snapshot`]: a sub's leading stickied posts or its inaccessibility
//! - [`fetch_membership`] and [`fetch_banned`]: the two maintained lists
//!
//! ## Example
//!
//! ```ignore
//! use subwatch_upstream::{ResilientFetcher, UpstreamClient, fetch_snapshot};
//!
//! let fetcher = ResilientFetcher::new(UpstreamClient::new()?);
//! let snapshot = fetch_snapshot(&fetcher, &"r/pics".parse()?).await?;
//! println!("{} stickied posts", snapshot.stickied.len());
//! ```

pub mod client;
pub mod config;
pub mod directory;
pub mod documents;
pub mod error;
pub mod fetcher;
pub mod listing;

// Re-export commonly used items
pub use client::UpstreamClient;
pub use config::UpstreamConfig;
pub use directory::{SubDirectoryReader, parse_directory};
pub use documents::{BannedDocument, MembershipDocument, fetch_banned, fetch_membership};
pub use error::{Error, Result};
pub use fetcher::{JsonSource, Rejection, ResilientFetcher, accept_body, fetch_document};
pub use listing::{BANNED_REASON, decode_listing, fetch_snapshot};
