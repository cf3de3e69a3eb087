//! Sub, stickied-post and persisted-state types.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix every sub identifier carries.
pub const SUB_PREFIX: &str = "r/";

/// Maximum number of stickied posts a sub can have, and that can be stored.
pub const MAX_STICKIED_POSTS: usize = 2;

/// Canonical lowercase sub name, e.g. `r/example`.
///
/// Parsing trims whitespace and a trailing `/` and lowercases, so two
/// identifiers compare equal whenever the names differ only in case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubIdentifier(String);

impl SubIdentifier {
    /// Parse and normalize a sub identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if the name lacks the `r/` prefix
    /// or is empty after it.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let canonical = trimmed.to_lowercase();

        match canonical.strip_prefix(SUB_PREFIX) {
            None => Err(Error::invalid_identifier(raw, "missing r/ prefix")),
            Some(name) if name.is_empty() => Err(Error::invalid_identifier(raw, "empty name")),
            Some(name) if name.contains('/') || name.contains(char::is_whitespace) => {
                Err(Error::invalid_identifier(raw, "name contains '/' or whitespace"))
            }
            Some(_) => Ok(Self(canonical)),
        }
    }

    /// The full canonical identifier, `r/` prefix included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without the `r/` prefix. Used as the store key.
    pub fn name(&self) -> &str {
        self.0.strip_prefix(SUB_PREFIX).unwrap_or(&self.0)
    }

    /// API-relative path of the sub's front-page listing.
    pub fn listing_path(&self) -> String {
        format!("/{}.json", self.0)
    }
}

impl fmt::Display for SubIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SubIdentifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SubIdentifier> for String {
    fn from(id: SubIdentifier) -> Self {
        id.0
    }
}

/// A post pinned to the top of a sub's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickiedPost {
    /// The post's self text. Link posts carry an empty string.
    pub text: String,
    /// Permalink path, when the listing supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

impl StickiedPost {
    /// Create a stickied post with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            permalink: None,
        }
    }

    /// Attach a permalink.
    #[must_use]
    pub fn with_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.permalink = Some(permalink.into());
        self
    }
}

/// What the listing endpoint said about a sub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    /// Listing carried post data.
    Normal,
    /// No post data and the payload marked the sub as banned.
    BannedMarker,
    /// No post data for any other reason (private, quarantined, unknown).
    Unavailable,
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::BannedMarker => write!(f, "banned"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Current state of a sub, decoded fresh each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSnapshot {
    pub identifier: SubIdentifier,
    /// Leading run of stickied posts, in display order.
    pub stickied: Vec<StickiedPost>,
    pub api_status: ApiStatus,
}

impl SubSnapshot {
    /// Snapshot of an accessible sub.
    pub const fn normal(identifier: SubIdentifier, stickied: Vec<StickiedPost>) -> Self {
        Self {
            identifier,
            stickied,
            api_status: ApiStatus::Normal,
        }
    }

    /// Snapshot of a sub whose listing had no post data.
    pub const fn inaccessible(identifier: SubIdentifier, api_status: ApiStatus) -> Self {
        Self {
            identifier,
            stickied: Vec::new(),
            api_status,
        }
    }

    /// Whether the listing carried post data.
    pub fn is_accessible(&self) -> bool {
        self.api_status == ApiStatus::Normal
    }
}

/// Stickied-post texts recorded for a sub at its last flagged change.
///
/// The count is the length of the text list, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSubState {
    identifier: SubIdentifier,
    stickied_text: Vec<String>,
}

impl PersistedSubState {
    /// Build a state record from raw texts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyStickiedPosts`] if more than
    /// [`MAX_STICKIED_POSTS`] texts are given.
    pub fn new(identifier: SubIdentifier, stickied_text: Vec<String>) -> Result<Self> {
        if stickied_text.len() > MAX_STICKIED_POSTS {
            return Err(Error::too_many_stickied_posts(
                identifier.as_str(),
                stickied_text.len(),
                MAX_STICKIED_POSTS,
            ));
        }
        Ok(Self {
            identifier,
            stickied_text,
        })
    }

    /// Build a state record from the current stickied posts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyStickiedPosts`] if more than
    /// [`MAX_STICKIED_POSTS`] posts are given.
    pub fn from_posts(identifier: SubIdentifier, posts: &[StickiedPost]) -> Result<Self> {
        Self::new(identifier, posts.iter().map(|p| p.text.clone()).collect())
    }

    pub const fn identifier(&self) -> &SubIdentifier {
        &self.identifier
    }

    pub fn stickied_count(&self) -> usize {
        self.stickied_text.len()
    }

    pub fn stickied_text(&self) -> &[String] {
        &self.stickied_text
    }
}

/// Subs already enrolled in the campaign. Read-only within a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet {
    subs: HashSet<SubIdentifier>,
}

impl MembershipSet {
    pub fn new(subs: impl IntoIterator<Item = SubIdentifier>) -> Self {
        Self {
            subs: subs.into_iter().collect(),
        }
    }

    pub fn contains(&self, sub: &SubIdentifier) -> bool {
        self.subs.contains(sub)
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

/// Subs known to be banned upstream, in recorded order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedSet {
    subs: Vec<SubIdentifier>,
}

impl BannedSet {
    /// Build from a list, dropping later duplicates.
    pub fn new(subs: impl IntoIterator<Item = SubIdentifier>) -> Self {
        Self {
            subs: subs.into_iter().unique().collect(),
        }
    }

    pub fn contains(&self, sub: &SubIdentifier) -> bool {
        self.subs.contains(sub)
    }

    /// Append a sub unless already present. Returns whether it was added.
    pub fn insert(&mut self, sub: SubIdentifier) -> bool {
        if self.contains(&sub) {
            false
        } else {
            self.subs.push(sub);
            true
        }
    }

    /// Remove a sub. Returns whether it was present.
    pub fn remove(&mut self, sub: &SubIdentifier) -> bool {
        match self.subs.iter().position(|s| s == sub) {
            Some(index) => {
                self.subs.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubIdentifier> {
        self.subs.iter()
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Plain string names, in order, for writing back out.
    pub fn to_names(&self) -> Vec<String> {
        self.subs.iter().map(|s| s.as_str().to_string()).collect()
    }
}
