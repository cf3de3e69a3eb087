//! Decoding a sub's front-page listing into a [`SubSnapshot`].

use serde::Deserialize;
use serde_json::Value;

use subwatch_core::{ApiStatus, ListedPost, SubIdentifier, SubSnapshot, leading_stickied_run};

use crate::error::{Error, Result};
use crate::fetcher::JsonSource;

/// `reason` value the API uses for banned subs.
pub const BANNED_REASON: &str = "banned";

#[derive(Debug, Deserialize)]
struct ListingEnvelope {
    #[serde(default)]
    data: Option<ListingData>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    #[serde(default)]
    stickied: bool,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    permalink: Option<String>,
}

impl From<PostData> for ListedPost {
    fn from(post: PostData) -> Self {
        Self {
            stickied: post.stickied,
            text: post.selftext,
            permalink: post.permalink,
        }
    }
}

/// Decode a listing payload.
///
/// A payload without `data` is an inaccessible sub; `reason: "banned"` marks
/// it banned. With `data`, only the leading stickied run is kept.
///
/// # Errors
///
/// Returns [`Error::InvalidPayload`] if `data` is present but is not a
/// listing.
pub fn decode_listing(sub: &SubIdentifier, value: Value) -> Result<SubSnapshot> {
    let envelope: ListingEnvelope = serde_json::from_value(value)
        .map_err(|e| Error::invalid_payload(sub.listing_path(), e.to_string()))?;

    match envelope.data {
        Some(data) => {
            let posts = data.children.into_iter().map(|child| child.data.into());
            Ok(SubSnapshot::normal(sub.clone(), leading_stickied_run(posts)))
        }
        None if envelope.reason.as_deref() == Some(BANNED_REASON) => Ok(
            SubSnapshot::inaccessible(sub.clone(), ApiStatus::BannedMarker),
        ),
        None => Ok(SubSnapshot::inaccessible(sub.clone(), ApiStatus::Unavailable)),
    }
}

/// Fetch and decode a sub's listing.
///
/// # Errors
///
/// Returns fetch errors unchanged and decoding errors from [`decode_listing`].
pub async fn fetch_snapshot(source: &dyn JsonSource, sub: &SubIdentifier) -> Result<SubSnapshot> {
    let value = source.fetch_json(&sub.listing_path()).await?;
    decode_listing(sub, value)
}
