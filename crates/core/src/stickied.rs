//! Stickied-run extraction, keyword matching and the positional diff.

use crate::types::{PersistedSubState, StickiedPost};

/// One entry of a sub's post listing, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPost {
    pub stickied: bool,
    pub text: String,
    pub permalink: Option<String>,
}

impl ListedPost {
    pub fn stickied(text: impl Into<String>) -> Self {
        Self {
            stickied: true,
            text: text.into(),
            permalink: None,
        }
    }

    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            stickied: false,
            text: text.into(),
            permalink: None,
        }
    }
}

/// Take the maximal leading run of stickied posts.
///
/// Stickied posts always come first in a listing, so the first non-stickied
/// post ends the scan. Stickied posts further down are ignored.
pub fn leading_stickied_run(posts: impl IntoIterator<Item = ListedPost>) -> Vec<StickiedPost> {
    posts
        .into_iter()
        .take_while(|post| post.stickied)
        .map(|post| StickiedPost {
            text: post.text,
            permalink: post.permalink,
        })
        .collect()
}

/// Case-insensitive substring match of `keyword` against any post's text.
pub fn contains_keyword(posts: &[StickiedPost], keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    posts
        .iter()
        .any(|post| post.text.to_lowercase().contains(&keyword))
}

/// Whether the current stickied posts differ from the recorded state.
///
/// No record counts as changed. A count mismatch decides before any text is
/// compared, and texts compare by position.
pub fn stickied_changed(prior: Option<&PersistedSubState>, current: &[StickiedPost]) -> bool {
    let Some(prior) = prior else {
        return true;
    };

    if prior.stickied_count() != current.len() {
        return true;
    }

    prior
        .stickied_text()
        .iter()
        .zip(current)
        .any(|(recorded, post)| *recorded != post.text)
}
