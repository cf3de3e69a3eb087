//! Participating-sub directory read from a wiki page.

use std::sync::Arc;

use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info};

use subwatch_core::{ResultExt, SUB_PREFIX, SubIdentifier};

use crate::error::Result;
use crate::fetcher::{JsonSource, fetch_document};

#[derive(Debug, Deserialize)]
struct WikiPage {
    data: WikiData,
}

#[derive(Debug, Deserialize)]
struct WikiData {
    content_md: String,
}

/// Extract sub identifiers from the wiki page's Markdown.
///
/// Keeps lines that start with `r/`, normalizes them, drops excluded entries
/// and later duplicates, and preserves source order. Lines that start with
/// the prefix but are not a bare name are skipped with a warning.
pub fn parse_directory(markdown: &str, excluded: &[SubIdentifier]) -> Vec<SubIdentifier> {
    markdown
        .lines()
        .filter(|line| line.starts_with(SUB_PREFIX))
        .filter_map(|line| SubIdentifier::parse(line).into_option_logged())
        .filter(|sub| !excluded.contains(sub))
        .unique()
        .collect()
}

/// Reads the list of participating subs.
#[derive(Clone)]
pub struct SubDirectoryReader {
    source: Arc<dyn JsonSource>,
    path: String,
    excluded: Vec<SubIdentifier>,
}

impl SubDirectoryReader {
    /// Create a reader for the wiki page at `path`.
    ///
    /// Exclusion entries that are not valid identifiers are ignored.
    pub fn new(source: Arc<dyn JsonSource>, path: impl Into<String>, excluded: &[String]) -> Self {
        let excluded = excluded
            .iter()
            .filter_map(|raw| SubIdentifier::parse(raw).into_option_logged())
            .collect();

        Self {
            source,
            path: path.into(),
            excluded,
        }
    }

    /// Fetch the directory page and return the participating subs.
    ///
    /// An empty list is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns fetch errors unchanged, and
    /// [`Error::InvalidPayload`](crate::Error::InvalidPayload) if the page has
    /// no `data.content_md`.
    pub async fn list_participating_subs(&self) -> Result<Vec<SubIdentifier>> {
        let page: WikiPage = fetch_document(self.source.as_ref(), &self.path).await?;
        let subs = parse_directory(&page.data.content_md, &self.excluded);

        if subs.is_empty() {
            info!(path = %self.path, "Directory lists no participating subs");
        } else {
            debug!(count = subs.len(), "Read participating subs");
        }

        Ok(subs)
    }
}

impl std::fmt::Debug for SubDirectoryReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubDirectoryReader")
            .field("path", &self.path)
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}
