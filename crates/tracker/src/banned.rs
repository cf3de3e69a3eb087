//! Writing the banned list back to its repository.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::info;

use subwatch_core::BannedSet;
use subwatch_upstream::BannedDocument;

use crate::client::{CommitReceipt, ContentUpdate, GitHubClient};
use crate::error::{Error, Result};

/// Where the updated banned list goes.
#[async_trait]
pub trait BannedListSink: Send + Sync {
    /// Replace the whole list in one commit.
    async fn commit(&self, banned: &BannedSet, message: &str) -> Result<CommitReceipt>;
}

/// `{"bannedSubs": [...]}` pretty-printed with four-space indentation.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the document cannot be written.
pub fn render_banned_document(banned: &BannedSet) -> Result<String> {
    let document = BannedDocument::from(banned);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    document
        .serialize(&mut serializer)
        .map_err(|e| Error::Serialization(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| Error::Serialization(e.to_string()))
}

/// [`BannedListSink`] that commits through the repository contents API.
#[derive(Debug, Clone)]
pub struct GitHubBannedList {
    client: GitHubClient,
}

impl GitHubBannedList {
    pub const fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BannedListSink for GitHubBannedList {
    async fn commit(&self, banned: &BannedSet, message: &str) -> Result<CommitReceipt> {
        let path = &self.client.config().banned_path;
        let content = render_banned_document(banned)?;
        let sha = self.client.content_sha(path).await?;

        let update = ContentUpdate {
            message: message.to_string(),
            content: STANDARD.encode(content.as_bytes()),
            sha,
        };

        let receipt = self.client.put_content(path, &update).await?;
        info!(path = %path, commit = %receipt.sha, count = banned.len(), "Committed banned list");
        Ok(receipt)
    }
}
