//! Per-sub stickied-post state.
//!
//! One record per sub, keyed by the bare sub name, in table
//! `subinfo_update_checker`. A write replaces the whole record so a shrinking
//! stickied run never leaves a stale `stickied_2` behind.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use tracing::debug;

use subwatch_core::{MAX_STICKIED_POSTS, PersistedSubState, SubIdentifier};

use crate::client::SurrealStateStore;
use crate::error::{PersistenceError, PersistenceResult, from_surrealdb_error};

/// Table holding one record per tracked sub.
pub const STATE_TABLE: &str = "subinfo_update_checker";

/// Read and overwrite the last-flagged stickied state of a sub.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored state, or `None` if the sub has never been flagged.
    async fn get(&self, sub: &SubIdentifier) -> PersistenceResult<Option<PersistedSubState>>;

    /// Replace the stored state for the sub.
    async fn set(&self, state: &PersistedSubState) -> PersistenceResult<()>;
}

/// Sub state record stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubStateRecord {
    /// SurrealDB record ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub stickied_posts: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stickied_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stickied_2: Option<String>,
}

impl From<&PersistedSubState> for SubStateRecord {
    fn from(state: &PersistedSubState) -> Self {
        let mut texts = state.stickied_text().iter().cloned();
        Self {
            id: None,
            stickied_posts: state.stickied_count(),
            stickied_1: texts.next(),
            stickied_2: texts.next(),
        }
    }
}

impl SubStateRecord {
    /// Rebuild the domain state, checking the count against the text slots.
    ///
    /// # Errors
    ///
    /// Returns a core `InvalidRecord` error if the count exceeds the slots or
    /// names a slot that is empty.
    pub fn into_state(self, sub: &SubIdentifier) -> PersistenceResult<PersistedSubState> {
        if self.stickied_posts > MAX_STICKIED_POSTS {
            return Err(subwatch_core::Error::invalid_record(
                sub.as_str(),
                format!("stickied_posts is {}", self.stickied_posts),
            )
            .into());
        }

        let texts = [self.stickied_1, self.stickied_2]
            .into_iter()
            .enumerate()
            .take(self.stickied_posts)
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    subwatch_core::Error::invalid_record(
                        sub.as_str(),
                        format!("stickied_{} missing", index.saturating_add(1)),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PersistedSubState::new(sub.clone(), texts)?)
    }
}

/// Input for writing a record. The record id is carried by the resource.
#[derive(Debug, Clone, Serialize)]
struct SubStateInput {
    stickied_posts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    stickied_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stickied_2: Option<String>,
}

impl From<SubStateRecord> for SubStateInput {
    fn from(record: SubStateRecord) -> Self {
        Self {
            stickied_posts: record.stickied_posts,
            stickied_1: record.stickied_1,
            stickied_2: record.stickied_2,
        }
    }
}

#[async_trait]
impl StateStore for SurrealStateStore {
    async fn get(&self, sub: &SubIdentifier) -> PersistenceResult<Option<PersistedSubState>> {
        let result: Option<SubStateRecord> = self
            .db()
            .select((STATE_TABLE, sub.name()))
            .await
            .map_err(from_surrealdb_error)?;

        result.map(|record| record.into_state(sub)).transpose()
    }

    async fn set(&self, state: &PersistedSubState) -> PersistenceResult<()> {
        let sub = state.identifier();
        let input = SubStateInput::from(SubStateRecord::from(state));

        let result: Option<SubStateRecord> = self
            .db()
            .upsert((STATE_TABLE, sub.name()))
            .content(input)
            .await
            .map_err(from_surrealdb_error)?;

        if result.is_none() {
            return Err(PersistenceError::query_failed(format!(
                "failed to save state for {sub}"
            )));
        }

        debug!(sub = %sub, stickied_posts = state.stickied_count(), "Saved sub state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use crate::client::StoreConfig;

    fn sub(name: &str) -> SubIdentifier {
        match SubIdentifier::parse(name) {
            Ok(id) => id,
            Err(e) => panic!("identifier should parse: {e}"),
        }
    }

    fn state(name: &str, texts: &[&str]) -> PersistedSubState {
        let texts = texts.iter().map(|t| (*t).to_string()).collect();
        match PersistedSubState::new(sub(name), texts) {
            Ok(state) => state,
            Err(e) => panic!("state should build: {e}"),
        }
    }

    async fn store() -> PersistenceResult<SurrealStateStore> {
        SurrealStateStore::connect(StoreConfig::in_memory()).await
    }

    #[tokio::test]
    async fn test_get_missing_is_none() -> PersistenceResult<()> {
        let store = store().await?;
        assert_eq!(store.get(&sub("r/never")).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_then_get() -> PersistenceResult<()> {
        let store = store().await?;
        let saved = state("r/pics", &["We stand with John Oliver", "Rules"]);

        store.set(&saved).await?;

        assert_eq!(store.get(&sub("r/pics")).await?, Some(saved));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_overwrites_whole_record() -> PersistenceResult<()> {
        let store = store().await?;

        store.set(&state("r/pics", &["a", "b"])).await?;
        store.set(&state("r/pics", &["c"])).await?;

        let loaded = store.get(&sub("r/pics")).await?;
        assert_eq!(loaded, Some(state("r/pics", &["c"])));

        let raw: Option<SubStateRecord> = store
            .db()
            .select((STATE_TABLE, "pics"))
            .await
            .map_err(from_surrealdb_error)?;
        assert_eq!(raw.and_then(|r| r.stickied_2), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_empty_state() -> PersistenceResult<()> {
        let store = store().await?;
        store.set(&state("r/quiet", &[])).await?;
        let loaded = store.get(&sub("r/quiet")).await?;
        assert_eq!(loaded.map(|s| s.stickied_count()), Some(0));
        Ok(())
    }

    #[test]
    fn test_record_count_beyond_slots_is_invalid() {
        let record = SubStateRecord {
            id: None,
            stickied_posts: 3,
            stickied_1: Some("a".to_string()),
            stickied_2: Some("b".to_string()),
        };

        let result = record.into_state(&sub("r/pics"));

        assert!(matches!(
            result,
            Err(PersistenceError::Core(subwatch_core::Error::InvalidRecord { .. }))
        ));
    }

    #[test]
    fn test_record_missing_slot_is_invalid() {
        let record = SubStateRecord {
            id: None,
            stickied_posts: 2,
            stickied_1: Some("a".to_string()),
            stickied_2: None,
        };

        let result = record.into_state(&sub("r/pics"));

        assert!(result.as_ref().is_err_and(PersistenceError::is_fatal));
    }

    #[test]
    fn test_record_from_state() {
        let record = SubStateRecord::from(&state("r/pics", &["only"]));
        assert_eq!(record.stickied_posts, 1);
        assert_eq!(record.stickied_1.as_deref(), Some("only"));
        assert_eq!(record.stickied_2, None);
    }
}
