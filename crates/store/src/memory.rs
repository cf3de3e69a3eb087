//! In-process state store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use subwatch_core::{PersistedSubState, SubIdentifier};

use crate::error::PersistenceResult;
use crate::state_store::StateStore;

/// Map-backed [`StateStore`] for tests and dry runs. Nothing survives the
/// process.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<SubIdentifier, PersistedSubState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with existing states.
    pub fn with_states(states: impl IntoIterator<Item = PersistedSubState>) -> Self {
        let states = states
            .into_iter()
            .map(|state| (state.identifier().clone(), state))
            .collect();

        Self {
            states: RwLock::new(states),
        }
    }

    /// Number of subs with stored state.
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, sub: &SubIdentifier) -> PersistenceResult<Option<PersistedSubState>> {
        Ok(self.states.read().await.get(sub).cloned())
    }

    async fn set(&self, state: &PersistedSubState) -> PersistenceResult<()> {
        self.states
            .write()
            .await
            .insert(state.identifier().clone(), state.clone());
        Ok(())
    }
}
