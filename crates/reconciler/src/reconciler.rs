//! Reconciler implementation.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use subwatch_core::{
    ApiStatus, BannedSet, MembershipSet, PersistedSubState, StickiedPost, SubIdentifier,
    contains_keyword, stickied_changed,
};
use subwatch_store::StateStore;
use subwatch_tracker::{NotificationKind, NotificationSink};
use subwatch_upstream::{JsonSource, fetch_snapshot};

use crate::error::{Error, Result};
use crate::types::{BannedDelta, ReconcileAction, SubOutcome};

/// Configuration for the reconciler and the cycle that drives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Case-insensitive phrase that marks a non-member as a candidate.
    #[serde(default = "default_keyword")]
    pub keyword: String,
    /// Minimum spacing between the starts of consecutive sub checks.
    #[serde(with = "subwatch_core::duration::millis", default = "default_pacing")]
    pub pacing: Duration,
    /// Maximum sub checks in flight at once.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            pacing: default_pacing(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl ReconcilerConfig {
    /// Reject settings the cycle cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty keyword or zero overlap.
    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            return Err(Error::invalid_config("keyword must not be empty"));
        }
        if self.max_in_flight == 0 {
            return Err(Error::invalid_config("max_in_flight must be at least 1"));
        }
        Ok(())
    }
}

fn default_keyword() -> String {
    "john oliver".to_string()
}

const fn default_pacing() -> Duration {
    Duration::from_millis(20)
}

const fn default_max_in_flight() -> usize {
    8
}

/// Decides, per sub, whether a human needs to look and whether the banned
/// list is out of date.
pub struct Reconciler {
    source: Arc<dyn JsonSource>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn NotificationSink>,
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(
        source: Arc<dyn JsonSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn NotificationSink>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            config,
        }
    }

    /// Reconcile one sub against the cycle's membership and banned lists.
    ///
    /// A flagged sub's notification is filed before its new state is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubFetch`] if the listing cannot be fetched, and the
    /// store, notification or state errors of a flagged sub. Check
    /// [`Error::is_fatal`] to decide whether the cycle can go on.
    pub async fn reconcile(
        &self,
        sub: &SubIdentifier,
        membership: &MembershipSet,
        banned: &BannedSet,
    ) -> Result<SubOutcome> {
        let snapshot = fetch_snapshot(self.source.as_ref(), sub)
            .await
            .map_err(|e| Error::sub_fetch(sub, &e))?;

        if !snapshot.is_accessible() {
            let delta = (snapshot.api_status == ApiStatus::BannedMarker && !banned.contains(sub))
                .then_some(BannedDelta::Add);
            debug!(sub = %sub, status = %snapshot.api_status, ?delta, "Sub has no listing");
            return Ok(SubOutcome::new(sub.clone(), ReconcileAction::NoOp, delta));
        }

        let delta = banned.contains(sub).then_some(BannedDelta::Remove);
        if delta.is_some() {
            info!(sub = %sub, "Sub recorded as banned is serving a listing again");
        }

        let action = self
            .review(sub, &snapshot.stickied, membership.contains(sub))
            .await?;

        Ok(SubOutcome::new(sub.clone(), action, delta))
    }

    /// Compare the current stickied run with stored state and flag on change.
    async fn review(
        &self,
        sub: &SubIdentifier,
        stickied: &[StickiedPost],
        is_member: bool,
    ) -> Result<ReconcileAction> {
        let kind = if is_member {
            NotificationKind::Removal
        } else if contains_keyword(stickied, &self.config.keyword) {
            NotificationKind::Addition
        } else {
            return Ok(ReconcileAction::NoOp);
        };

        let prior = self
            .store
            .get(sub)
            .await
            .map_err(|e| Error::store(sub, &e))?;

        if !stickied_changed(prior.as_ref(), stickied) {
            debug!(sub = %sub, "Stickied posts unchanged");
            return Ok(ReconcileAction::NoOp);
        }

        let next = PersistedSubState::from_posts(sub.clone(), stickied)
            .map_err(|e| Error::invalid_state(sub, &e))?;
        let permalink = stickied.first().and_then(|post| post.permalink.as_deref());

        info!(sub = %sub, kind = %kind, stickied = next.stickied_count(), "Stickied posts changed");

        self.notifier
            .notify(kind, sub, permalink)
            .await
            .map_err(|e| Error::notify(sub, &e))?;

        self.store
            .set(&next)
            .await
            .map_err(|e| Error::store(sub, &e))?;

        Ok(kind.into())
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use subwatch_store::InMemoryStateStore;
    use tokio::sync::Mutex;

    struct OneListing(Value);

    #[async_trait]
    impl JsonSource for OneListing {
        async fn fetch_json(&self, _url: &str) -> subwatch_upstream::Result<Value> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Recorded(Mutex<Vec<(NotificationKind, SubIdentifier)>>);

    #[async_trait]
    impl NotificationSink for Recorded {
        async fn notify(
            &self,
            kind: NotificationKind,
            sub: &SubIdentifier,
            _permalink: Option<&str>,
        ) -> subwatch_tracker::Result<()> {
            self.0.lock().await.push((kind, sub.clone()));
            Ok(())
        }
    }

    fn sub(name: &str) -> SubIdentifier {
        match SubIdentifier::parse(name) {
            Ok(id) => id,
            Err(e) => panic!("identifier should parse: {e}"),
        }
    }

    fn listing(stickied: &[&str]) -> Value {
        let children: Vec<Value> = stickied
            .iter()
            .map(|text| json!({"data": {"stickied": true, "selftext": text}}))
            .chain(std::iter::once(json!({"data": {"stickied": false, "selftext": "post"}})))
            .collect();
        json!({"data": {"children": children}})
    }

    fn reconciler(payload: Value) -> (Reconciler, Arc<InMemoryStateStore>, Arc<Recorded>) {
        let store = Arc::new(InMemoryStateStore::new());
        let notifier = Arc::new(Recorded::default());
        let reconciler = Reconciler::new(
            Arc::new(OneListing(payload)),
            store.clone(),
            notifier.clone(),
            ReconcilerConfig::default(),
        );
        (reconciler, store, notifier)
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.keyword, "john oliver");
        assert_eq!(config.pacing, Duration::from_millis(20));
        assert!(config.validate().is_ok());

        let bad = ReconcilerConfig {
            max_in_flight: 0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn test_too_many_stickied_posts_is_fatal_and_nothing_sent() {
        let (reconciler, store, notifier) =
            reconciler(listing(&["john oliver 1", "john oliver 2", "john oliver 3"]));

        let result = reconciler
            .reconcile(&sub("r/big"), &MembershipSet::default(), &BannedSet::default())
            .await;

        assert!(matches!(result, Err(Error::InvalidState { .. })));
        assert!(result.as_ref().is_err_and(Error::is_fatal));
        assert!(notifier.0.lock().await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unavailable_sub_in_banned_list_is_kept() -> Result<()> {
        let (reconciler, _, _) = reconciler(json!({"reason": "private", "error": 403}));
        let banned = BannedSet::new([sub("r/gone")]);

        let outcome = reconciler
            .reconcile(&sub("r/gone"), &MembershipSet::default(), &banned)
            .await?;

        assert_eq!(outcome, SubOutcome::unchanged(sub("r/gone")));
        Ok(())
    }

    #[tokio::test]
    async fn test_banned_marker_already_recorded_is_noop() -> Result<()> {
        let (reconciler, _, _) = reconciler(json!({"reason": "banned", "error": 404}));
        let banned = BannedSet::new([sub("r/gone")]);

        let outcome = reconciler
            .reconcile(&sub("r/gone"), &MembershipSet::default(), &banned)
            .await?;

        assert_eq!(outcome.banned_delta, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_recorded_banned_sub_with_listing_is_removed_and_reviewed() -> Result<()> {
        let (reconciler, store, notifier) = reconciler(listing(&["We support John Oliver"]));
        let banned = BannedSet::new([sub("r/back")]);

        let outcome = reconciler
            .reconcile(&sub("r/back"), &MembershipSet::default(), &banned)
            .await?;

        assert_eq!(outcome.banned_delta, Some(BannedDelta::Remove));
        assert_eq!(outcome.action, ReconcileAction::FlagAddition);
        assert_eq!(notifier.0.lock().await.len(), 1);
        assert_eq!(store.len().await, 1);
        Ok(())
    }
}
