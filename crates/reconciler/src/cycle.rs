//! One batch cycle: read the inputs, reconcile every sub, commit the banned
//! list.
//!
//! Sub checks overlap up to `max_in_flight`, start no closer together than
//! `pacing`, and their outcomes are consumed in directory order.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info};

use subwatch_core::{BannedSet, MembershipSet, SubIdentifier};
use subwatch_tracker::BannedListSink;
use subwatch_upstream::{JsonSource, SubDirectoryReader, fetch_banned, fetch_membership};

use crate::banned::apply_banned_changes;
use crate::error::{Error, Result};
use crate::reconciler::Reconciler;
use crate::types::{BannedChanges, CycleReport, FailedSub, ReconcileAction, SubOutcome};

/// Where the cycle's two maintained lists are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSources {
    pub membership_url: String,
    pub banned_url: String,
}

/// Hands out start slots at least `spacing` apart.
///
/// Spacing is measured from the previous actual start, so checks that queued
/// behind a slow one still start one slot at a time.
#[derive(Debug)]
struct Pacer {
    spacing: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Pacer {
    fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_start: Mutex::new(None),
        }
    }

    /// Wait for the next slot. Waiters are served in arrival order.
    async fn wait_turn(&self) {
        let mut last_start = self.last_start.lock().await;
        let slot = last_start.and_then(|previous| previous.checked_add(self.spacing));
        if let Some(slot) = slot.filter(|slot| *slot > Instant::now()) {
            tokio::time::sleep_until(slot).await;
        }
        *last_start = Some(Instant::now());
    }
}

/// Runs a single reconciliation cycle.
pub struct CycleRunner {
    directory: SubDirectoryReader,
    lists: Arc<dyn JsonSource>,
    list_sources: ListSources,
    reconciler: Arc<Reconciler>,
    banned_sink: Arc<dyn BannedListSink>,
}

impl CycleRunner {
    /// Create a new cycle runner.
    pub fn new(
        directory: SubDirectoryReader,
        lists: Arc<dyn JsonSource>,
        list_sources: ListSources,
        reconciler: Arc<Reconciler>,
        banned_sink: Arc<dyn BannedListSink>,
    ) -> Self {
        Self {
            directory,
            lists,
            list_sources,
            reconciler,
            banned_sink,
        }
    }

    /// Run the cycle to completion.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Per-sub fetch failures are logged,
    /// recorded in the report and do not stop the cycle.
    pub async fn run(&self) -> Result<CycleReport> {
        info!("Getting list of participating subs");
        let subs = self
            .directory
            .list_participating_subs()
            .await
            .map_err(|e| Error::cycle_input("participating subs", &e))?;

        info!("Getting list of currently recorded banned subs");
        let banned = fetch_banned(self.lists.as_ref(), &self.list_sources.banned_url)
            .await
            .map_err(|e| Error::cycle_input("banned subs", &e))?;

        info!("Getting list of johnoliver subs");
        let membership = fetch_membership(self.lists.as_ref(), &self.list_sources.membership_url)
            .await
            .map_err(|e| Error::cycle_input("johnoliver subs", &e))?;

        info!(
            subs = subs.len(),
            members = membership.len(),
            banned = banned.len(),
            "Checking subs"
        );

        let (outcomes, failed) = self.reconcile_all(&subs, &membership, &banned).await?;
        let banned_changes = BannedChanges::from_outcomes(&outcomes);
        let commit =
            apply_banned_changes(&banned, &banned_changes, self.banned_sink.as_ref()).await?;

        let report = CycleReport {
            listed: subs.len(),
            outcomes,
            failed,
            banned_changes,
            commit,
        };

        info!(
            listed = report.listed,
            processed = report.processed(),
            additions_flagged = report.flagged(ReconcileAction::FlagAddition).len(),
            removals_flagged = report.flagged(ReconcileAction::FlagRemoval).len(),
            banned_added = report.banned_changes.additions().len(),
            banned_removed = report.banned_changes.removals().len(),
            failed = report.failed.len(),
            "Cycle complete"
        );

        Ok(report)
    }

    /// Reconcile every sub in order with bounded, paced overlap.
    async fn reconcile_all(
        &self,
        subs: &[SubIdentifier],
        membership: &MembershipSet,
        banned: &BannedSet,
    ) -> Result<(Vec<SubOutcome>, Vec<FailedSub>)> {
        let config = self.reconciler.config();
        let pacer = Pacer::new(config.pacing);
        let pacer = &pacer;
        let reconciler = self.reconciler.as_ref();

        let mut results = stream::iter(subs)
            .map(|sub| async move {
                pacer.wait_turn().await;
                (sub, reconciler.reconcile(sub, membership, banned).await)
            })
            .buffered(config.max_in_flight.max(1));

        let mut outcomes = Vec::with_capacity(subs.len());
        let mut failed = Vec::new();

        while let Some((sub, result)) = results.next().await {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if e.is_fatal() => {
                    error!(sub = %sub, error = %e, "Fatal error, aborting cycle");
                    return Err(e);
                }
                Err(e) => {
                    error!(sub = %sub, error = %e, "Skipping sub");
                    failed.push(FailedSub {
                        sub: sub.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok((outcomes, failed))
    }
}

impl std::fmt::Debug for CycleRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleRunner")
            .field("directory", &self.directory)
            .field("list_sources", &self.list_sources)
            .field("reconciler", &self.reconciler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pacer_spaces_concurrent_waiters() {
        let pacer = Pacer::new(Duration::from_millis(30));
        let pacer = &pacer;

        let starts = futures::future::join_all((0..4).map(|_| async move {
            pacer.wait_turn().await;
            Instant::now()
        }))
        .await;

        for pair in starts.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(30));
        }
    }

    #[tokio::test]
    async fn test_pacer_first_turn_is_immediate() {
        let pacer = Pacer::new(Duration::from_secs(60));
        let before = Instant::now();

        pacer.wait_turn().await;

        assert!(before.elapsed() < Duration::from_secs(1));
    }
}
