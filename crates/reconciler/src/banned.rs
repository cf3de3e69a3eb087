//! Applying a cycle's banned-list deltas in one commit.

use tracing::info;

use subwatch_core::BannedSet;
use subwatch_tracker::{BannedListSink, CommitReceipt};

use crate::error::{Error, Result};
use crate::types::BannedChanges;

const COMMIT_TITLE: &str = "🤖 automatically updating `banned-subs.json`";

fn changelog_section(heading: &str, subs: &[subwatch_core::SubIdentifier]) -> String {
    if subs.is_empty() {
        return format!("{heading}: none");
    }
    subs.iter()
        .fold(format!("{heading}:"), |acc, sub| format!("{acc}\n - {sub}"))
}

/// Commit message listing what was added and removed.
pub fn changelog_message(changes: &BannedChanges) -> String {
    format!(
        "{COMMIT_TITLE}\n\n{}\n\n{}\n",
        changelog_section("subs added", changes.additions()),
        changelog_section("subs removed", changes.removals()),
    )
}

/// Apply the deltas to a copy of the current list.
///
/// Additions are appended in order; removals must name a listed sub.
///
/// # Errors
///
/// Returns [`Error::BannedListInconsistent`] for the first removal the list
/// does not have.
pub fn updated_banned_set(current: &BannedSet, changes: &BannedChanges) -> Result<BannedSet> {
    let mut next = current.clone();

    for sub in changes.additions() {
        next.insert(sub.clone());
    }

    for sub in changes.removals() {
        if !next.remove(sub) {
            return Err(Error::banned_list_inconsistent(sub));
        }
    }

    Ok(next)
}

/// Write the cycle's banned-list deltas, or do nothing if there are none.
///
/// # Errors
///
/// Returns [`Error::BannedListInconsistent`] if a removal is not on the list
/// and [`Error::CommitFailed`] if the sink rejects the commit. Both are fatal.
pub async fn apply_banned_changes(
    current: &BannedSet,
    changes: &BannedChanges,
    sink: &dyn BannedListSink,
) -> Result<Option<CommitReceipt>> {
    if changes.is_empty() {
        info!("No banned sub changes to process");
        return Ok(None);
    }

    let next = updated_banned_set(current, changes)?;
    let message = changelog_message(changes);

    let receipt = sink
        .commit(&next, &message)
        .await
        .map_err(|e| Error::commit_failed(&e))?;

    info!(
        added = changes.additions().len(),
        removed = changes.removals().len(),
        commit = %receipt.sha,
        "Uploaded updated banned subs list"
    );
    Ok(Some(receipt))
}
