//! Core types for the reconciler.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use subwatch_core::SubIdentifier;
use subwatch_tracker::{CommitReceipt, NotificationKind};

/// Review action emitted for one sub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconcileAction {
    /// Nothing to review.
    NoOp,
    /// A non-member looks like it joined; an addition issue was filed.
    FlagAddition,
    /// A member's stickied posts changed; a removal issue was filed.
    FlagRemoval,
}

impl ReconcileAction {
    /// Whether a notification was sent and state persisted.
    pub const fn is_flag(self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Get a description of the action.
    pub fn description(self, sub: &SubIdentifier) -> String {
        match self {
            Self::NoOp => format!("no change for {sub}"),
            Self::FlagAddition => format!("flag {sub} as a possible addition"),
            Self::FlagRemoval => format!("flag {sub} as a possible removal"),
        }
    }
}

impl From<NotificationKind> for ReconcileAction {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Addition => Self::FlagAddition,
            NotificationKind::Removal => Self::FlagRemoval,
        }
    }
}

/// Change a sub asks of the banned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BannedDelta {
    /// The upstream reports the sub banned and the list does not have it.
    Add,
    /// The sub serves a listing again but the list still has it.
    Remove,
}

impl fmt::Display for BannedDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// What reconciling one sub produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubOutcome {
    pub sub: SubIdentifier,
    pub action: ReconcileAction,
    pub banned_delta: Option<BannedDelta>,
}

impl SubOutcome {
    pub fn new(sub: SubIdentifier, action: ReconcileAction, banned_delta: Option<BannedDelta>) -> Self {
        Self {
            sub,
            action,
            banned_delta,
        }
    }

    /// An outcome with no review and no banned-list change.
    pub fn unchanged(sub: SubIdentifier) -> Self {
        Self::new(sub, ReconcileAction::NoOp, None)
    }
}

/// Banned-list deltas gathered over a cycle, in traversal order.
///
/// A sub recorded twice in the same direction is kept once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedChanges {
    additions: Vec<SubIdentifier>,
    removals: Vec<SubIdentifier>,
}

impl BannedChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the deltas of a run of outcomes.
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a SubOutcome>) -> Self {
        let mut changes = Self::new();
        for outcome in outcomes {
            if let Some(delta) = outcome.banned_delta {
                changes.record(outcome.sub.clone(), delta);
            }
        }
        changes
    }

    /// Record one delta.
    pub fn record(&mut self, sub: SubIdentifier, delta: BannedDelta) {
        let list = match delta {
            BannedDelta::Add => &mut self.additions,
            BannedDelta::Remove => &mut self.removals,
        };
        if !list.contains(&sub) {
            list.push(sub);
        }
    }

    pub fn additions(&self) -> &[SubIdentifier] {
        &self.additions
    }

    pub fn removals(&self) -> &[SubIdentifier] {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// A sub whose reconciliation failed without stopping the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSub {
    pub sub: SubIdentifier,
    pub reason: String,
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Subs read from the directory.
    pub listed: usize,
    /// Outcomes of every sub that reconciled, in traversal order.
    pub outcomes: Vec<SubOutcome>,
    /// Subs that could not be fetched.
    pub failed: Vec<FailedSub>,
    /// Banned-list deltas that were committed.
    pub banned_changes: BannedChanges,
    /// The banned-list commit, if one was made.
    pub commit: Option<CommitReceipt>,
}

impl CycleReport {
    /// Subs flagged with the given action.
    pub fn flagged(&self, action: ReconcileAction) -> Vec<&SubIdentifier> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.action == action)
            .map(|outcome| &outcome.sub)
            .collect_vec()
    }

    /// Number of subs that reconciled.
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether every listed sub reconciled.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
