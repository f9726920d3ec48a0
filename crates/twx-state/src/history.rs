//! # Status History
//!
//! Append-only log of committed transitions. One entry per commit, carrying
//! the new status, the optional reason, who made the change and when.
//!
//! ## Latest reason
//!
//! The reason shown next to a status is the reason on the most recent entry
//! with that status. "Most recent" is decided by `changed_at`, not by
//! position: histories loaded from storage may arrive in any order. When two
//! entries share a timestamp the one stored later wins.
//!
//! If the most recent matching entry has no reason, the answer is `None`;
//! an older entry's reason is never surfaced in its place.

use serde::{Deserialize, Serialize};
use twx_core::{Timestamp, UserId};

use crate::status::WorkflowStatus;

/// One committed status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry<S> {
    /// Status entered by this change.
    pub status: S,
    /// Justification supplied with the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Who made the change.
    #[serde(default, alias = "changedBy", skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<UserId>,
    /// When the change was committed.
    #[serde(alias = "changedAt")]
    pub changed_at: Timestamp,
}

/// Ordered, append-only history of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistory<S> {
    entries: Vec<StatusHistoryEntry<S>>,
}

impl<S: WorkflowStatus> StatusHistory<S> {
    /// An empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Wrap entries loaded from storage. Order is not assumed.
    pub fn from_entries(entries: Vec<StatusHistoryEntry<S>>) -> Self {
        Self { entries }
    }

    /// Append an entry.
    ///
    /// `changed_at` is clamped to be no earlier than the newest existing
    /// entry, so a clock step backwards cannot reorder the log.
    pub fn record(
        &mut self,
        status: S,
        reason: Option<String>,
        changed_by: Option<UserId>,
        changed_at: Timestamp,
    ) -> &StatusHistoryEntry<S> {
        let changed_at = match self.newest_timestamp() {
            Some(newest) if newest > changed_at => newest,
            _ => changed_at,
        };
        let idx = self.entries.len();
        self.entries.push(StatusHistoryEntry {
            status,
            reason,
            changed_by,
            changed_at,
        });
        &self.entries[idx]
    }

    /// Entries in storage order.
    pub fn entries(&self) -> &[StatusHistoryEntry<S>] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry by `changed_at`.
    pub fn latest(&self) -> Option<&StatusHistoryEntry<S>> {
        self.entries
            .iter()
            .enumerate()
            .max_by_key(|(idx, e)| (e.changed_at, *idx))
            .map(|(_, e)| e)
    }

    /// Reason on the most recent entry with `status`.
    pub fn latest_reason(&self, status: S) -> Option<&str> {
        latest_status_reason(&self.entries, status)
    }

    fn newest_timestamp(&self) -> Option<Timestamp> {
        self.entries.iter().map(|e| e.changed_at).max()
    }
}

impl<S: WorkflowStatus> Default for StatusHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reason on the most recent entry of `history` with `status`.
///
/// Returns `None` when no entry has that status, or when the most recent
/// one carries no reason.
pub fn latest_status_reason<S: WorkflowStatus>(
    history: &[StatusHistoryEntry<S>],
    status: S,
) -> Option<&str> {
    history
        .iter()
        .enumerate()
        .filter(|(_, e)| e.status == status)
        .max_by_key(|(idx, e)| (e.changed_at, *idx))
        .and_then(|(_, e)| e.reason.as_deref())
}
