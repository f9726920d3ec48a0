//! # Status Lifecycle
//!
//! The status-bearing part of an opportunity or application: the current
//! status plus its [`StatusHistory`]. Every committed change goes through
//! [`StatusLifecycle::apply`], which is the only place the status mutates.
//!
//! `apply` checks the edge and the reason requirement. Role and ownership
//! checks depend on who is calling and belong to the server; use
//! [`Workflow::authorize`] before `apply` there.

use serde::{Deserialize, Serialize};
use twx_core::{Timestamp, UserId};

use crate::error::TransitionError;
use crate::history::{StatusHistory, StatusHistoryEntry};
use crate::status::WorkflowStatus;
use crate::workflow::Workflow;

/// Current status and the log of how it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLifecycle<S> {
    status: S,
    history: StatusHistory<S>,
}

impl<S: WorkflowStatus> StatusLifecycle<S> {
    /// Start a lifecycle in `initial`, writing the opening history entry.
    pub fn new(initial: S, created_by: Option<UserId>) -> Self {
        let mut history = StatusHistory::new();
        history.record(initial, None, created_by, Timestamp::now());
        Self {
            status: initial,
            history,
        }
    }

    /// Current status.
    pub fn status(&self) -> S {
        self.status
    }

    /// Full history.
    pub fn history(&self) -> &StatusHistory<S> {
        &self.history
    }

    /// Reason attached to the most recent entry with `status`.
    pub fn latest_reason(&self, status: S) -> Option<&str> {
        self.history.latest_reason(status)
    }

    /// Commit `self.status -> to`.
    ///
    /// The reason is trimmed; a blank reason is stored as `None`. On error
    /// nothing is changed.
    pub fn apply(
        &mut self,
        workflow: &Workflow<S>,
        to: S,
        reason: Option<&str>,
        changed_by: Option<UserId>,
    ) -> Result<&StatusHistoryEntry<S>, TransitionError> {
        self.apply_at(workflow, to, reason, changed_by, Timestamp::now())
    }

    /// [`apply`](Self::apply) with an explicit commit time.
    pub fn apply_at(
        &mut self,
        workflow: &Workflow<S>,
        to: S,
        reason: Option<&str>,
        changed_by: Option<UserId>,
        at: Timestamp,
    ) -> Result<&StatusHistoryEntry<S>, TransitionError> {
        let from = self.status;
        workflow.check_edge(from, to)?;
        workflow.check_reason(from, to, reason)?;

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        self.status = to;
        Ok(self.history.record(to, reason, changed_by, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApplicationStatus as A, OpportunityStatus as O};

    #[test]
    fn new_writes_initial_entry() {
        let host = UserId::new();
        let lc = StatusLifecycle::new(O::Draft, Some(host));
        assert_eq!(lc.status(), O::Draft);
        assert_eq!(lc.history().len(), 1);
        assert_eq!(lc.history().entries()[0].changed_by, Some(host));
    }

    #[test]
    fn apply_appends_exactly_one_entry() {
        let wf = O::workflow();
        let mut lc = StatusLifecycle::new(O::Draft, None);
        let entry = lc.apply(wf, O::Pending, Some("  ready  "), None).unwrap();
        assert_eq!(entry.status, O::Pending);
        assert_eq!(entry.reason.as_deref(), Some("ready"));
        assert_eq!(lc.status(), O::Pending);
        assert_eq!(lc.history().len(), 2);
    }

    #[test]
    fn blank_optional_reason_is_stored_as_none() {
        let mut lc = StatusLifecycle::new(O::Draft, None);
        lc.apply(O::workflow(), O::Pending, Some("   "), None).unwrap();
        assert_eq!(lc.history().latest().unwrap().reason, None);
    }

    #[test]
    fn illegal_edge_leaves_state_untouched() {
        let mut lc = StatusLifecycle::new(O::Draft, None);
        let err = lc.apply(O::workflow(), O::Published, None, None).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
        assert_eq!(lc.status(), O::Draft);
        assert_eq!(lc.history().len(), 1);
    }

    #[test]
    fn required_reason_is_enforced() {
        let wf = O::workflow();
        let mut lc = StatusLifecycle::new(O::Draft, None);
        lc.apply(wf, O::Pending, None, None).unwrap();
        let err = lc.apply(wf, O::Rejected, Some(" "), None).unwrap_err();
        assert!(matches!(err, TransitionError::ReasonRequired { .. }));
        lc.apply(wf, O::Rejected, Some("photos missing"), None).unwrap();
        assert_eq!(lc.latest_reason(O::Rejected), Some("photos missing"));
    }

    #[test]
    fn terminal_status_rejects_everything() {
        let wf = A::workflow();
        let mut lc = StatusLifecycle::new(A::Draft, None);
        lc.apply(wf, A::Withdrawn, None, None).unwrap();
        for to in A::all() {
            assert!(matches!(
                lc.apply(wf, *to, Some("x"), None),
                Err(TransitionError::TerminalState { .. })
            ));
        }
    }
}
