//! # Workflow
//!
//! Bundles the three tables that define one status workflow: the
//! [`TransitionTable`], the [`ActionCatalog`], and the [`ReasonPolicy`].
//! A `Workflow` is built once and then only read; the product's built-in
//! workflows live behind `OnceLock`s (see
//! [`WorkflowStatus::workflow`](crate::WorkflowStatus::workflow)).
//!
//! ## Consistency
//!
//! The catalog and table are authored separately and can drift. Two lines
//! of defence:
//!
//! - [`Workflow::validate`] reports every defect. Binaries call it at
//!   startup and refuse to run on error.
//! - [`Workflow::available_actions`] still filters out any action whose
//!   target is not a successor, so a defect that slips through hides a
//!   button instead of offering an illegal move.

use twx_core::Role;

use crate::catalog::{ActionCatalog, ActionDescriptor};
use crate::error::{CatalogError, CatalogIssue, TransitionError};
use crate::reason::{ReasonConfig, ReasonPolicy};
use crate::status::WorkflowStatus;
use crate::transition::TransitionTable;

/// A complete status workflow for one entity kind.
#[derive(Debug, Clone)]
pub struct Workflow<S: WorkflowStatus> {
    transitions: TransitionTable<S>,
    catalog: ActionCatalog<S>,
    reasons: ReasonPolicy<S>,
}

impl<S: WorkflowStatus> Workflow<S> {
    /// Assemble a workflow. No validation is performed; call
    /// [`validate`](Self::validate) or use [`validated`](Self::validated).
    pub fn new(
        transitions: TransitionTable<S>,
        catalog: ActionCatalog<S>,
        reasons: ReasonPolicy<S>,
    ) -> Self {
        Self {
            transitions,
            catalog,
            reasons,
        }
    }

    /// Assemble and validate a workflow.
    pub fn validated(
        transitions: TransitionTable<S>,
        catalog: ActionCatalog<S>,
        reasons: ReasonPolicy<S>,
    ) -> Result<Self, CatalogError> {
        let workflow = Self::new(transitions, catalog, reasons);
        workflow.validate()?;
        Ok(workflow)
    }

    /// The transition table.
    pub fn transitions(&self) -> &TransitionTable<S> {
        &self.transitions
    }

    /// The action catalog.
    pub fn catalog(&self) -> &ActionCatalog<S> {
        &self.catalog
    }

    /// The reason policy.
    pub fn reasons(&self) -> &ReasonPolicy<S> {
        &self.reasons
    }

    // ── Lookups ─────────────────────────────────────────────────────

    /// Statuses directly reachable from `current`.
    pub fn next_statuses(&self, current: S) -> &[S] {
        self.transitions.next_statuses(current)
    }

    /// Successors of a raw status name; empty for unknown names.
    pub fn next_statuses_by_name(&self, name: &str) -> &[S] {
        self.transitions.next_statuses_by_name(name)
    }

    /// Actions `role` may invoke from `current`, in catalog order.
    pub fn available_actions(
        &self,
        current: S,
        role: Role,
        include_save_action: bool,
    ) -> Vec<ActionDescriptor<S>> {
        self.catalog.eligible(
            current,
            role,
            include_save_action,
            self.transitions.next_statuses(current),
        )
    }

    /// Like [`available_actions`](Self::available_actions) for a raw status
    /// name; empty for unknown names.
    pub fn available_actions_by_name(
        &self,
        current: &str,
        role: Role,
        include_save_action: bool,
    ) -> Vec<ActionDescriptor<S>> {
        match S::from_name(current) {
            Some(status) => self.available_actions(status, role, include_save_action),
            None => Vec::new(),
        }
    }

    /// Whether `from -> to` requires a reason.
    pub fn requires_reason(&self, from: S, to: S) -> bool {
        self.reasons.requires_reason(from, to)
    }

    /// Reason prompt for `from -> to`.
    pub fn reason_config(&self, from: S, to: S) -> ReasonConfig {
        self.reasons.reason_config(from, to)
    }

    // ── Server-side checks ──────────────────────────────────────────

    /// Check that `from -> to` is a legal edge.
    pub fn check_edge(&self, from: S, to: S) -> Result<(), TransitionError> {
        let next = self.transitions.next_statuses(from);
        if next.is_empty() {
            return Err(TransitionError::TerminalState {
                kind: S::KIND,
                status: from.to_string(),
            });
        }
        if !next.contains(&to) {
            return Err(TransitionError::InvalidTransition {
                kind: S::KIND,
                from: from.to_string(),
                to: to.to_string(),
                allowed: next
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(())
    }

    /// Check that `role` is offered an action moving `from -> to`, and
    /// return the first such action.
    ///
    /// The same catalog that drives the menu decides what the server
    /// accepts, so a hidden button can never be replayed as a request.
    pub fn authorize(
        &self,
        from: S,
        to: S,
        role: Role,
    ) -> Result<ActionDescriptor<S>, TransitionError> {
        self.check_edge(from, to)?;
        self.available_actions(from, role, false)
            .into_iter()
            .find(|a| a.target_status == Some(to))
            .ok_or(TransitionError::NotPermitted {
                kind: S::KIND,
                role,
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Check the reason requirement for `from -> to`.
    pub fn check_reason(&self, from: S, to: S, reason: Option<&str>) -> Result<(), TransitionError> {
        let config = self.reasons.reason_config(from, to);
        if config.accepts(reason.unwrap_or("")) {
            Ok(())
        } else {
            Err(TransitionError::ReasonRequired {
                kind: S::KIND,
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    // ── Consistency ─────────────────────────────────────────────────

    /// Collect every authoring defect, in enum order.
    pub fn issues(&self) -> Vec<CatalogIssue> {
        let mut issues: Vec<CatalogIssue> = self
            .transitions
            .missing_rules()
            .into_iter()
            .map(|s| CatalogIssue::MissingTransitionRule {
                status: s.to_string(),
            })
            .collect();

        for status in S::all() {
            for action in self.catalog.declared(*status) {
                if let Some(target) = action.target_status {
                    if !self.transitions.allows(*status, target) {
                        issues.push(CatalogIssue::UnreachableActionTarget {
                            from: status.to_string(),
                            label: action.label.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        for from in S::all() {
            for to in S::all() {
                if self.reasons.requires_reason(*from, *to) && !self.transitions.allows(*from, *to) {
                    issues.push(CatalogIssue::ReasonForIllegalTransition {
                        from: from.to_string(),
                        to: to.to_string(),
                    });
                }
            }
        }

        issues
    }

    /// Fail if the workflow has any authoring defect.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CatalogError {
                kind: S::KIND,
                issues,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ButtonStyle;
    use crate::OpportunityStatus as O;

    fn full_rules() -> TransitionTable<O> {
        O::all()
            .iter()
            .fold(TransitionTable::new(), |t, s| t.with_rule(*s, &[]))
    }

    /// The listing workflow from the menu walkthrough: a published listing
    /// can be paused (reason required) or archived (no reason).
    fn publish_pause_archive() -> Workflow<O> {
        Workflow::new(
            full_rules().with_rule(O::Published, &[O::Paused, O::Archived]),
            ActionCatalog::new().with_actions(
                O::Published,
                vec![
                    ActionDescriptor::save("Save changes"),
                    ActionDescriptor::transition("Pause", O::Paused).host_only(),
                    ActionDescriptor::transition("Archive", O::Archived)
                        .host_only()
                        .styled(ButtonStyle::Danger),
                    ActionDescriptor::transition("Force archive", O::Archived).admin_only(),
                    ActionDescriptor::transition("Expire", O::Expired).admin_only(),
                ],
            ),
            ReasonPolicy::new().require(O::Published, O::Paused, "Why pause?", "Reason"),
        )
    }

    #[test]
    fn drifted_action_is_hidden_at_runtime() {
        let wf = publish_pause_archive();
        let labels: Vec<_> = wf
            .available_actions(O::Published, Role::Admin, false)
            .into_iter()
            .map(|a| a.label)
            .collect();
        assert_eq!(labels, vec!["Force archive"]);
    }

    #[test]
    fn drifted_action_is_reported_by_validate() {
        let err = publish_pause_archive().validate().unwrap_err();
        assert_eq!(err.kind, "opportunity");
        assert_eq!(
            err.issues,
            vec![CatalogIssue::UnreachableActionTarget {
                from: "PUBLISHED".to_string(),
                label: "Expire".to_string(),
                target: "EXPIRED".to_string(),
            }]
        );
    }

    #[test]
    fn validate_reports_missing_rules_and_illegal_reason_pairs() {
        let wf = Workflow::new(
            TransitionTable::new().with_rule(O::Draft, &[O::Pending]),
            ActionCatalog::new(),
            ReasonPolicy::new().require(O::Draft, O::Archived, "t", "p"),
        );
        let issues = wf.issues();
        assert_eq!(
            issues
                .iter()
                .filter(|i| matches!(i, CatalogIssue::MissingTransitionRule { .. }))
                .count(),
            O::all().len() - 1
        );
        assert!(issues.contains(&CatalogIssue::ReasonForIllegalTransition {
            from: "DRAFT".to_string(),
            to: "ARCHIVED".to_string(),
        }));
        assert!(Workflow::validated(
            TransitionTable::new(),
            ActionCatalog::<O>::new(),
            ReasonPolicy::new()
        )
        .is_err());
    }

    #[test]
    fn unknown_status_name_degrades_to_no_actions() {
        let wf = publish_pause_archive();
        assert!(wf.available_actions_by_name("LIVE", Role::Host, true).is_empty());
        assert!(wf.next_statuses_by_name("LIVE").is_empty());
        assert_eq!(wf.available_actions_by_name("published", Role::Host, false).len(), 2);
    }

    #[test]
    fn check_edge_distinguishes_terminal_from_invalid() {
        let wf = publish_pause_archive();
        assert!(matches!(
            wf.check_edge(O::Archived, O::Published),
            Err(TransitionError::TerminalState { .. })
        ));
        assert!(matches!(
            wf.check_edge(O::Published, O::Draft),
            Err(TransitionError::InvalidTransition { ref allowed, .. }) if allowed == "PAUSED, ARCHIVED"
        ));
        assert!(wf.check_edge(O::Published, O::Paused).is_ok());
    }

    #[test]
    fn authorize_uses_the_menu_catalog() {
        let wf = publish_pause_archive();
        let granted = wf.authorize(O::Published, O::Archived, Role::Host).unwrap();
        assert_eq!(granted.label, "Archive");
        let granted = wf.authorize(O::Published, O::Archived, Role::SuperAdmin).unwrap();
        assert_eq!(granted.label, "Force archive");
        assert!(matches!(
            wf.authorize(O::Published, O::Paused, Role::User),
            Err(TransitionError::NotPermitted { role: Role::User, .. })
        ));
    }

    #[test]
    fn check_reason_enforces_required_pairs_only() {
        let wf = publish_pause_archive();
        assert!(wf.check_reason(O::Published, O::Paused, None).is_err());
        assert!(wf.check_reason(O::Published, O::Paused, Some("   ")).is_err());
        assert!(wf.check_reason(O::Published, O::Paused, Some("rainy season")).is_ok());
        assert!(wf.check_reason(O::Published, O::Archived, None).is_ok());
    }
}
