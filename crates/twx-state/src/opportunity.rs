//! # Opportunity Workflow
//!
//! Lifecycle of a host's listing, from draft through admin review to
//! publication and eventual archival.
//!
//! ## States
//!
//! ```text
//! Draft ──▶ Pending ──▶ Published ──▶ Paused ──▶ Published
//!   ▲          │            │  │
//!   │          ▼            │  ├──▶ Filled ──▶ Published (reopen)
//!   └──── Rejected          │  └──▶ Expired ──▶ Pending (renew)
//!                           ▼
//!                        Archived (terminal, reachable from every
//!                                  status except Pending)
//! ```
//!
//! Hosts drive their own listing; admins approve, reject, and expire.
//! Rejecting, pausing, and expiring require a reason, which is shown to
//! the host (and, for pauses, to applicants).

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use twx_core::{OpportunityId, UserId};

use crate::catalog::{ActionCatalog, ActionDescriptor, ButtonStyle};
use crate::error::TransitionError;
use crate::history::StatusHistoryEntry;
use crate::lifecycle::StatusLifecycle;
use crate::reason::ReasonPolicy;
use crate::status::WorkflowStatus;
use crate::transition::TransitionTable;
use crate::workflow::Workflow;

// ─── Opportunity Status ──────────────────────────────────────────────

/// The lifecycle status of an opportunity listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityStatus {
    /// Being written by the host; not visible to travellers.
    Draft,
    /// Submitted and awaiting admin review.
    Pending,
    /// Live and accepting applications.
    Published,
    /// Temporarily hidden by the host.
    Paused,
    /// All places taken.
    Filled,
    /// Listing period ended.
    Expired,
    /// Retired (terminal).
    Archived,
    /// Refused at review; the host may revise and resubmit.
    Rejected,
}

impl OpportunityStatus {
    /// Whether travellers can currently see the listing.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Published | Self::Filled)
    }
}

impl std::fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowStatus for OpportunityStatus {
    const KIND: &'static str = "opportunity";

    fn all() -> &'static [Self] {
        &[
            Self::Draft,
            Self::Pending,
            Self::Published,
            Self::Paused,
            Self::Filled,
            Self::Expired,
            Self::Archived,
            Self::Rejected,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Published => "PUBLISHED",
            Self::Paused => "PAUSED",
            Self::Filled => "FILLED",
            Self::Expired => "EXPIRED",
            Self::Archived => "ARCHIVED",
            Self::Rejected => "REJECTED",
        }
    }

    fn workflow() -> &'static Workflow<Self> {
        static WORKFLOW: OnceLock<Workflow<OpportunityStatus>> = OnceLock::new();
        WORKFLOW.get_or_init(opportunity_workflow)
    }
}

// ─── Built-in Workflow ───────────────────────────────────────────────

fn opportunity_workflow() -> Workflow<OpportunityStatus> {
    use OpportunityStatus::*;

    let transitions = TransitionTable::new()
        .with_rule(Draft, &[Pending, Archived])
        .with_rule(Pending, &[Published, Rejected, Draft])
        .with_rule(Published, &[Paused, Filled, Expired, Archived])
        .with_rule(Paused, &[Published, Archived])
        .with_rule(Filled, &[Published, Archived])
        .with_rule(Expired, &[Pending, Archived])
        .with_rule(Rejected, &[Draft, Archived])
        .with_rule(Archived, &[]);

    let archive = || {
        ActionDescriptor::transition("Archive", Archived)
            .host_only()
            .styled(ButtonStyle::Danger)
    };

    let catalog = ActionCatalog::new()
        .with_actions(
            Draft,
            vec![
                ActionDescriptor::save("Save draft"),
                ActionDescriptor::transition("Submit for review", Pending)
                    .host_only()
                    .styled(ButtonStyle::Primary),
                archive(),
            ],
        )
        .with_actions(
            Pending,
            vec![
                ActionDescriptor::transition("Approve", Published)
                    .admin_only()
                    .styled(ButtonStyle::Primary),
                ActionDescriptor::transition("Reject", Rejected)
                    .admin_only()
                    .styled(ButtonStyle::Danger),
                ActionDescriptor::transition("Withdraw submission", Draft).host_only(),
                ActionDescriptor::save("Save changes"),
            ],
        )
        .with_actions(
            Published,
            vec![
                ActionDescriptor::save("Save changes"),
                ActionDescriptor::transition("Pause", Paused).host_only(),
                ActionDescriptor::transition("Mark as filled", Filled)
                    .host_only()
                    .styled(ButtonStyle::Primary),
                archive(),
                ActionDescriptor::transition("Expire listing", Expired)
                    .admin_only()
                    .styled(ButtonStyle::Danger),
            ],
        )
        .with_actions(
            Paused,
            vec![
                ActionDescriptor::transition("Resume", Published)
                    .host_only()
                    .styled(ButtonStyle::Primary),
                archive(),
                ActionDescriptor::save("Save changes"),
            ],
        )
        .with_actions(
            Filled,
            vec![
                ActionDescriptor::transition("Reopen", Published).host_only(),
                archive(),
            ],
        )
        .with_actions(
            Expired,
            vec![
                ActionDescriptor::transition("Renew", Pending)
                    .host_only()
                    .styled(ButtonStyle::Primary),
                archive(),
            ],
        )
        .with_actions(
            Rejected,
            vec![
                ActionDescriptor::transition("Revise", Draft)
                    .host_only()
                    .styled(ButtonStyle::Primary),
                archive(),
            ],
        );

    let reasons = ReasonPolicy::new()
        .require(
            Pending,
            Rejected,
            "Why is this listing rejected?",
            "Tell the host what to fix before resubmitting",
        )
        .require(
            Published,
            Paused,
            "Why are you pausing this listing?",
            "Applicants will see this note, e.g. closed for renovation until May",
        )
        .require(
            Published,
            Expired,
            "Why is this listing being expired?",
            "Explain to the host why the listing is no longer current",
        );

    Workflow::new(transitions, catalog, reasons)
}

// ─── Opportunity Record ──────────────────────────────────────────────

/// A host's listing with its status lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Listing identifier.
    pub id: OpportunityId,
    /// Owning host.
    pub host_id: UserId,
    /// Listing title.
    pub title: String,
    /// Status and history.
    #[serde(flatten)]
    pub lifecycle: StatusLifecycle<OpportunityStatus>,
}

impl Opportunity {
    /// Create a draft listing owned by `host_id`.
    pub fn new(host_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id: OpportunityId::new(),
            host_id,
            title: title.into(),
            lifecycle: StatusLifecycle::new(OpportunityStatus::Draft, Some(host_id)),
        }
    }

    /// Current status.
    pub fn status(&self) -> OpportunityStatus {
        self.lifecycle.status()
    }

    /// Whether `user` owns this listing.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.host_id == user
    }

    /// Commit a transition using the built-in workflow.
    pub fn apply_transition(
        &mut self,
        to: OpportunityStatus,
        reason: Option<&str>,
        changed_by: Option<UserId>,
    ) -> Result<&StatusHistoryEntry<OpportunityStatus>, TransitionError> {
        self.lifecycle
            .apply(OpportunityStatus::workflow(), to, reason, changed_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twx_core::Role;
    use super::OpportunityStatus as O;

    fn labels(actions: &[ActionDescriptor<O>]) -> Vec<&str> {
        actions.iter().map(|a| a.label.as_str()).collect()
    }

    #[test]
    fn built_in_workflow_is_consistent() {
        O::workflow().validate().unwrap();
    }

    #[test]
    fn display_matches_serde() {
        for s in O::all() {
            let json = serde_json::to_value(s).unwrap();
            assert_eq!(json, s.to_string());
            assert_eq!(O::from_name(&s.to_string().to_lowercase()), Some(*s));
        }
    }

    #[test]
    fn archived_is_the_only_terminal_status() {
        let wf = O::workflow();
        let terminal: Vec<_> = O::all()
            .iter()
            .filter(|s| wf.transitions().is_terminal(**s))
            .collect();
        assert_eq!(terminal, vec![&O::Archived]);
    }

    // ── Menus per role ──────────────────────────────────────────────

    #[test]
    fn host_menu_for_published_listing() {
        let actions = O::workflow().available_actions(O::Published, Role::Host, true);
        assert_eq!(
            labels(&actions),
            vec!["Save changes", "Pause", "Mark as filled", "Archive"]
        );
    }

    #[test]
    fn admin_menu_for_pending_listing() {
        let actions = O::workflow().available_actions(O::Pending, Role::Admin, false);
        assert_eq!(labels(&actions), vec!["Approve", "Reject"]);
    }

    #[test]
    fn host_cannot_self_approve() {
        let actions = O::workflow().available_actions(O::Pending, Role::Host, false);
        assert_eq!(labels(&actions), vec!["Withdraw submission"]);
    }

    #[test]
    fn plain_user_sees_only_save() {
        for s in O::all() {
            let actions = O::workflow().available_actions(*s, Role::User, true);
            assert!(actions.iter().all(|a| a.is_save()), "{s}");
        }
    }

    // ── Reasons ─────────────────────────────────────────────────────

    #[test]
    fn reason_required_pairs() {
        let wf = O::workflow();
        assert!(wf.requires_reason(O::Pending, O::Rejected));
        assert!(wf.requires_reason(O::Published, O::Paused));
        assert!(wf.requires_reason(O::Published, O::Expired));
        assert!(!wf.requires_reason(O::Published, O::Archived));
        assert!(!wf.requires_reason(O::Pending, O::Published));
    }

    // ── Record ──────────────────────────────────────────────────────

    #[test]
    fn new_opportunity_is_draft_owned_by_host() {
        let host = UserId::new();
        let opp = Opportunity::new(host, "Hostel help in Hualien");
        assert_eq!(opp.status(), O::Draft);
        assert!(opp.is_owned_by(host));
        assert!(!opp.is_owned_by(UserId::new()));
    }

    #[test]
    fn full_publication_path() {
        let host = UserId::new();
        let admin = UserId::new();
        let mut opp = Opportunity::new(host, "Tea farm in Alishan");
        opp.apply_transition(O::Pending, None, Some(host)).unwrap();
        opp.apply_transition(O::Published, None, Some(admin)).unwrap();
        opp.apply_transition(O::Paused, Some("harvest break"), Some(host))
            .unwrap();
        opp.apply_transition(O::Published, None, Some(host)).unwrap();
        assert_eq!(opp.status(), O::Published);
        assert_eq!(opp.lifecycle.history().len(), 5);
        assert_eq!(opp.lifecycle.latest_reason(O::Paused), Some("harvest break"));
    }

    #[test]
    fn serializes_flat_with_history() {
        let opp = Opportunity::new(UserId::new(), "Surf shop in Taitung");
        let json = serde_json::to_value(&opp).unwrap();
        assert_eq!(json["status"], "DRAFT");
        assert_eq!(json["history"].as_array().unwrap().len(), 1);
        assert_eq!(json["title"], "Surf shop in Taitung");
    }
}
