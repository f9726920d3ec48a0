//! # Application Workflow
//!
//! Lifecycle of a traveller's application to an opportunity.
//!
//! ## States
//!
//! ```text
//! Draft ──▶ Pending ──▶ Accepted ──▶ Active ──▶ Completed (terminal)
//!   │          │  │         │  │
//!   │          │  └──▶ Rejected (terminal) ◀──┘
//!   │          │            │
//!   └──────────┴────────────┴──▶ Withdrawn (terminal)
//! ```
//!
//! Progress is monotone along `Draft < Pending < Accepted < Active <
//! Completed`; the only other moves are to `Rejected` (by the host) or
//! `Withdrawn` (by the applicant). Once a placement is active it can only
//! complete.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use twx_core::{ApplicationId, OpportunityId, UserId};

use crate::catalog::{ActionCatalog, ActionDescriptor, ButtonStyle};
use crate::error::TransitionError;
use crate::history::StatusHistoryEntry;
use crate::lifecycle::StatusLifecycle;
use crate::reason::ReasonPolicy;
use crate::status::WorkflowStatus;
use crate::transition::TransitionTable;
use crate::workflow::Workflow;

// ─── Application Status ──────────────────────────────────────────────

/// The lifecycle status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Being written by the applicant.
    Draft,
    /// Submitted, awaiting the host's decision.
    Pending,
    /// Host accepted; stay not yet started.
    Accepted,
    /// Declined by the host (terminal).
    Rejected,
    /// Applicant is on site.
    Active,
    /// Stay finished (terminal).
    Completed,
    /// Withdrawn by the applicant (terminal).
    Withdrawn,
}

impl ApplicationStatus {
    /// Position along the forward path, or `None` for the exit statuses
    /// (`Rejected`, `Withdrawn`).
    pub fn progress_rank(&self) -> Option<u8> {
        match self {
            Self::Draft => Some(0),
            Self::Pending => Some(1),
            Self::Accepted => Some(2),
            Self::Active => Some(3),
            Self::Completed => Some(4),
            Self::Rejected | Self::Withdrawn => None,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowStatus for ApplicationStatus {
    const KIND: &'static str = "application";

    fn all() -> &'static [Self] {
        &[
            Self::Draft,
            Self::Pending,
            Self::Accepted,
            Self::Rejected,
            Self::Active,
            Self::Completed,
            Self::Withdrawn,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }

    fn workflow() -> &'static Workflow<Self> {
        static WORKFLOW: OnceLock<Workflow<ApplicationStatus>> = OnceLock::new();
        WORKFLOW.get_or_init(application_workflow)
    }
}

// ─── Built-in Workflow ───────────────────────────────────────────────

fn application_workflow() -> Workflow<ApplicationStatus> {
    use ApplicationStatus::*;

    let transitions = TransitionTable::new()
        .with_rule(Draft, &[Pending, Withdrawn])
        .with_rule(Pending, &[Accepted, Rejected, Withdrawn])
        .with_rule(Accepted, &[Active, Rejected, Withdrawn])
        .with_rule(Active, &[Completed])
        .with_rule(Rejected, &[])
        .with_rule(Completed, &[])
        .with_rule(Withdrawn, &[]);

    let catalog = ActionCatalog::new()
        .with_actions(
            Draft,
            vec![
                ActionDescriptor::save("Save draft"),
                ActionDescriptor::transition("Submit application", Pending)
                    .styled(ButtonStyle::Primary),
                ActionDescriptor::transition("Discard", Withdrawn).styled(ButtonStyle::Danger),
            ],
        )
        .with_actions(
            Pending,
            vec![
                ActionDescriptor::transition("Accept", Accepted)
                    .host_only()
                    .styled(ButtonStyle::Primary),
                ActionDescriptor::transition("Decline", Rejected)
                    .host_only()
                    .styled(ButtonStyle::Danger),
                ActionDescriptor::transition("Withdraw", Withdrawn),
            ],
        )
        .with_actions(
            Accepted,
            vec![
                ActionDescriptor::transition("Check in", Active)
                    .host_only()
                    .styled(ButtonStyle::Primary),
                ActionDescriptor::transition("Cancel placement", Rejected)
                    .host_only()
                    .styled(ButtonStyle::Danger),
                ActionDescriptor::transition("Withdraw", Withdrawn).styled(ButtonStyle::Danger),
            ],
        )
        .with_actions(
            Active,
            vec![ActionDescriptor::transition("Mark completed", Completed)
                .host_only()
                .styled(ButtonStyle::Primary)],
        );

    let reasons = ReasonPolicy::new()
        .require(
            Pending,
            Rejected,
            "Why are you declining this application?",
            "The applicant will see this message",
        )
        .require(
            Accepted,
            Rejected,
            "Why are you cancelling this placement?",
            "The applicant will see this message",
        )
        .require(
            Accepted,
            Withdrawn,
            "Why are you withdrawing?",
            "Let the host know so they can plan, e.g. flight cancelled",
        );

    Workflow::new(transitions, catalog, reasons)
}

// ─── Application Record ──────────────────────────────────────────────

/// A traveller's application with its status lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application identifier.
    pub id: ApplicationId,
    /// Opportunity applied to.
    pub opportunity_id: OpportunityId,
    /// The traveller.
    pub applicant_id: UserId,
    /// Host of the opportunity at the time of application.
    pub host_id: UserId,
    /// Status and history.
    #[serde(flatten)]
    pub lifecycle: StatusLifecycle<ApplicationStatus>,
}

impl Application {
    /// Start a draft application.
    pub fn new(opportunity_id: OpportunityId, applicant_id: UserId, host_id: UserId) -> Self {
        Self {
            id: ApplicationId::new(),
            opportunity_id,
            applicant_id,
            host_id,
            lifecycle: StatusLifecycle::new(ApplicationStatus::Draft, Some(applicant_id)),
        }
    }

    /// Current status.
    pub fn status(&self) -> ApplicationStatus {
        self.lifecycle.status()
    }

    /// Commit a transition using the built-in workflow.
    pub fn apply_transition(
        &mut self,
        to: ApplicationStatus,
        reason: Option<&str>,
        changed_by: Option<UserId>,
    ) -> Result<&StatusHistoryEntry<ApplicationStatus>, TransitionError> {
        self.lifecycle
            .apply(ApplicationStatus::workflow(), to, reason, changed_by)
    }
}
