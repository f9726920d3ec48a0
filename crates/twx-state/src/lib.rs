//! # twx-state: Status Workflows
//!
//! Table-driven state machines for the two entities whose status users
//! change by hand: opportunities (a host's listing) and applications (a
//! traveller's request to join one).
//!
//! ## Pieces
//!
//! - **Transition table** (`transition.rs`): status → ordered successors.
//! - **Action catalog** (`catalog.rs`): the buttons declared per status,
//!   with host-only/admin-only flags, and the eligibility filter.
//! - **Reason policy** (`reason.rs`): which `(from, to)` pairs need a
//!   justification, and the prompt text for each.
//! - **Workflow** (`workflow.rs`): the three tables together, with the
//!   startup consistency check and the server-side authorization check.
//! - **History & lifecycle** (`history.rs`, `lifecycle.rs`): the append-only
//!   status log and the single place a status mutates.
//! - **Menu session** (`menu.rs`): the interactive open → select → reason →
//!   confirm protocol.
//!
//! ## Design
//!
//! Unlike a typestate machine, statuses here arrive as data (from storage,
//! from HTTP bodies), so legality is checked at runtime against immutable
//! tables. The tables are built once per process behind a `OnceLock` and
//! handed out as `&'static Workflow<S>`.
//!
//! The menu-facing API never fails: unknown statuses have no successors and
//! no actions. Only the commit path ([`StatusLifecycle::apply`],
//! [`Workflow::authorize`]) returns errors.

pub mod application;
pub mod catalog;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod menu;
pub mod opportunity;
pub mod reason;
pub mod status;
pub mod transition;
pub mod workflow;

// ─── Workflow re-exports ────────────────────────────────────────────

pub use catalog::{ActionCatalog, ActionDescriptor, ButtonStyle};
pub use error::{CatalogError, CatalogIssue, TransitionError};
pub use reason::{ReasonConfig, ReasonPolicy};
pub use status::WorkflowStatus;
pub use transition::TransitionTable;
pub use workflow::Workflow;

// ─── History re-exports ─────────────────────────────────────────────

pub use history::{latest_status_reason, StatusHistory, StatusHistoryEntry};
pub use lifecycle::StatusLifecycle;

// ─── Entity re-exports ──────────────────────────────────────────────

pub use application::{Application, ApplicationStatus};
pub use opportunity::{Opportunity, OpportunityStatus};

// ─── Menu re-exports ────────────────────────────────────────────────

pub use menu::{MenuState, StatusMenu, StatusUpdate};

/// Validate both built-in workflows.
pub fn validate_builtin_workflows() -> Result<(), CatalogError> {
    OpportunityStatus::workflow().validate()?;
    ApplicationStatus::workflow().validate()
}
