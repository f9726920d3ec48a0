//! # State Machine Errors
//!
//! Errors raised when a transition is *committed* (server side) and when a
//! workflow definition is validated at startup. The interactive menu never
//! raises: it degrades to "no action" instead.

use thiserror::Error;
use twx_core::Role;

/// Errors that can occur when committing a status transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The entity is in a status with no successors.
    #[error("{kind} is in terminal status {status}")]
    TerminalState {
        /// Entity kind (`opportunity`, `application`).
        kind: &'static str,
        /// The terminal status.
        status: String,
    },

    /// The edge is not in the transition table.
    #[error("invalid {kind} transition: {from} -> {to} (allowed: [{allowed}])")]
    InvalidTransition {
        /// Entity kind.
        kind: &'static str,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
        /// Comma-separated legal successors of `from`.
        allowed: String,
    },

    /// No action offered to this role moves `from -> to`.
    #[error("role {role} may not move {kind} from {from} to {to}")]
    NotPermitted {
        /// Entity kind.
        kind: &'static str,
        /// Caller's role.
        role: Role,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// The transition requires a non-blank reason.
    #[error("a reason is required to move {kind} from {from} to {to}")]
    ReasonRequired {
        /// Entity kind.
        kind: &'static str,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
}

/// One authoring defect in a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// A status has no transition rule (not even an empty one).
    MissingTransitionRule {
        /// The status without a rule.
        status: String,
    },
    /// An action targets a status that is not a successor of its source.
    UnreachableActionTarget {
        /// Status the action is declared on.
        from: String,
        /// Action label.
        label: String,
        /// Declared target.
        target: String,
    },
    /// The reason policy configures a pair that is not a legal edge.
    ReasonForIllegalTransition {
        /// Source status.
        from: String,
        /// Target status.
        to: String,
    },
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTransitionRule { status } => {
                write!(f, "status {status} has no transition rule")
            }
            Self::UnreachableActionTarget { from, label, target } => write!(
                f,
                "action \"{label}\" on {from} targets {target}, which is not a successor of {from}"
            ),
            Self::ReasonForIllegalTransition { from, to } => {
                write!(f, "reason policy configures {from} -> {to}, which is not a legal transition")
            }
        }
    }
}

/// A workflow definition failed its consistency check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} workflow is inconsistent: {}", render_issues(.issues))]
pub struct CatalogError {
    /// Entity kind.
    pub kind: &'static str,
    /// Every defect found, in a stable order.
    pub issues: Vec<CatalogIssue>,
}

fn render_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_lists_allowed_targets() {
        let err = TransitionError::InvalidTransition {
            kind: "opportunity",
            from: "ARCHIVED".to_string(),
            to: "PUBLISHED".to_string(),
            allowed: String::new(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ARCHIVED -> PUBLISHED"));
    }

    #[test]
    fn not_permitted_names_role() {
        let err = TransitionError::NotPermitted {
            kind: "opportunity",
            role: Role::Host,
            from: "PENDING".to_string(),
            to: "PUBLISHED".to_string(),
        };
        assert!(err.to_string().contains("HOST"));
    }

    #[test]
    fn catalog_error_joins_issues() {
        let err = CatalogError {
            kind: "application",
            issues: vec![
                CatalogIssue::MissingTransitionRule {
                    status: "ACTIVE".to_string(),
                },
                CatalogIssue::ReasonForIllegalTransition {
                    from: "DRAFT".to_string(),
                    to: "COMPLETED".to_string(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("application workflow is inconsistent"));
        assert!(msg.contains("ACTIVE has no transition rule"));
        assert!(msg.contains("; "));
    }
}
