//! # Route Modules
//!
//! One module per entity kind. Shared here: the response views built from
//! twx-state records, and the query/request DTOs both kinds accept.

pub mod applications;
pub mod opportunities;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use twx_core::Role;
use twx_state::{ActionDescriptor, StatusHistory, Workflow, WorkflowStatus};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::Validate;

/// Longest accepted reason, in characters.
pub const MAX_REASON_CHARS: usize = 2000;

// -- Requests -----------------------------------------------------------------

/// Request to change an entity's status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status name, e.g. `PAUSED`.
    pub status: String,
    /// Justification. Required for some transitions.
    pub reason: Option<String>,
}

impl Validate for TransitionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.status.trim().is_empty() {
            return Err("status must not be empty".to_string());
        }
        if let Some(reason) = &self.reason {
            if reason.chars().count() > MAX_REASON_CHARS {
                return Err(format!("reason must not exceed {MAX_REASON_CHARS} characters"));
            }
        }
        Ok(())
    }
}

/// Query for the actions endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActionsQuery {
    /// Include the save-without-transition action.
    #[serde(default)]
    pub include_save: bool,
}

/// Query for the status-reason endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusReasonQuery {
    /// Status whose latest reason is wanted.
    pub status: String,
}

// -- Views --------------------------------------------------------------------

/// One status history entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryView {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

/// Reason prompt for an action that requires one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReasonPromptView {
    pub title: String,
    pub placeholder: String,
}

/// One action offered to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionView {
    pub label: String,
    /// `null` for the save action.
    pub target_status: Option<String>,
    pub host_only: bool,
    pub admin_only: bool,
    /// `default`, `primary` or `danger`.
    pub button_style: String,
    /// Present when the transition requires a reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonPromptView>,
}

/// Actions offered to the caller for one entity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionsResponse {
    pub status: String,
    pub role: String,
    pub actions: Vec<ActionView>,
}

/// Latest reason recorded for a status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusReasonResponse {
    pub status: String,
    pub reason: Option<String>,
}

// -- Helpers ------------------------------------------------------------------

/// Parse a target status from a request, rejecting unknown names with the
/// list of valid ones.
pub(crate) fn parse_status<S: WorkflowStatus>(name: &str) -> Result<S, AppError> {
    S::from_name(name).ok_or_else(|| {
        AppError::Validation(format!(
            "unknown {} status '{}' (valid: {})",
            S::KIND,
            name,
            S::all()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

pub(crate) fn history_view<S: WorkflowStatus>(history: &StatusHistory<S>) -> Vec<HistoryEntryView> {
    history
        .entries()
        .iter()
        .map(|e| HistoryEntryView {
            status: e.status.to_string(),
            reason: e.reason.clone(),
            changed_by: e.changed_by.map(|u| *u.as_uuid()),
            changed_at: *e.changed_at.as_datetime(),
        })
        .collect()
}

pub(crate) fn action_view<S: WorkflowStatus>(
    workflow: &Workflow<S>,
    current: S,
    action: &ActionDescriptor<S>,
) -> ActionView {
    let reason = action
        .target_status
        .map(|t| workflow.reason_config(current, t))
        .filter(|c| c.required)
        .map(|c| ReasonPromptView {
            title: c.title,
            placeholder: c.placeholder,
        });
    ActionView {
        label: action.label.clone(),
        target_status: action.target_status.map(|t| t.to_string()),
        host_only: action.host_only,
        admin_only: action.admin_only,
        button_style: serde_json::to_value(action.button_style)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        reason,
    }
}

pub(crate) fn actions_response<S: WorkflowStatus>(
    workflow: &Workflow<S>,
    current: S,
    role: Role,
    actions: &[ActionDescriptor<S>],
) -> ActionsResponse {
    ActionsResponse {
        status: current.to_string(),
        role: role.to_string(),
        actions: actions
            .iter()
            .map(|a| action_view(workflow, current, a))
            .collect(),
    }
}

pub(crate) fn status_reason_response<S: WorkflowStatus>(
    history: &StatusHistory<S>,
    status: &str,
) -> StatusReasonResponse {
    // Unknown names have no history entries; answer with no reason.
    let reason = S::from_name(status)
        .and_then(|s| history.latest_reason(s))
        .map(str::to_string);
    StatusReasonResponse {
        status: status.trim().to_ascii_uppercase(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twx_state::OpportunityStatus as O;

    #[test]
    fn transition_request_rules() {
        let ok = TransitionRequest {
            status: "PAUSED".into(),
            reason: Some("renovation".into()),
        };
        assert!(ok.validate().is_ok());
        let blank = TransitionRequest {
            status: " ".into(),
            reason: None,
        };
        assert!(blank.validate().is_err());
        let long = TransitionRequest {
            status: "PAUSED".into(),
            reason: Some("x".repeat(MAX_REASON_CHARS + 1)),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn parse_status_lists_valid_names() {
        assert_eq!(parse_status::<O>("paused").unwrap(), O::Paused);
        let err = parse_status::<O>("LIVE").unwrap_err();
        assert!(err.to_string().contains("DRAFT, PENDING"));
    }

    #[test]
    fn action_view_carries_reason_prompt() {
        let wf = <O as WorkflowStatus>::workflow();
        let actions = wf.available_actions(O::Published, Role::Host, true);
        let views: Vec<_> = actions.iter().map(|a| action_view(wf, O::Published, a)).collect();
        let pause = views.iter().find(|v| v.label == "Pause").unwrap();
        assert!(pause.reason.is_some());
        let save = views.iter().find(|v| v.target_status.is_none()).unwrap();
        assert!(save.reason.is_none());
        let filled = views.iter().find(|v| v.label == "Mark as filled").unwrap();
        assert_eq!(filled.button_style, "primary");
    }
}
