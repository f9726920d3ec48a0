//! # Inspection Subcommands
//!
//! Read-only views of the built-in workflows: the transition table, the
//! actions a role is offered from a status, and the reason prompt for a
//! transition. Answers match what the API serves, since both read the same
//! `&'static Workflow`.

use anyhow::{bail, Result};
use clap::Args;
use serde_json::{json, Value};

use twx_core::Role;
use twx_state::{ActionDescriptor, ApplicationStatus, OpportunityStatus, Workflow, WorkflowStatus};

use crate::{print_json, WorkflowKind};

// ── Arguments ────────────────────────────────────────────────────────

/// Arguments for `twx transitions`.
#[derive(Args, Debug)]
pub struct TransitionsArgs {
    /// Workflow to print.
    #[arg(long, value_enum)]
    pub kind: WorkflowKind,
}

/// Arguments for `twx actions`.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    /// Workflow to query.
    #[arg(long, value_enum)]
    pub kind: WorkflowKind,

    /// Current status (e.g. PUBLISHED). Unknown names yield no actions.
    #[arg(long)]
    pub status: String,

    /// Role of the acting user (user, host, admin, super_admin).
    #[arg(long)]
    pub role: Role,

    /// Include the save-without-transition action.
    #[arg(long)]
    pub include_save: bool,
}

/// Arguments for `twx reason`.
#[derive(Args, Debug)]
pub struct ReasonArgs {
    /// Workflow to query.
    #[arg(long, value_enum)]
    pub kind: WorkflowKind,

    /// Source status.
    #[arg(long)]
    pub from: String,

    /// Target status.
    #[arg(long)]
    pub to: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// Execute `twx transitions`.
pub fn run_transitions(args: &TransitionsArgs) -> Result<u8> {
    print_json(&transitions_report(args.kind))?;
    Ok(0)
}

/// Execute `twx actions`.
pub fn run_actions(args: &ActionsArgs) -> Result<u8> {
    let report = actions_report(args.kind, &args.status, args.role, args.include_save);
    if report["actions"].as_array().is_some_and(Vec::is_empty) {
        tracing::debug!(status = %args.status, role = %args.role, "no actions offered");
    }
    print_json(&report)?;
    Ok(0)
}

/// Execute `twx reason`.
pub fn run_reason(args: &ReasonArgs) -> Result<u8> {
    print_json(&reason_report(args.kind, &args.from, &args.to)?)?;
    Ok(0)
}

// ── Reports ──────────────────────────────────────────────────────────

/// The full transition table, in lifecycle order.
pub fn transitions_report(kind: WorkflowKind) -> Value {
    match kind {
        WorkflowKind::Opportunity => transitions::<OpportunityStatus>(),
        WorkflowKind::Application => transitions::<ApplicationStatus>(),
    }
}

/// The actions `role` is offered from `status`.
pub fn actions_report(kind: WorkflowKind, status: &str, role: Role, include_save: bool) -> Value {
    match kind {
        WorkflowKind::Opportunity => actions::<OpportunityStatus>(status, role, include_save),
        WorkflowKind::Application => actions::<ApplicationStatus>(status, role, include_save),
    }
}

/// The reason prompt for `from -> to`. Fails on unknown status names.
pub fn reason_report(kind: WorkflowKind, from: &str, to: &str) -> Result<Value> {
    match kind {
        WorkflowKind::Opportunity => reason::<OpportunityStatus>(from, to),
        WorkflowKind::Application => reason::<ApplicationStatus>(from, to),
    }
}

fn names<S: WorkflowStatus>(statuses: &[S]) -> Vec<&'static str> {
    statuses.iter().map(|s| s.as_str()).collect()
}

fn transitions<S: WorkflowStatus>() -> Value {
    let workflow = S::workflow();
    let rules: Vec<Value> = S::all()
        .iter()
        .map(|&status| {
            json!({
                "status": status.as_str(),
                "next": names(workflow.next_statuses(status)),
                "terminal": workflow.transitions().is_terminal(status),
            })
        })
        .collect();
    json!({ "kind": S::KIND, "transitions": rules })
}

fn action_json<S: WorkflowStatus>(
    workflow: &Workflow<S>,
    from: S,
    action: &ActionDescriptor<S>,
) -> Value {
    let reason_required = action
        .target_status
        .is_some_and(|to| workflow.requires_reason(from, to));
    json!({
        "label": action.label,
        "target_status": action.target_status.map(|s| s.as_str()),
        "button_style": action.button_style,
        "host_only": action.host_only,
        "admin_only": action.admin_only,
        "reason_required": reason_required,
    })
}

fn actions<S: WorkflowStatus>(status: &str, role: Role, include_save: bool) -> Value {
    let workflow = S::workflow();
    let actions: Vec<Value> = match S::from_name(status) {
        Some(current) => workflow
            .available_actions(current, role, include_save)
            .iter()
            .map(|a| action_json(workflow, current, a))
            .collect(),
        None => Vec::new(),
    };
    json!({
        "kind": S::KIND,
        "status": status.trim().to_ascii_uppercase(),
        "role": role,
        "actions": actions,
    })
}

fn reason<S: WorkflowStatus>(from: &str, to: &str) -> Result<Value> {
    let parse = |name: &str| {
        S::from_name(name).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown {} status '{}' (valid: {})",
                S::KIND,
                name,
                names(S::all()).join(", ")
            )
        })
    };
    let (from, to) = (parse(from)?, parse(to)?);

    let workflow = S::workflow();
    if !workflow.transitions().allows(from, to) {
        bail!(
            "{} -> {} is not a legal {} transition (next: {})",
            from,
            to,
            S::KIND,
            names(workflow.next_statuses(from)).join(", ")
        );
    }

    let config = workflow.reason_config(from, to);
    Ok(json!({
        "kind": S::KIND,
        "from": from.as_str(),
        "to": to.as_str(),
        "required": config.required,
        "title": config.title,
        "placeholder": config.placeholder,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(report: &Value) -> Vec<&str> {
        report["actions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["label"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn transitions_cover_every_status() {
        let report = transitions_report(WorkflowKind::Opportunity);
        let rules = report["transitions"].as_array().unwrap();
        assert_eq!(rules.len(), 8);
        let archived = rules.iter().find(|r| r["status"] == "ARCHIVED").unwrap();
        assert_eq!(archived["terminal"], true);
        assert_eq!(archived["next"], json!([]));
    }

    #[test]
    fn application_draft_successors() {
        let report = transitions_report(WorkflowKind::Application);
        assert_eq!(report["transitions"][0]["status"], "DRAFT");
        assert_eq!(report["transitions"][0]["next"], json!(["PENDING", "WITHDRAWN"]));
    }

    #[test]
    fn host_menu_on_published_listing() {
        let report = actions_report(WorkflowKind::Opportunity, "published", Role::Host, true);
        assert_eq!(report["status"], "PUBLISHED");
        assert_eq!(report["role"], "HOST");
        assert_eq!(labels(&report), vec!["Save changes", "Pause", "Mark as filled", "Archive"]);
        assert_eq!(report["actions"][1]["reason_required"], true);
        assert_eq!(report["actions"][3]["reason_required"], false);
        assert!(report["actions"][0]["target_status"].is_null());
    }

    #[test]
    fn plain_user_sees_nothing_on_a_listing() {
        let report = actions_report(WorkflowKind::Opportunity, "PUBLISHED", Role::User, false);
        assert!(labels(&report).is_empty());
    }

    #[test]
    fn unknown_status_yields_no_actions() {
        let report = actions_report(WorkflowKind::Application, "ON_HOLD", Role::Admin, true);
        assert!(labels(&report).is_empty());
    }

    #[test]
    fn reason_prompt_for_pause() {
        let report = reason_report(WorkflowKind::Opportunity, "PUBLISHED", "PAUSED").unwrap();
        assert_eq!(report["required"], true);
        assert_eq!(report["title"], "Why are you pausing this listing?");
    }

    #[test]
    fn reason_not_required_for_archive() {
        let report = reason_report(WorkflowKind::Opportunity, "PUBLISHED", "ARCHIVED").unwrap();
        assert_eq!(report["required"], false);
    }

    #[test]
    fn reason_rejects_unknown_and_illegal_pairs() {
        let err = reason_report(WorkflowKind::Opportunity, "LIVE", "PAUSED").unwrap_err();
        assert!(err.to_string().contains("valid: DRAFT"));

        let err = reason_report(WorkflowKind::Application, "COMPLETED", "ACTIVE").unwrap_err();
        assert!(err.to_string().contains("not a legal application transition"));
    }
}
