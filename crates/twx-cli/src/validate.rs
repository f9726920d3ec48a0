//! # Validate Subcommand
//!
//! Runs the workflow consistency check and reports every defect found.
//! Exits with status 1 when any workflow is inconsistent, so it can gate CI.

use anyhow::Result;
use clap::Args;
use serde_json::{json, Value};

use twx_state::{ApplicationStatus, OpportunityStatus, WorkflowStatus};

use crate::{print_json, WorkflowKind};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Only validate this workflow. Defaults to all.
    #[arg(long, value_enum)]
    pub kind: Option<WorkflowKind>,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => WorkflowKind::ALL.to_vec(),
    };

    let reports: Vec<Value> = kinds.into_iter().map(validate_report).collect();
    let ok = reports.iter().all(|r| r["ok"] == Value::Bool(true));

    for report in &reports {
        let kind = &report["kind"];
        if report["ok"] == Value::Bool(true) {
            tracing::info!(%kind, "workflow consistent");
        } else {
            tracing::error!(%kind, "workflow inconsistent");
        }
    }

    print_json(&json!({ "ok": ok, "workflows": reports }))?;
    Ok(if ok { 0 } else { 1 })
}

/// Consistency report for one built-in workflow.
pub fn validate_report(kind: WorkflowKind) -> Value {
    match kind {
        WorkflowKind::Opportunity => report::<OpportunityStatus>(),
        WorkflowKind::Application => report::<ApplicationStatus>(),
    }
}

fn report<S: WorkflowStatus>() -> Value {
    let issues: Vec<String> = S::workflow()
        .issues()
        .iter()
        .map(ToString::to_string)
        .collect();
    json!({
        "kind": S::KIND,
        "ok": issues.is_empty(),
        "statuses": S::all().len(),
        "issues": issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_workflows_are_consistent() {
        for kind in WorkflowKind::ALL {
            let report = validate_report(kind);
            assert_eq!(report["ok"], true, "{report}");
            assert!(report["issues"].as_array().unwrap().is_empty());
        }
    }

    #[test]
    fn report_names_kind_and_status_count() {
        let report = validate_report(WorkflowKind::Opportunity);
        assert_eq!(report["kind"], "opportunity");
        assert_eq!(report["statuses"], 8);

        let report = validate_report(WorkflowKind::Application);
        assert_eq!(report["kind"], "application");
        assert_eq!(report["statuses"], 7);
    }

    #[test]
    fn run_validate_exits_zero() {
        let code = run_validate(&ValidateArgs { kind: None }).unwrap();
        assert_eq!(code, 0);
    }
}
