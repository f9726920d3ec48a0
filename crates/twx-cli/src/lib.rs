//! # twx-cli: Workflow Inspection Tool
//!
//! Provides the `twx` command-line interface over the built-in status
//! workflows. Useful in CI (catalog consistency) and when answering "why
//! can't this host see the Pause button?" without starting the API.
//!
//! ## Subcommands
//!
//! - `twx validate`: Consistency check of the built-in catalogs.
//! - `twx transitions`: Print the transition table.
//! - `twx actions`: Actions a role is offered from a status.
//! - `twx reason`: Reason prompt for a `(from, to)` pair.
//!
//! Every subcommand prints JSON on stdout. Handlers build a
//! `serde_json::Value` so they can be tested without capturing output.

pub mod inspect;
pub mod validate;

use clap::ValueEnum;
use serde::Serialize;

/// Which entity's workflow a subcommand operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    /// A host's listing.
    Opportunity,
    /// A traveller's request to join a listing.
    Application,
}

impl WorkflowKind {
    /// Both kinds, in a stable order.
    pub const ALL: [WorkflowKind; 2] = [WorkflowKind::Opportunity, WorkflowKind::Application];
}

/// Print a JSON document to stdout.
pub fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
