//! # twx CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use twx_cli::inspect::{
    run_actions, run_reason, run_transitions, ActionsArgs, ReasonArgs, TransitionsArgs,
};
use twx_cli::validate::{run_validate, ValidateArgs};

/// twx: status workflow inspection for the work-exchange platform.
///
/// Validates the built-in opportunity and application workflows and answers
/// questions about transitions, action menus, and reason prompts.
#[derive(Parser, Debug)]
#[command(name = "twx", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the built-in workflows for authoring defects.
    Validate(ValidateArgs),

    /// Print a workflow's transition table.
    Transitions(TransitionsArgs),

    /// List the actions a role is offered from a status.
    Actions(ActionsArgs),

    /// Show the reason prompt for a transition.
    Reason(ReasonArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Transitions(args) => run_transitions(&args),
        Commands::Actions(args) => run_actions(&args),
        Commands::Reason(args) => run_reason(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
