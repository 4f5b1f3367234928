//! CLI module - argument parsing and command dispatch

pub mod commands;
pub mod helpers;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::capa::CapaCommands;

#[derive(Parser, Debug)]
#[command(name = "occ", version, about = "Healthcare occurrence tracking")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Directory holding occurrence records
    #[arg(long, global = true, env = "OCC_STORE", default_value = ".occ")]
    pub store: PathBuf,

    /// Workflow configuration file (YAML)
    #[arg(long, global = true, env = "OCC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Person performing the operation
    #[arg(long, global = true, env = "OCC_ACTOR")]
    pub actor: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new occurrence
    New(commands::new::NewArgs),

    /// List occurrences
    List(commands::list::ListArgs),

    /// Show an occurrence
    Show(commands::show::ShowArgs),

    /// Assign or revise the triage classification
    Triage(commands::triage::TriageArgs),

    /// Acknowledge a sentinel event
    AckSentinel(commands::triage::AckArgs),

    /// Move an occurrence to another status
    Transition(commands::transition::TransitionArgs),

    /// Attach or replace the outcome
    Outcome(commands::outcome::OutcomeArgs),

    /// Manage corrective and preventive actions
    #[command(subcommand)]
    Capa(CapaCommands),

    /// Forward an occurrence to a physician
    Forward(commands::forward::ForwardArgs),

    /// Record a person who was informed about the occurrence
    Inform(commands::forward::InformArgs),

    /// Show the audit trail and triage history
    Log(commands::log::LogArgs),

    /// Validate stored occurrence files
    Validate(commands::validate::ValidateArgs),
}
