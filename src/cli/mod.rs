//! Command-line interface.
//!
//! Unified CLI for Strata operations.

pub mod commands;

use clap::{Parser, Subcommand};

/// Strata - deterministic state machine over a versioned key-value store.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a store directory.
    Init(commands::InitArgs),
    /// Apply one or more messages to the state machine.
    Apply(commands::ApplyArgs),
    /// Print the decoded integer value of a key.
    Get(commands::GetArgs),
    /// Dump store revision and live keys.
    Inspect(commands::InspectArgs),
}
