//! Get command implementation.

use crate::core::config::Config;
use crate::engine::EngineKind;
use crate::machine::StateMachine;
use anyhow::{Context, Result};
use clap::Args;
use num_bigint::BigUint;

/// Print the decoded integer value of a key.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Key to read.
    pub key: String,
}

/// Run the get command.
pub fn run_get(args: GetArgs, config: &Config) -> Result<()> {
    let mut machine = StateMachine::open(&config.store.path, EngineKind::Noop)
        .with_context(|| format!("failed to open store at {}", config.store.path))?;

    // close() must run on every exit path from here on.
    let outcome = machine
        .store()
        .get(args.key.as_bytes())
        .map_err(anyhow::Error::from);
    let closed = machine.close();

    let value = outcome?;
    closed.context("failed to close state machine")?;

    // An absent key reads as integer zero.
    let decoded = value
        .map(|bytes| BigUint::from_bytes_be(&bytes))
        .unwrap_or_default();
    println!("{}", decoded);
    Ok(())
}
