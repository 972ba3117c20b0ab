//! Inspect command implementation.

use crate::core::config::Config;
use crate::engine::EngineKind;
use crate::machine::StateMachine;
use anyhow::{Context, Result};
use clap::Args;
use num_bigint::BigUint;

/// Dump store revision and live keys.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Print raw value bytes as hex instead of decoded integers.
    #[arg(long)]
    pub raw: bool,
}

/// Run the inspect command.
pub fn run_inspect(args: InspectArgs, config: &Config) -> Result<()> {
    let mut machine = StateMachine::open(&config.store.path, EngineKind::Noop)
        .with_context(|| format!("failed to open store at {}", config.store.path))?;

    // close() must run on every exit path from here on; nothing below
    // except the dump itself can fail.
    let store = machine.store();
    println!("store:    {}", store.dir().display());
    println!("revision: {}", store.revision());
    println!("keys:     {}", store.len());
    for (key, value) in store.iter() {
        let key = String::from_utf8_lossy(key);
        if args.raw {
            let hex: String = value.iter().map(|b| format!("{:02x}", b)).collect();
            println!("  {} = 0x{}", key, hex);
        } else {
            println!("  {} = {}", key, BigUint::from_bytes_be(value));
        }
    }

    machine.close().context("failed to close state machine")?;
    Ok(())
}
