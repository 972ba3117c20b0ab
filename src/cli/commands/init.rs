//! Init command implementation.

use crate::core::config::Config;
use crate::engine::EngineKind;
use crate::machine::StateMachine;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Initialize a store directory.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Store directory. Defaults to the configured store path.
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Proceed even if the directory already exists.
    #[arg(long)]
    pub force: bool,
}

/// Run the init command.
pub fn run_init(args: InitArgs, config: &Config) -> Result<()> {
    let dir = args
        .data_dir
        .unwrap_or_else(|| PathBuf::from(&config.store.path));

    if dir.exists() && !args.force {
        anyhow::bail!(
            "store directory already exists: {} (use --force to initialize anyway)",
            dir.display()
        );
    }

    // Open once with the no-op engine to lay down the store files, then
    // release the lock.
    let mut machine = StateMachine::open(&dir, EngineKind::Noop)
        .with_context(|| format!("failed to initialize store at {}", dir.display()))?;
    machine
        .close()
        .context("failed to close freshly initialized store")?;

    println!("Initialized store directory: {}", dir.display());
    Ok(())
}
