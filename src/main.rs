//! Strata - unified CLI entrypoint.
//!
//! Usage:
//!   strata init [--data-dir DIR] [--force]
//!   strata apply "x=10" "x+=5"
//!   strata apply --stdin < messages.txt
//!   strata get x
//!   strata inspect [--raw]
//!
//! The configuration file (default `config/strata.toml`) selects the store
//! path and the engine variant; missing file means defaults.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use strata::cli::commands::{run_apply, run_get, run_init, run_inspect};
use strata::cli::{Cli, Commands};
use strata::config::{Config, ConfigOverrides};

fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/strata.toml"));

    let mut config = if config_path.exists() {
        Config::from_file(&config_path)
            .with_context(|| format!("failed to load config from {:?}", config_path))?
    } else {
        Config::default()
    };

    config.apply_overrides(&ConfigOverrides {
        log_level: cli.log_level,
        store_path: None,
        engine: None,
    });
    config.validate()?;

    init_tracing(&config.telemetry.log_level);

    match cli.command {
        Commands::Init(args) => run_init(args, &config),
        Commands::Apply(args) => run_apply(args, &config),
        Commands::Get(args) => run_get(args, &config),
        Commands::Inspect(args) => run_inspect(args, &config),
    }
}
