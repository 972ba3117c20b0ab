//! Apply command implementation.

use crate::core::config::Config;
use crate::machine::{Message, StateMachine};
use anyhow::{Context, Result};
use clap::Args;
use std::io::BufRead;

/// Apply one or more messages to the state machine, in order.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Messages to apply, in order.
    pub messages: Vec<String>,

    /// Also read newline-delimited messages from standard input.
    #[arg(long)]
    pub stdin: bool,
}

/// Run the apply command.
pub fn run_apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let mut messages = args.messages;
    if args.stdin {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("failed to read message from stdin")?;
            if !line.is_empty() {
                messages.push(line);
            }
        }
    }
    if messages.is_empty() {
        anyhow::bail!("no messages to apply");
    }

    let kind = config.engine_kind()?;
    let mut machine = StateMachine::open(&config.store.path, kind)
        .with_context(|| format!("failed to open store at {}", config.store.path))?;

    // close() must run on every exit path from here on.
    let outcome = apply_all(&mut machine, &messages);
    let closed = machine.close();

    if let Err(ref err) = closed {
        tracing::error!(error = %err, "failed to close state machine");
    }
    outcome?;
    closed.context("failed to close state machine")?;
    Ok(())
}

/// Apply each message in order, skipping rejected commands but failing on
/// storage faults.
fn apply_all(machine: &mut StateMachine, messages: &[String]) -> Result<()> {
    let mut rejected = 0usize;

    for raw in messages {
        let message = Message::new(raw.clone().into_bytes());
        match machine.apply(&message) {
            Ok(()) => println!("applied [{}] {}", machine.logical_clock(), raw),
            Err(err) if err.is_command_error() => {
                eprintln!("rejected {:?}: {}", raw, err);
                rejected += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to apply {:?}", raw));
            }
        }
    }

    if rejected > 0 {
        anyhow::bail!("{} of {} messages rejected", rejected, messages.len());
    }
    Ok(())
}
