//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use std::path::PathBuf;
use strata::{EngineKind, Message, StateMachine};
use tempfile::TempDir;

/// Create a scratch directory for a store.
pub fn scratch_dir() -> TempDir {
    TempDir::new().expect("failed to create temp directory")
}

/// Store path inside a scratch directory.
pub fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("state")
}

/// Open a state machine over a scratch store.
pub fn open_machine(dir: &TempDir, kind: EngineKind) -> StateMachine {
    StateMachine::open(store_path(dir), kind).expect("failed to open state machine")
}

/// Build a message from an ASCII command string.
pub fn msg(payload: &str) -> Message {
    Message::new(payload.as_bytes().to_vec())
}

/// Decode a stored value as a u64 for assertions.
pub fn decode(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}
