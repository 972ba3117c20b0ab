//! No-op engine.

use crate::core::error::StrataResult;
use crate::machine::Message;
use crate::store::VersionedStore;

use super::Engine;

/// Engine that accepts every message and performs no mutation.
///
/// The safe default when no interpretation logic is configured, and the
/// variant used to exercise state machine plumbing in isolation.
#[derive(Debug, Default)]
pub struct NoopEngine;

impl NoopEngine {
    /// Create a new no-op engine.
    pub fn new() -> Self {
        Self
    }
}

impl Engine for NoopEngine {
    fn init(&mut self, _store: &mut VersionedStore) -> StrataResult<()> {
        Ok(())
    }

    fn apply(&mut self, _store: &mut VersionedStore, _message: &Message) -> StrataResult<()> {
        Ok(())
    }

    fn close(&mut self) -> StrataResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
