//! State machine orchestration.
//!
//! The state machine is the unit a consensus layer replicates: it owns the
//! versioned store and the active engine, applies ordered messages through
//! the engine, and tracks a logical clock of accepted commands. Given the
//! same ordered message sequence, every instance reaches byte-identical
//! store state.
//!
//! Single-writer by contract: one logical sequence of `apply` calls, no
//! internal locking. The `&mut self` receivers make unsynchronized
//! concurrent use unrepresentable in safe Rust.

use crate::core::error::{StrataError, StrataResult};
use crate::engine::{Engine, EngineKind};
use crate::store::VersionedStore;
use bytes::Bytes;
use std::path::Path;

/// An opaque, externally-supplied command payload.
///
/// Only the engine interprets the bytes. Ordering and deduplication are the
/// delivery layer's responsibility; a message is consumed exactly once by
/// [`StateMachine::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    payload: Bytes,
}

impl Message {
    /// Create a message from a raw payload.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl From<&str> for Message {
    fn from(payload: &str) -> Self {
        Self::new(payload.as_bytes().to_vec())
    }
}

/// Deterministic state machine over a versioned store and a pluggable
/// engine.
///
/// Created once per store path; the store and engine handles are exclusively
/// owned for the machine's lifetime. States: open → closed (terminal).
pub struct StateMachine {
    /// Count of accepted commands since this machine was opened.
    logical_clock: u64,

    /// The authoritative store, bound to the engine for the machine's
    /// lifetime.
    store: VersionedStore,

    /// The active engine variant.
    engine: Box<dyn Engine>,

    /// Latched by `close()`; terminal.
    closed: bool,
}

impl StateMachine {
    /// Open a state machine over the store at `path` with the given engine
    /// variant.
    ///
    /// Runs the engine's one-time `init` against the freshly opened store.
    /// If init fails, the engine and store are released before the error is
    /// returned, so no lock is left behind.
    pub fn open(path: impl AsRef<Path>, kind: EngineKind) -> StrataResult<StateMachine> {
        let mut store = VersionedStore::open(path)?;
        let mut engine = kind.build();

        if let Err(err) = engine.init(&mut store) {
            let _ = engine.close();
            let _ = store.close();
            return Err(err);
        }

        tracing::info!(
            engine = engine.name(),
            revision = store.revision(),
            "state machine opened"
        );

        Ok(Self {
            logical_clock: 0,
            store,
            engine,
            closed: false,
        })
    }

    /// Apply one message.
    ///
    /// Delegates interpretation to the engine. On success the logical clock
    /// advances by exactly one — a no-op command still consumes a tick,
    /// preserving ordering semantics for a replication layer. On failure the
    /// clock is unchanged and the engine's error propagates unmodified; the
    /// engine orders its checks before its single write, so there is nothing
    /// to roll back here.
    pub fn apply(&mut self, message: &Message) -> StrataResult<()> {
        if self.closed {
            return Err(StrataError::MachineClosed);
        }

        self.engine.apply(&mut self.store, message)?;
        self.logical_clock += 1;
        Ok(())
    }

    /// Count of accepted commands since open.
    pub fn logical_clock(&self) -> u64 {
        self.logical_clock
    }

    /// Name of the active engine variant.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Read access to the owned store.
    pub fn store(&self) -> &VersionedStore {
        &self.store
    }

    /// Close the machine: engine first, then store, so an engine's
    /// flush-on-close observes a still-open store.
    ///
    /// Store close is attempted even when engine close fails; when both
    /// fail, both failures are reported in one error. A second `close()` is
    /// a safe no-op.
    pub fn close(&mut self) -> StrataResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let engine_err = self.engine.close().err();
        let store_err = self.store.close().err();

        match (engine_err, store_err) {
            (None, None) => {
                tracing::info!(clock = self.logical_clock, "state machine closed");
                Ok(())
            }
            (Some(err), None) => Err(err),
            (None, Some(err)) => Err(err),
            (Some(engine), Some(store)) => Err(StrataError::CloseFailed {
                engine: engine.to_string(),
                store: store.to_string(),
            }),
        }
    }

    /// Whether `close()` has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
