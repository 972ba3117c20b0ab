//! Execution engines.
//!
//! An engine is the interpretation strategy for message payloads: it parses
//! a command out of the opaque bytes and mutates the bound store. The state
//! machine owns both the store and the engine and passes the store handle
//! into each call, so the binding established at construction is the only
//! one an engine ever sees.
//!
//! Variants are selected explicitly through [`EngineKind`]; there is no
//! runtime type discovery.

pub mod arith;
pub mod noop;

pub use arith::{ArithmeticEngine, Command, Operator};
pub use noop::NoopEngine;

use crate::core::error::StrataResult;
use crate::machine::Message;
use crate::store::VersionedStore;

/// Interpretation strategy for message payloads.
///
/// Lifecycle: `init` is called exactly once, before any `apply`; `close` is
/// called exactly once at shutdown and must tolerate a partially failed
/// `init`. Implementations must not retain a message payload beyond the
/// `apply` call, and must be deterministic: for a fixed store state and a
/// fixed message, `apply` produces the same resulting store state on every
/// process, platform and repetition.
pub trait Engine {
    /// Variant-specific warm-up against the bound store.
    fn init(&mut self, store: &mut VersionedStore) -> StrataResult<()>;

    /// Interpret the message and mutate the bound store.
    fn apply(&mut self, store: &mut VersionedStore, message: &Message) -> StrataResult<()>;

    /// Release engine-local resources.
    fn close(&mut self) -> StrataResult<()>;

    /// Short variant name, for logs and inspection output.
    fn name(&self) -> &'static str;
}

/// Engine variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Accept everything, mutate nothing.
    Noop,
    /// Interpret `key<op>value` arithmetic commands.
    Arithmetic,
}

impl EngineKind {
    /// Construct the engine for this variant.
    pub fn build(self) -> Box<dyn Engine> {
        match self {
            Self::Noop => Box::new(NoopEngine::new()),
            Self::Arithmetic => Box::new(ArithmeticEngine::new()),
        }
    }

    /// Configuration name of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Arithmetic => "arithmetic",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
