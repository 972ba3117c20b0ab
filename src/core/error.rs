//! Error types for the state machine core.
//!
//! Strata keeps a small closed taxonomy at the library boundary. Engine-level
//! parse and arithmetic failures never leave the store partially mutated
//! (validation precedes the single write), and store-level I/O failures
//! propagate unchanged through `apply`. Retry policy belongs to the caller.

use thiserror::Error;

/// Common Strata error conditions.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Backend open/read/write failure, a lock held by another opener, or an
    /// operation attempted on a closed store. Fatal to the current operation,
    /// not necessarily to the process.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Payload does not match the command grammar. The store is untouched;
    /// the caller may skip the message and continue.
    #[error("malformed command: {reason}")]
    MalformedCommand { reason: String },

    /// Division by zero or a subtraction below zero. The store is untouched.
    #[error("arithmetic error: {message}")]
    ArithmeticError { message: String },

    /// Operation attempted after `close()`. Programming error on the
    /// caller's side.
    #[error("state machine is closed")]
    MachineClosed,

    /// Both halves of a shutdown failed: engine close and store close.
    #[error("close failed: engine: {engine}; store: {store}")]
    CloseFailed { engine: String, store: String },
}

impl StrataError {
    /// Create a StoreUnavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a MalformedCommand error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCommand {
            reason: reason.into(),
        }
    }

    /// Create an ArithmeticError.
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::ArithmeticError {
            message: message.into(),
        }
    }

    /// Check if this error reflects a rejected command rather than a storage
    /// or lifecycle fault. Command errors leave the store untouched, so the
    /// delivery layer may log and move on to the next message.
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedCommand { .. } | Self::ArithmeticError { .. }
        )
    }
}

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        Self::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

/// Result type using StrataError.
pub type StrataResult<T> = Result<T, StrataError>;
