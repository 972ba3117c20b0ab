//! Storage layer.

pub mod versioned;

pub use versioned::{StoreSnapshot, ValueRecord, VersionedStore};
