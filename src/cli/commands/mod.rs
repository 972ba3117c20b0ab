//! CLI command implementations.

mod apply;
mod get;
mod init;
mod inspect;

pub use apply::{run_apply, ApplyArgs};
pub use get::{run_get, GetArgs};
pub use init::{run_init, InitArgs};
pub use inspect::{run_inspect, InspectArgs};
