//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod notifications;
pub mod send;
pub mod send_bulk;
pub mod status;
