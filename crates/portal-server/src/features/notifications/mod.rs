//! Notifications feature module
//!
//! Bulk email dispatch plus the notification records it produces.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::notifications_routes;
