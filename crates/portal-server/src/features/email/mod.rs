//! Single email feature module

pub mod commands;
pub mod routes;

pub use routes::email_routes;
