//! API client module
//!
//! HTTP client for the portal server's `/api/v1` surface.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::ApiClient;
pub use types::*;
