//! Portal Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the member portal.
//!
//! # Overview
//!
//! This crate provides functionality used by both the server and the CLI:
//!
//! - **Error Handling**: Common error and result types
//! - **Compression**: Gzip framing used by the bulk email wire format
//! - **Logging**: Centralized `tracing` subscriber setup
//! - **Types**: Wire types for bulk email jobs and notifications
//!
//! # Example
//!
//! ```no_run
//! use portal_common::compression::gzip_json;
//! use portal_common::types::{BulkEmailPayload, EmailItem};
//!
//! fn build_job() -> portal_common::Result<Vec<u8>> {
//!     let payload = BulkEmailPayload {
//!         emails: vec![EmailItem::new("socio@example.com", "Asamblea anual")],
//!     };
//!     gzip_json(&payload)
//! }
//! ```

pub mod compression;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PortalError, Result};
