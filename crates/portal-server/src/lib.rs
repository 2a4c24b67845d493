//! Portal Server Library
//!
//! HTTP backend for the membership portal's bulk email dispatch.
//!
//! # Overview
//!
//! - **Dispatch pipeline** ([`dispatch`]): gzip job decoding, validation,
//!   batch scheduling, retrying delivery and the completion notification
//! - **Notification store** ([`store`]): Postgres via SQLx, or in memory
//! - **API** ([`api`], [`features`]): axum routes under `/api/v1`
//! - **Configuration** ([`config`]): environment-based with validation
//! - **Middleware** ([`middleware`]): CORS, request tracing, panic recovery
//!
//! # Example
//!
//! ```no_run
//! use portal_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let state = api::build_state(&config).await?;
//!     api::serve(&config, state, std::future::pending()).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod features;
pub mod middleware;
pub mod store;

pub use error::{ServerError, ServerResult};
