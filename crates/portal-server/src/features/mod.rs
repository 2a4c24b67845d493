//! Feature modules implementing the portal API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes.
//!
//! # Features
//!
//! - **notifications**: bulk email dispatch and the notification records
//! - **email**: single email delivery through the retrying channel
//!
//! # Architecture
//!
//! - `commands/` - Write operations, one standalone `handle` function each
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions and error mapping

pub mod email;
pub mod notifications;

use std::sync::Arc;

use axum::Router;

use crate::dispatch::BulkDispatchService;
use crate::store::NotificationStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Bulk dispatch pipeline, also used for single sends
    pub dispatch: BulkDispatchService,
    pub store: Arc<dyn NotificationStore>,
}

/// Creates the API router with all feature routes mounted
///
/// - `/notifications` - Bulk dispatch and notification records
/// - `/email` - Single email delivery
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/notifications", notifications::notifications_routes().with_state(state.clone()))
        .nest("/email", email::email_routes().with_state(state))
}
