//! HTTP application assembly
//!
//! Builds the shared state from configuration, mounts the feature routers
//! under `/api/v1` and runs the server until a shutdown signal arrives.

pub mod response;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::config::{Config, CorsConfig};
use crate::dispatch::transport::build_transport;
use crate::dispatch::{BulkDispatchService, TokioSleeper};
use crate::error::ServerResult;
use crate::features;
use crate::middleware;
use crate::store::{self, NotificationStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatch: BulkDispatchService,
    pub store: Arc<dyn NotificationStore>,
}

impl AppState {
    pub fn new(dispatch: BulkDispatchService) -> Self {
        let store = dispatch.store().clone();
        Self { dispatch, store }
    }
}

/// Connect the notification store, build the mail transport and wire the
/// dispatch pipeline.
pub async fn build_state(config: &Config) -> ServerResult<AppState> {
    let store = store::connect(&config.database).await?;
    let transport = build_transport(&config.mail)?;
    tracing::info!(transport = transport.name(), "Mail transport initialized");

    let dispatch = BulkDispatchService::from_config(
        &config.dispatch,
        transport,
        store,
        Arc::new(TokioSleeper),
    );
    Ok(AppState::new(dispatch))
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let feature_state = features::FeatureState {
        dispatch: state.dispatch.clone(),
        store: state.store.clone(),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
        .nest("/api/v1", features::router(feature_state))
        // Innermost first
        .layer(middleware::panic_layer())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn serve<F>(config: &Config, state: AppState, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Portal Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Liveness plus a notification store round trip
async fn health_check(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "store": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Notification store health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "store": "unavailable"
                })),
            )
                .into_response()
        },
    }
}
