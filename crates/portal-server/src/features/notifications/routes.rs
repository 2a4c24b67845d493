//! Notification API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/notifications/send-bulk` - Dispatch a gzip-compressed bulk email job
//! - `POST /api/v1/notifications` - Create a notification
//! - `GET /api/v1/notifications` - List notifications, newest first
//! - `GET /api/v1/notifications/:id` - Get a single notification
//! - `PUT /api/v1/notifications/:id` - Update a notification's status
//! - `DELETE /api/v1/notifications/:id` - Delete a notification
//!
//! The bulk endpoint answers errors with a flat `{ "error": "..." }` body;
//! the CRUD endpoints use the standard [`ApiResponse`] / [`ErrorResponse`]
//! envelopes.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::{
    commands::{
        CreateNotificationCommand, CreateNotificationError, DeleteNotificationCommand,
        DeleteNotificationError, UpdateNotificationStatusCommand, UpdateNotificationStatusError,
        UpdateStatusBody,
    },
    queries::{GetNotificationError, GetNotificationQuery, ListNotificationsQuery},
};
use crate::api::response::{ApiResponse, ErrorResponse};
use crate::dispatch::{DispatchError, IngestError};
use crate::features::FeatureState;
use crate::store::PersistenceError;

// ============================================================================
// Router Configuration
// ============================================================================

pub fn notifications_routes() -> Router<FeatureState> {
    Router::new()
        .route("/send-bulk", post(send_bulk))
        .route("/", post(create_notification).get(list_notifications))
        .route(
            "/:id",
            get(get_notification)
                .put(update_notification)
                .delete(delete_notification),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Dispatch a bulk email job
///
/// # Endpoint
///
/// `POST /api/v1/notifications/send-bulk`
///
/// The body is the raw gzip-compressed JSON document, typically sent as
/// `application/octet-stream`. The request completes once every batch has
/// been sent and the completion notification is recorded.
///
/// # Response
///
/// - `200 OK` - `{ "message": ..., "result": { "success": bool, "message": ... } }`
/// - `400 Bad Request` - Body is not gzip, cannot be decoded, or fails validation
/// - `413 Payload Too Large` - Body exceeds the configured limits
#[tracing::instrument(skip(state, body))]
async fn send_bulk(
    State(state): State<FeatureState>,
    body: Body,
) -> Result<Response, NotificationApiError> {
    let response =
        super::commands::send_bulk::handle(&state.dispatch, body.into_data_stream()).await?;

    tracing::info!(success = response.result.success, "Bulk dispatch completed via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Create a notification
///
/// # Endpoint
///
/// `POST /api/v1/notifications`
///
/// # Request Body
///
/// ```json
/// {
///   "recipientId": "admin",
///   "recipientType": "admin",
///   "type": "admin_message",
///   "title": "Aviso",
///   "summary": "Resumen",
///   "message": "Mensaje completo"
/// }
/// ```
#[tracing::instrument(skip(state, command))]
async fn create_notification(
    State(state): State<FeatureState>,
    Json(command): Json<CreateNotificationCommand>,
) -> Result<Response, NotificationApiError> {
    let notification = super::commands::create::handle(state.store, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(notification))).into_response())
}

/// `PUT /api/v1/notifications/:id` with body `{ "status": "read" }`
#[tracing::instrument(skip(state, body), fields(id = %id))]
async fn update_notification(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Response, NotificationApiError> {
    let command = UpdateNotificationStatusCommand {
        id,
        status: body.status,
    };
    let notification = super::commands::update_status::handle(state.store, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(notification))).into_response())
}

#[tracing::instrument(skip(state), fields(id = %id))]
async fn delete_notification(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, NotificationApiError> {
    let response =
        super::commands::delete::handle(state.store, DeleteNotificationCommand { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state), fields(id = %id))]
async fn get_notification(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, NotificationApiError> {
    let notification =
        super::queries::get::handle(state.store, GetNotificationQuery { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(notification))).into_response())
}

/// `GET /api/v1/notifications?recipient_id=admin&status=unread`
#[tracing::instrument(skip(state, query), fields(recipient = ?query.recipient_id, status = ?query.status))]
async fn list_notifications(
    State(state): State<FeatureState>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Response, NotificationApiError> {
    let notifications = super::queries::list::handle(state.store, query)
        .await
        .map_err(NotificationApiError::List)?;

    tracing::debug!(count = notifications.len(), "Notifications listed via API");

    let meta = json!({ "total": notifications.len() });
    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(notifications, meta))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum NotificationApiError {
    Dispatch(DispatchError),
    Create(CreateNotificationError),
    Update(UpdateNotificationStatusError),
    Delete(DeleteNotificationError),
    Get(GetNotificationError),
    List(PersistenceError),
}

impl From<DispatchError> for NotificationApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl From<CreateNotificationError> for NotificationApiError {
    fn from(err: CreateNotificationError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateNotificationStatusError> for NotificationApiError {
    fn from(err: UpdateNotificationStatusError) -> Self {
        Self::Update(err)
    }
}

impl From<DeleteNotificationError> for NotificationApiError {
    fn from(err: DeleteNotificationError) -> Self {
        Self::Delete(err)
    }
}

impl From<GetNotificationError> for NotificationApiError {
    fn from(err: GetNotificationError) -> Self {
        Self::Get(err)
    }
}

fn not_found(id: Uuid) -> Response {
    let error = ErrorResponse::new("NOT_FOUND", format!("Notification '{}' not found", id));
    (StatusCode::NOT_FOUND, Json(error)).into_response()
}

fn database_error(err: &PersistenceError) -> Response {
    tracing::error!(error = %err, "Notification store error");
    let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
}

impl IntoResponse for NotificationApiError {
    fn into_response(self) -> Response {
        match self {
            NotificationApiError::Dispatch(DispatchError::Ingest(
                err @ IngestError::PayloadTooLarge { .. },
            )) => (StatusCode::PAYLOAD_TOO_LARGE, Json(json!({ "error": err.to_string() })))
                .into_response(),
            NotificationApiError::Dispatch(err @ DispatchError::Aborted(_)) => {
                tracing::error!(error = %err, "Bulk dispatch task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            },
            NotificationApiError::Dispatch(err) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
            },

            NotificationApiError::Create(CreateNotificationError::Persistence(err))
            | NotificationApiError::Update(UpdateNotificationStatusError::Persistence(err))
            | NotificationApiError::Delete(DeleteNotificationError::Persistence(err))
            | NotificationApiError::Get(GetNotificationError::Persistence(err))
            | NotificationApiError::List(err) => database_error(&err),

            NotificationApiError::Create(err) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", err.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },

            NotificationApiError::Update(UpdateNotificationStatusError::NotFound(id))
            | NotificationApiError::Delete(DeleteNotificationError::NotFound(id))
            | NotificationApiError::Get(GetNotificationError::NotFound(id)) => not_found(id),
        }
    }
}
