//! Email API routes
//!
//! - `POST /api/v1/email/send` - Validate and send one email

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::commands::SendEmailError;
use crate::features::FeatureState;

pub fn email_routes() -> Router<FeatureState> {
    Router::new().route("/send", post(send_email))
}

/// Send one email
///
/// # Response
///
/// - `200 OK` - `{ "message": "Email sent successfully", "attempts": 1 }`
/// - `400 Bad Request` - Invalid email payload
/// - `502 Bad Gateway` - The mail relay kept failing until retries ran out
async fn send_email(
    State(state): State<FeatureState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, EmailApiError> {
    let response = super::commands::send::handle(&state.dispatch, body).await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug)]
struct EmailApiError(SendEmailError);

impl From<SendEmailError> for EmailApiError {
    fn from(err: SendEmailError) -> Self {
        Self(err)
    }
}

impl IntoResponse for EmailApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SendEmailError::Validation(_) => StatusCode::BAD_REQUEST,
            SendEmailError::Delivery { .. } => {
                tracing::error!(error = %self.0, "Single email delivery failed");
                StatusCode::BAD_GATEWAY
            },
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
