//! API request and response types
//!
//! Job and notification bodies come from `portal_common::types`; this module
//! only holds the envelopes the server wraps them in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use portal_common::types::{
    BulkDispatchResult, BulkEmailPayload, EmailItem, Notification, NotificationStatus,
    SendBulkResponse,
};

/// Standard API response wrapper used by the notification endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Body of `POST /api/v1/email/send` on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub message: String,
    pub attempts: u32,
}

/// Body of `DELETE /api/v1/notifications/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedNotification {
    pub id: uuid::Uuid,
    pub message: String,
}

/// Pulls a human message out of an error body.
///
/// The bulk and email endpoints answer `{"error": "..."}`; the CRUD endpoints
/// answer `{"success": false, "error": {"code", "message"}}`.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    match &value["error"] {
        Value::String(message) => message.clone(),
        Value::Object(detail) => detail
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
        _ => body.trim().to_string(),
    }
}
