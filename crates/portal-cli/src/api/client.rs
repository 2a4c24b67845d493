//! HTTP API client for the portal server

use crate::api::{endpoints, types::*};
use crate::error::{CliError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via PORTAL_API_TIMEOUT_SECS.
/// A bulk job is answered only after every batch has gone out, so this is
/// long enough for several batch pauses.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 1800;

/// Default server URL when not specified via environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// API client for the portal server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let timeout_secs = std::env::var("PORTAL_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("PORTAL_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Submit an already gzip-compressed bulk job
    pub async fn send_bulk(&self, gzipped: Vec<u8>) -> Result<SendBulkResponse> {
        let url = endpoints::send_bulk_url(&self.base_url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(gzipped)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        decode(response).await
    }

    /// Send one email
    pub async fn send_email(&self, item: &EmailItem) -> Result<SendEmailResponse> {
        let url = endpoints::send_email_url(&self.base_url);

        let response = self
            .client
            .post(&url)
            .json(item)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        decode(response).await
    }

    /// List notifications, optionally filtered
    pub async fn list_notifications(
        &self,
        recipient_id: Option<&str>,
        status: Option<NotificationStatus>,
    ) -> Result<Vec<Notification>> {
        let url = endpoints::notifications_url(&self.base_url);

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(recipient_id) = recipient_id {
            query.push(("recipient_id", recipient_id.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let envelope: ApiResponse<Vec<Notification>> = decode(response).await?;
        Ok(envelope.data)
    }

    /// Change a notification's status
    pub async fn update_status(&self, id: Uuid, status: NotificationStatus) -> Result<Notification> {
        let url = endpoints::notification_url(&self.base_url, id);

        let response = self
            .client
            .put(&url)
            .json(&json!({ "status": status }))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let envelope: ApiResponse<Notification> = decode(response).await?;
        Ok(envelope.data)
    }

    /// Delete a notification
    pub async fn delete_notification(&self, id: Uuid) -> Result<DeletedNotification> {
        let url = endpoints::notification_url(&self.base_url, id);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let envelope: ApiResponse<DeletedNotification> = decode(response).await?;
        Ok(envelope.data)
    }

    fn transport_error(&self, err: reqwest::Error) -> CliError {
        if err.is_connect() {
            CliError::Unreachable(self.base_url.clone())
        } else {
            CliError::Http(err)
        }
    }
}

/// Map non-2xx responses to [`CliError::Api`], otherwise parse the body.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!(status = status.as_u16(), body = %body, "Request failed");
        return Err(CliError::api(status.as_u16(), error_message(&body)));
    }

    Ok(serde_json::from_str(&body)?)
}
