//! Send a single email
//!
//! Same validation rules as a bulk item, except the bodies may be omitted.
//! Delivery goes through the retrying channel, so a transient relay failure
//! is retried before the request fails.

use serde::{Deserialize, Serialize};

use crate::dispatch::{BulkDispatchService, DispatchOutcome, TransportError, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub message: String,
    pub attempts: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum SendEmailError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Email could not be delivered after {attempts} attempts: {error}")]
    Delivery { attempts: u32, error: TransportError },
}

#[tracing::instrument(skip(service, body))]
pub async fn handle(
    service: &BulkDispatchService,
    body: serde_json::Value,
) -> Result<SendEmailResponse, SendEmailError> {
    match service.send_single(&body).await? {
        DispatchOutcome::Delivered { item, attempts } => {
            tracing::info!(recipient = %item.to, attempts, "Email sent");
            Ok(SendEmailResponse {
                message: "Email sent successfully".to_string(),
                attempts,
            })
        },
        DispatchOutcome::Failed {
            attempts, error, ..
        } => Err(SendEmailError::Delivery { attempts, error }),
    }
}
