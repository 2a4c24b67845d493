//! Error types for the bulk dispatch pipeline
//!
//! [`IngestError`] and [`ValidationError`] abort a job before anything is
//! sent. [`TransportError`] is per item: it is retried by the channel and ends
//! up recorded in the item's outcome, never returned to the caller.

use thiserror::Error;

/// Failure while turning the request body into a JSON document
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Payload is not gzip compressed")]
    NotCompressed,

    #[error("Failed to decompress payload: {0}")]
    DecompressionFailed(String),

    #[error("Malformed JSON payload: {0}")]
    MalformedPayload(String),

    #[error("Payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Failed to read request body: {0}")]
    Stream(String),
}

/// First schema violation found in a decoded job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("At least one email is required")]
    EmptyJob,

    #[error("Field '{field}' is required")]
    MissingField { field: String },

    #[error("Field '{field}' must be a non-empty string")]
    EmptyField { field: String },

    #[error("Invalid email address in '{field}': {value}")]
    InvalidAddress { field: String, value: String },

    #[error("Unsupported encoding in '{field}': {value} (only base64 is accepted)")]
    UnsupportedEncoding { field: String, value: String },

    #[error("Invalid base64 content in '{field}'")]
    InvalidBase64 { field: String },

    #[error("Invalid payload shape: {0}")]
    Schema(String),
}

impl ValidationError {
    /// Path of the offending field, such as `emails[1].to`
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::EmptyField { field }
            | ValidationError::InvalidAddress { field, .. }
            | ValidationError::UnsupportedEncoding { field, .. }
            | ValidationError::InvalidBase64 { field } => Some(field),
            ValidationError::EmptyJob | ValidationError::Schema(_) => None,
        }
    }
}

/// Failure of a single send attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail relay request failed: {0}")]
    Request(String),

    #[error("Mail relay timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Errors that end a bulk job before dispatch starts, or a dispatch task
/// that died without producing a result
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Dispatch task failed: {0}")]
    Aborted(String),
}

impl From<tokio::task::JoinError> for DispatchError {
    fn from(err: tokio::task::JoinError) -> Self {
        DispatchError::Aborted(err.to_string())
    }
}
