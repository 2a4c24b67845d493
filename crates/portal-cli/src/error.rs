//! Error types for the portal CLI
//!
//! Every variant renders as a user-facing message with a hint on how to fix it.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The server answered with an error status
    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The server could not be reached at all
    #[error("Server unreachable at {0}. Ensure the portal server is running (check with 'portal status').")]
    Unreachable(String),

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Job file parsed but is not a usable bulk job
    #[error("Invalid job file: {0}")]
    InvalidJob(String),

    /// Argument failed local validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Bulk job ran but the completion notification was not stored
    #[error("Job incomplete: {0}")]
    Incomplete(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check the server URL.")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}. Check the file syntax.")]
    JsonParse(#[from] serde_json::Error),

    /// Compression or other shared-library failure
    #[error(transparent)]
    Common(#[from] portal_common::PortalError),
}

impl CliError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_job(msg: impl Into<String>) -> Self {
        Self::InvalidJob(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
