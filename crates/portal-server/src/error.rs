//! Server startup errors

use thiserror::Error;

use crate::dispatch::TransportError;
use crate::store::PersistenceError;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Failures while assembling or running the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification store unavailable: {0}")]
    Store(#[from] PersistenceError),

    #[error("Mail transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ServerError::from(TransportError::Other("MAIL_RELAY_URL is not set".into()));
        assert_eq!(
            err.to_string(),
            "Mail transport setup failed: Transport error: MAIL_RELAY_URL is not set"
        );

        let err = ServerError::Config("PORTAL_PORT must be greater than 0".into());
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
