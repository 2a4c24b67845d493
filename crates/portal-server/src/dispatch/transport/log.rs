//! Transport that only logs outgoing messages

use async_trait::async_trait;
use portal_common::types::EmailItem;

use super::EmailTransport;
use crate::dispatch::error::TransportError;

/// Logs each message at info level and reports success.
///
/// Meant for local development, where no relay is available.
#[derive(Debug, Clone)]
pub struct LogTransport {
    from: String,
}

impl LogTransport {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl EmailTransport for LogTransport {
    async fn send(&self, item: &EmailItem) -> Result<(), TransportError> {
        tracing::info!(
            from = %self.from,
            to = %item.to,
            subject = %item.subject,
            attachments = item.attachment_count(),
            "Email accepted by log transport"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
