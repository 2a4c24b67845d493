//! Outbound email transports
//!
//! The dispatch pipeline only needs "send this item or tell me why not". Each
//! backend implements [`EmailTransport`]; the one in use is chosen from
//! [`MailConfig`] at startup and shared by every concurrent send.

pub mod log;
pub mod relay;

use std::sync::Arc;

use async_trait::async_trait;
use portal_common::types::EmailItem;

use super::error::TransportError;
use crate::config::{MailConfig, MailTransportKind};

pub use self::log::LogTransport;
pub use relay::RelayTransport;

/// A single-shot email sending primitive.
///
/// Implementations do not retry; retries belong to the channel.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, item: &EmailItem) -> Result<(), TransportError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Build the transport selected in `config`.
pub fn build_transport(config: &MailConfig) -> Result<Arc<dyn EmailTransport>, TransportError> {
    match config.transport {
        MailTransportKind::Relay => Ok(Arc::new(RelayTransport::from_config(config)?)),
        MailTransportKind::Log => Ok(Arc::new(LogTransport::new(config.from_header()))),
    }
}
