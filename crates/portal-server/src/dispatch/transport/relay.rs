//! HTTP mail relay transport
//!
//! Each email becomes one `POST` of a JSON message to the configured relay
//! URL. A 2xx response means the relay accepted the message; anything else is
//! reported as [`TransportError::Rejected`] with the relay's status and body.

use std::time::Duration;

use async_trait::async_trait;
use portal_common::types::{Attachment, EmailItem};
use reqwest::Client;
use serde::Serialize;

use super::EmailTransport;
use crate::config::MailConfig;
use crate::dispatch::error::TransportError;

/// Longest relay error body kept in a [`TransportError`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Message shape accepted by the relay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "no_attachments")]
    attachments: &'a [Attachment],
}

fn no_attachments(list: &&[Attachment]) -> bool {
    list.is_empty()
}

/// Sends email through an HTTP relay using a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct RelayTransport {
    client: Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

impl RelayTransport {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
            from: from.into(),
        })
    }

    pub fn from_config(config: &MailConfig) -> Result<Self, TransportError> {
        let url = config
            .relay_url
            .clone()
            .ok_or_else(|| TransportError::Other("MAIL_RELAY_URL is not set".to_string()))?;

        Self::new(
            url,
            config.relay_api_key.clone(),
            config.from_header(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl EmailTransport for RelayTransport {
    async fn send(&self, item: &EmailItem) -> Result<(), TransportError> {
        let message = RelayMessage {
            from: &self.from,
            to: &item.to,
            subject: &item.subject,
            text: item.body_text.as_deref(),
            html: item.body_html.as_deref(),
            attachments: item.attachments.as_deref().unwrap_or(&[]),
        };

        let mut request = self.client.post(&self.url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(to = %item.to, status = status.as_u16(), "Relay accepted message");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        })
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}
