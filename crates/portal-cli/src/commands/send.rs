//! `portal send` command implementation

use crate::api::{ApiClient, EmailItem};
use crate::error::{CliError, Result};
use colored::Colorize;

/// Build the request body. Bodies that were not given are left out.
pub fn build_item(
    to: &str,
    subject: &str,
    text: Option<String>,
    html: Option<String>,
) -> Result<EmailItem> {
    if to.trim().is_empty() {
        return Err(CliError::invalid_argument("--to must not be empty"));
    }

    Ok(EmailItem {
        body_text: text,
        body_html: html,
        ..EmailItem::new(to.trim(), subject)
    })
}

/// Send a single email
pub async fn run(
    server_url: String,
    to: String,
    subject: String,
    text: Option<String>,
    html: Option<String>,
) -> Result<()> {
    let item = build_item(&to, &subject, text, html)?;
    let client = ApiClient::new(server_url)?;

    let response = client.send_email(&item).await?;

    println!(
        "{} {} ({} attempt{})",
        "✓".green(),
        response.message,
        response.attempts,
        if response.attempts == 1 { "" } else { "s" }
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_item_omits_missing_bodies() {
        let item = build_item(" socio@example.com ", "Hola", Some("texto".into()), None).unwrap();
        assert_eq!(item.to, "socio@example.com");
        assert_eq!(item.body_text.as_deref(), Some("texto"));
        assert!(item.body_html.is_none());

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("bodyHtml").is_none());
    }

    #[test]
    fn test_build_item_requires_recipient() {
        assert!(build_item("  ", "Hola", None, None).is_err());
    }
}
