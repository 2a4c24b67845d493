//! `portal notifications` command implementation

use crate::api::{ApiClient, Notification, NotificationStatus};
use crate::error::{CliError, Result};
use colored::Colorize;
use uuid::Uuid;

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim())
        .map_err(|_| CliError::invalid_argument(format!("'{}' is not a notification ID", id)))
}

fn parse_status(status: &str) -> Result<NotificationStatus> {
    status
        .trim()
        .parse()
        .map_err(|_| CliError::invalid_argument(format!("unknown status '{}'", status)))
}

/// List notifications
pub async fn list(
    server_url: String,
    recipient: Option<String>,
    status: Option<String>,
    format: String,
) -> Result<()> {
    let status = status.as_deref().map(parse_status).transpose()?;
    let client = ApiClient::new(server_url)?;

    let notifications = client
        .list_notifications(recipient.as_deref(), status)
        .await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&notifications)?),
        _ => display_table(&notifications),
    }

    Ok(())
}

/// Mark a notification as read
pub async fn mark_read(server_url: String, id: String) -> Result<()> {
    set_status(server_url, id, NotificationStatus::Read.as_str().to_string()).await
}

/// Set a notification's status
pub async fn set_status(server_url: String, id: String, status: String) -> Result<()> {
    let id = parse_id(&id)?;
    let status = parse_status(&status)?;
    let client = ApiClient::new(server_url)?;

    let notification = client.update_status(id, status).await?;

    println!(
        "{} {} is now {}",
        "✓".green(),
        notification.id,
        notification.status.as_str().cyan()
    );
    Ok(())
}

/// Delete a notification
pub async fn delete(server_url: String, id: String) -> Result<()> {
    let id = parse_id(&id)?;
    let client = ApiClient::new(server_url)?;

    let deleted = client.delete_notification(id).await?;

    println!("{} {}", "✓".green(), deleted.message);
    Ok(())
}

fn display_table(notifications: &[Notification]) {
    use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

    if notifications.is_empty() {
        println!("No notifications found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Created", "Recipient", "Type", "Status", "Summary"]);

    for n in notifications {
        table.add_row(vec![
            n.id.to_string(),
            n.created_at.format("%Y-%m-%d %H:%M").to_string(),
            n.recipient_id.clone(),
            n.kind.to_string(),
            n.status.to_string(),
            n.summary.clone(),
        ]);
    }

    println!("{}", table);
    println!("{} notification(s)", notifications.len());
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("read").unwrap(), NotificationStatus::Read);
        assert_eq!(parse_status("unasigned").unwrap(), NotificationStatus::Unassigned);
        assert!(parse_status("archived").is_err());
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("00000000-0000-0000-0000-000000000000").is_ok());
        let err = parse_id("42").unwrap_err();
        assert!(err.to_string().contains("'42' is not a notification ID"));
    }
}
