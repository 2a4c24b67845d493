//! Create notification command

use portal_common::types::Notification;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::{NewNotification, NotificationStore, PersistenceError};

const MAX_TITLE_LENGTH: usize = 200;

/// Command to create a notification for a user or administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationCommand {
    #[serde(flatten)]
    pub notification: NewNotification,
}

impl CreateNotificationCommand {
    pub fn validate(&self) -> Result<(), CreateNotificationError> {
        let n = &self.notification;
        for (field, value) in [
            ("recipientId", &n.recipient_id),
            ("title", &n.title),
            ("summary", &n.summary),
            ("message", &n.message),
        ] {
            if value.trim().is_empty() {
                return Err(CreateNotificationError::Required(field));
            }
        }
        if n.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(CreateNotificationError::TitleLength);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateNotificationError {
    #[error("Field '{0}' is required and cannot be empty")]
    Required(&'static str),
    #[error("Title must be at most 200 characters")]
    TitleLength,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[tracing::instrument(skip(store, command), fields(recipient = %command.notification.recipient_id))]
pub async fn handle(
    store: Arc<dyn NotificationStore>,
    command: CreateNotificationCommand,
) -> Result<Notification, CreateNotificationError> {
    command.validate()?;
    let notification = store.create(command.notification).await?;
    tracing::info!(notification_id = %notification.id, "Notification created");
    Ok(notification)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryNotificationStore;
    use portal_common::types::{NotificationStatus, NotificationType, RecipientType};

    fn command(title: &str) -> CreateNotificationCommand {
        CreateNotificationCommand {
            notification: NewNotification {
                recipient_id: "u-7".into(),
                recipient_type: RecipientType::User,
                kind: NotificationType::UpdateProfile,
                title: title.into(),
                summary: "Perfil actualizado".into(),
                message: "Tus datos han sido actualizados".into(),
                status: NotificationStatus::Unread,
            },
        }
    }

    #[test]
    fn test_validation() {
        assert!(command("Perfil").validate().is_ok());
        assert!(matches!(
            command("  ").validate(),
            Err(CreateNotificationError::Required("title"))
        ));
        assert!(matches!(
            command(&"x".repeat(201)).validate(),
            Err(CreateNotificationError::TitleLength)
        ));
    }

    #[tokio::test]
    async fn test_handle_persists() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let created = handle(store.clone(), command("Perfil")).await.unwrap();
        assert_eq!(created.recipient_id, "u-7");
        assert_eq!(store.len().await, 1);
    }
}
