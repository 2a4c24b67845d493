//! Notification persistence
//!
//! The dispatch pipeline writes one completion notification per job; the
//! notification endpoints read and update them. Both go through the
//! [`NotificationStore`] trait so the server can run against Postgres or,
//! for development and tests, an in-memory map.

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use portal_common::types::{
    Notification, NotificationStatus, NotificationType, RecipientType,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{DatabaseConfig, StoreBackend};

pub use memory::InMemoryNotificationStore;
pub use postgres::PgNotificationStore;

/// Errors raised by a notification store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Notification {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Stored notification is invalid: {0}")]
    Corrupt(String),
}

/// Fields supplied when creating a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub recipient_id: String,
    pub recipient_type: RecipientType,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub summary: String,
    pub message: String,
    #[serde(default = "default_status")]
    pub status: NotificationStatus,
}

fn default_status() -> NotificationStatus {
    NotificationStatus::Unread
}

/// Optional filters for listing notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFilter {
    pub recipient_id: Option<String>,
    pub status: Option<NotificationStatus>,
    pub kind: Option<NotificationType>,
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        self.recipient_id
            .as_ref()
            .is_none_or(|id| *id == notification.recipient_id)
            && self.status.is_none_or(|s| s == notification.status)
            && self.kind.is_none_or(|k| k == notification.kind)
    }
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification, PersistenceError>;

    /// Newest first.
    async fn list(&self, filter: &NotificationFilter) -> Result<Vec<Notification>, PersistenceError>;

    async fn get(&self, id: Uuid) -> Result<Option<Notification>, PersistenceError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: NotificationStatus,
    ) -> Result<Notification, PersistenceError>;

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Open the store selected in `config`, running migrations for Postgres.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn NotificationStore>, PersistenceError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory notification store");
            Ok(Arc::new(InMemoryNotificationStore::new()))
        },
        StoreBackend::Postgres => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
                .connect(&config.url)
                .await?;
            tracing::info!("Database connection pool established");

            sqlx::migrate!("../../migrations").run(&pool).await?;
            tracing::info!("Database migrations completed");

            Ok(Arc::new(PgNotificationStore::new(pool)))
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_new_notification_defaults_to_unread() {
        let new: NewNotification = serde_json::from_value(json!({
            "recipientId": "u-1",
            "recipientType": "user",
            "type": "admin_message",
            "title": "Aviso",
            "summary": "Resumen",
            "message": "Mensaje"
        }))
        .unwrap();
        assert_eq!(new.status, NotificationStatus::Unread);
        assert_eq!(new.kind, NotificationType::AdminMessage);
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id: "admin".into(),
            recipient_type: RecipientType::Admin,
            kind: NotificationType::EmailSent,
            title: "t".into(),
            summary: "s".into(),
            message: "m".into(),
            status: NotificationStatus::Unread,
            created_at: now,
            updated_at: now,
        };

        assert!(NotificationFilter::default().matches(&notification));
        assert!(NotificationFilter {
            recipient_id: Some("admin".into()),
            status: Some(NotificationStatus::Unread),
            kind: Some(NotificationType::EmailSent),
        }
        .matches(&notification));
        assert!(!NotificationFilter {
            status: Some(NotificationStatus::Read),
            ..NotificationFilter::default()
        }
        .matches(&notification));
        assert!(!NotificationFilter {
            kind: Some(NotificationType::AdminMessage),
            ..NotificationFilter::default()
        }
        .matches(&notification));
    }
}
