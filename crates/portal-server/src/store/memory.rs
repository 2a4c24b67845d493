//! In-memory notification store for development and tests

use async_trait::async_trait;
use chrono::Utc;
use portal_common::types::{Notification, NotificationStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewNotification, NotificationFilter, NotificationStore, PersistenceError};

/// Keeps notifications in insertion order behind a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notifications.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, new: NewNotification) -> Result<Notification, PersistenceError> {
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id: new.recipient_id,
            recipient_type: new.recipient_type,
            kind: new.kind,
            title: new.title,
            summary: new.summary,
            message: new.message,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn list(&self, filter: &NotificationFilter) -> Result<Vec<Notification>, PersistenceError> {
        let guard = self.notifications.read().await;
        // Reverse first so equal timestamps still come out newest first.
        let mut matching: Vec<Notification> =
            guard.iter().rev().filter(|n| filter.matches(n)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Notification>, PersistenceError> {
        Ok(self
            .notifications
            .read()
            .await
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: NotificationStatus,
    ) -> Result<Notification, PersistenceError> {
        let mut guard = self.notifications.write().await;
        let notification = guard
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(PersistenceError::NotFound(id))?;
        notification.status = status;
        notification.updated_at = Utc::now();
        Ok(notification.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        let mut guard = self.notifications.write().await;
        let before = guard.len();
        guard.retain(|n| n.id != id);
        if guard.len() == before {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }
}
