//! Update notification status command

use std::sync::Arc;

use portal_common::types::{Notification, NotificationStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{NotificationStore, PersistenceError};

/// Request body for `PUT /notifications/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusBody {
    pub status: NotificationStatus,
}

#[derive(Debug, Clone)]
pub struct UpdateNotificationStatusCommand {
    pub id: Uuid,
    pub status: NotificationStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateNotificationStatusError {
    #[error("Notification {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for UpdateNotificationStatusError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other),
        }
    }
}

#[tracing::instrument(skip(store), fields(id = %command.id, status = %command.status))]
pub async fn handle(
    store: Arc<dyn NotificationStore>,
    command: UpdateNotificationStatusCommand,
) -> Result<Notification, UpdateNotificationStatusError> {
    let notification = store.update_status(command.id, command.status).await?;
    tracing::info!("Notification status updated");
    Ok(notification)
}
