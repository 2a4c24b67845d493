//! Delete notification command

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{NotificationStore, PersistenceError};

#[derive(Debug, Clone)]
pub struct DeleteNotificationCommand {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteNotificationResponse {
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteNotificationError {
    #[error("Notification {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for DeleteNotificationError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other),
        }
    }
}

#[tracing::instrument(skip(store), fields(id = %command.id))]
pub async fn handle(
    store: Arc<dyn NotificationStore>,
    command: DeleteNotificationCommand,
) -> Result<DeleteNotificationResponse, DeleteNotificationError> {
    store.delete(command.id).await?;
    tracing::info!("Notification deleted");
    Ok(DeleteNotificationResponse {
        id: command.id,
        message: "Notification deleted successfully".to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryNotificationStore;

    #[tokio::test]
    async fn test_missing_notification_is_not_found() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let id = Uuid::new_v4();
        let err = handle(store, DeleteNotificationCommand { id }).await.unwrap_err();
        assert!(matches!(err, DeleteNotificationError::NotFound(missing) if missing == id));
    }
}
