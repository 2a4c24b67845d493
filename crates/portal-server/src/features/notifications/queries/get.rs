//! Get notification query

use std::sync::Arc;

use portal_common::types::Notification;
use uuid::Uuid;

use crate::store::{NotificationStore, PersistenceError};

#[derive(Debug, Clone)]
pub struct GetNotificationQuery {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetNotificationError {
    #[error("Notification {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub async fn handle(
    store: Arc<dyn NotificationStore>,
    query: GetNotificationQuery,
) -> Result<Notification, GetNotificationError> {
    store
        .get(query.id)
        .await?
        .ok_or(GetNotificationError::NotFound(query.id))
}
