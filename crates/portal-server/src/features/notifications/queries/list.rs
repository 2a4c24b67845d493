//! List notifications query

use std::sync::Arc;

use portal_common::types::{Notification, NotificationStatus, NotificationType};
use serde::{Deserialize, Serialize};

use crate::store::{NotificationFilter, NotificationStore, PersistenceError};

/// `GET /notifications?recipient_id=admin&status=unread&type=email_sent`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListNotificationsQuery {
    pub recipient_id: Option<String>,
    pub status: Option<NotificationStatus>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
}

impl From<ListNotificationsQuery> for NotificationFilter {
    fn from(query: ListNotificationsQuery) -> Self {
        NotificationFilter {
            recipient_id: query.recipient_id.filter(|id| !id.trim().is_empty()),
            status: query.status,
            kind: query.kind,
        }
    }
}

pub async fn handle(
    store: Arc<dyn NotificationStore>,
    query: ListNotificationsQuery,
) -> Result<Vec<Notification>, PersistenceError> {
    store.list(&query.into()).await
}
