//! Completion notification for finished bulk jobs

use std::sync::Arc;

use portal_common::types::{Notification, NotificationStatus, NotificationType, RecipientType};

use super::report::DispatchReport;
use crate::config::{NotificationCountPolicy, DEFAULT_ADMIN_RECIPIENT_ID};
use crate::store::{NewNotification, NotificationStore, PersistenceError};

const TITLE: &str = "Correos enviados en masa";

/// Records one administrator notification per finished job.
#[derive(Clone)]
pub struct CompletionNotifier {
    store: Arc<dyn NotificationStore>,
    policy: NotificationCountPolicy,
    recipient_id: String,
}

impl CompletionNotifier {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        policy: NotificationCountPolicy,
        recipient_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            policy,
            recipient_id: recipient_id.into(),
        }
    }

    /// Notifier with the default recipient and count policy.
    pub fn with_defaults(store: Arc<dyn NotificationStore>) -> Self {
        Self::new(store, NotificationCountPolicy::default(), DEFAULT_ADMIN_RECIPIENT_ID)
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    /// Count shown in the summary line.
    pub fn reported_count(&self, report: &DispatchReport) -> usize {
        match self.policy {
            NotificationCountPolicy::Attempted => report.total,
            NotificationCountPolicy::Delivered => report.delivered,
        }
    }

    pub fn build(&self, report: &DispatchReport) -> NewNotification {
        let count = self.reported_count(report);
        NewNotification {
            recipient_id: self.recipient_id.clone(),
            recipient_type: RecipientType::Admin,
            kind: NotificationType::EmailSent,
            title: TITLE.to_string(),
            summary: format!("Se han enviado {} correos electrónicos.", count),
            message: format!(
                "Se ha completado el envío en masa de correos electrónicos. \
                 {} de {} correos fueron enviados exitosamente.",
                report.delivered, report.total
            ),
            status: NotificationStatus::Unread,
        }
    }

    #[tracing::instrument(skip(self, report), fields(recipient = %self.recipient_id, total = report.total))]
    pub async fn notify(&self, report: &DispatchReport) -> Result<Notification, PersistenceError> {
        let notification = self.store.create(self.build(report)).await?;
        tracing::info!(notification_id = %notification.id, "Completion notification created");
        Ok(notification)
    }
}
