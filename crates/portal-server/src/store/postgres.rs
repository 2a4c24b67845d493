//! Postgres-backed notification store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_common::types::{Notification, NotificationStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewNotification, NotificationFilter, NotificationStore, PersistenceError};

const COLUMNS: &str = "id, recipient_id, recipient_type, type, title, summary, message, \
                       status, created_at, updated_at";

/// Raw `notifications` row; enum columns are stored as text.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_id: String,
    recipient_type: String,
    #[sqlx(rename = "type")]
    kind: String,
    title: String,
    summary: String,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = PersistenceError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let corrupt = |e: portal_common::PortalError| PersistenceError::Corrupt(e.to_string());
        Ok(Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            recipient_type: row.recipient_type.parse().map_err(corrupt)?,
            kind: row.kind.parse().map_err(corrupt)?,
            title: row.title,
            summary: row.summary,
            message: row.message,
            status: row.status.parse().map_err(corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, new: NewNotification) -> Result<Notification, PersistenceError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            INSERT INTO notifications
                (id, recipient_id, recipient_type, type, title, summary, message, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.recipient_id)
        .bind(new.recipient_type.as_str())
        .bind(new.kind.as_str())
        .bind(&new.title)
        .bind(&new.summary)
        .bind(&new.message)
        .bind(new.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list(&self, filter: &NotificationFilter) -> Result<Vec<Notification>, PersistenceError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM notifications
            WHERE ($1::text IS NULL OR recipient_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR type = $3)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.recipient_id.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Notification>, PersistenceError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Notification::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: NotificationStatus,
    ) -> Result<Notification, PersistenceError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            UPDATE notifications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(PersistenceError::NotFound(id))?;

        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use portal_common::types::{NotificationType, RecipientType};

    fn row(status: &str) -> NotificationRow {
        let now = Utc::now();
        NotificationRow {
            id: Uuid::new_v4(),
            recipient_id: "admin".into(),
            recipient_type: "admin".into(),
            kind: "email_sent".into(),
            title: "t".into(),
            summary: "s".into(),
            message: "m".into(),
            status: status.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_conversion() {
        let notification = Notification::try_from(row("unread")).unwrap();
        assert_eq!(notification.recipient_type, RecipientType::Admin);
        assert_eq!(notification.kind, NotificationType::EmailSent);
        assert_eq!(notification.status, NotificationStatus::Unread);
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let err = Notification::try_from(row("archived")).unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt(_)));
    }
}
