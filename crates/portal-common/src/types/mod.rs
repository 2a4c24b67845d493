//! Wire types shared by the portal server and CLI
//!
//! Field names follow the portal's JSON conventions (`camelCase`), so these
//! structs can be serialized straight into request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Bulk Email Types
// ============================================================================

/// A file attached to an outgoing email.
///
/// `content` is base64 text and `encoding` is always `"base64"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub content: String,
    pub encoding: String,
    pub content_type: String,
}

/// Member details that travel alongside an email item.
///
/// On the wire these keys sit at the top level of the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
}

impl ItemMetadata {
    pub fn is_empty(&self) -> bool {
        self.dni.is_none() && self.member_number.is_none() && self.nombre.is_none()
    }
}

/// One email to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailItem {
    pub to: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(flatten)]
    pub metadata: ItemMetadata,
}

impl EmailItem {
    /// Item with empty text and HTML bodies and no attachments.
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body_text: Some(String::new()),
            body_html: Some(String::new()),
            attachments: None,
            metadata: ItemMetadata::default(),
        }
    }

    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body_text = Some(body.into());
        self
    }

    pub fn with_html(mut self, body: impl Into<String>) -> Self {
        self.body_html = Some(body.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.as_ref().map_or(0, Vec::len)
    }
}

/// Decompressed body of `POST /notifications/send-bulk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEmailPayload {
    pub emails: Vec<EmailItem>,
}

/// Outcome of a whole bulk job as reported to the caller.
///
/// `success` is false when the completion notification could not be stored,
/// even though every email was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDispatchResult {
    pub success: bool,
    pub message: String,
}

/// HTTP body returned by the bulk endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendBulkResponse {
    pub message: String,
    pub result: BulkDispatchResult,
}

// ============================================================================
// Notification Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    UserRequest,
    AdminMessage,
    UpdateProfile,
    #[serde(rename = "acept_user")]
    AcceptUser,
    EmailSent,
}

/// Lifecycle status shared by notifications and member requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Unread,
    Read,
    Approved,
    Rejected,
    Active,
    #[serde(rename = "unasigned")]
    Unassigned,
}

macro_rules! str_enum {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::PortalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    other => Err(crate::PortalError::InvalidValue {
                        field: stringify!($ty).to_string(),
                        reason: format!("unknown value '{}'", other),
                    }),
                }
            }
        }
    };
}

str_enum!(RecipientType {
    User => "user",
    Admin => "admin",
});

str_enum!(NotificationType {
    UserRequest => "user_request",
    AdminMessage => "admin_message",
    UpdateProfile => "update_profile",
    AcceptUser => "acept_user",
    EmailSent => "email_sent",
});

str_enum!(NotificationStatus {
    Pending => "pending",
    Unread => "unread",
    Read => "read",
    Approved => "approved",
    Rejected => "rejected",
    Active => "active",
    Unassigned => "unasigned",
});

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: String,
    pub recipient_type: RecipientType,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub summary: String,
    pub message: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_item_wire_shape() {
        let item: EmailItem = serde_json::from_value(json!({
            "to": "socio@example.com",
            "subject": "Cuota",
            "bodyText": "Hola",
            "bodyHtml": "<p>Hola</p>",
            "dni": "12345678Z",
            "memberNumber": "0042"
        }))
        .unwrap();

        assert_eq!(item.body_text.as_deref(), Some("Hola"));
        assert_eq!(item.metadata.dni.as_deref(), Some("12345678Z"));
        assert_eq!(item.metadata.member_number.as_deref(), Some("0042"));
        assert!(item.metadata.nombre.is_none());

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["memberNumber"], "0042");
        assert!(value.get("metadata").is_none());
        assert!(value.get("attachments").is_none());
    }

    #[test]
    fn test_builder_attachments() {
        let item = EmailItem::new("a@b.co", "x").with_attachment(Attachment {
            filename: "acta.pdf".into(),
            content: "QUJD".into(),
            encoding: "base64".into(),
            content_type: "application/pdf".into(),
        });
        assert_eq!(item.attachment_count(), 1);
        assert!(item.metadata.is_empty());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(NotificationStatus::Unassigned).unwrap(),
            json!("unasigned")
        );
        assert_eq!(
            serde_json::to_value(NotificationType::EmailSent).unwrap(),
            json!("email_sent")
        );
        assert_eq!("read".parse::<NotificationStatus>().unwrap(), NotificationStatus::Read);
        assert_eq!("acept_user".parse::<NotificationType>().unwrap(), NotificationType::AcceptUser);
        assert!("archived".parse::<NotificationStatus>().is_err());
        assert_eq!(RecipientType::Admin.to_string(), "admin");
    }
}
