//! API endpoint URL builders

use uuid::Uuid;

/// Bulk dispatch endpoint (gzip body)
pub fn send_bulk_url(base_url: &str) -> String {
    format!("{}/api/v1/notifications/send-bulk", base_url)
}

/// Single email endpoint
pub fn send_email_url(base_url: &str) -> String {
    format!("{}/api/v1/email/send", base_url)
}

/// Notification collection
pub fn notifications_url(base_url: &str) -> String {
    format!("{}/api/v1/notifications", base_url)
}

/// A single notification
pub fn notification_url(base_url: &str, id: Uuid) -> String {
    format!("{}/api/v1/notifications/{}", base_url, id)
}

/// Build health check URL
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_bulk_url() {
        assert_eq!(
            send_bulk_url("http://localhost:8000"),
            "http://localhost:8000/api/v1/notifications/send-bulk"
        );
    }

    #[test]
    fn test_notification_url() {
        let id = Uuid::nil();
        assert_eq!(
            notification_url("http://localhost:8000", id),
            "http://localhost:8000/api/v1/notifications/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_health_url() {
        assert_eq!(health_url("http://localhost:8000"), "http://localhost:8000/health");
    }
}
