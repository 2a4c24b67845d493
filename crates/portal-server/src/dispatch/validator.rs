//! Schema checks for decoded bulk jobs
//!
//! Validation walks the decoded JSON in list order and stops at the first
//! violation. The returned error names the offending path (for example
//! `emails[2].attachments[0].encoding`); later violations are not reported.

use std::sync::LazyLock;

use portal_common::types::{EmailItem, ItemMetadata};
use regex::Regex;
use serde_json::{Map, Value};

use super::error::ValidationError;
use super::BulkDispatchJob;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[allow(clippy::expect_used)]
static BASE64_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*?(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("base64 pattern is valid")
});

/// Returns true for a syntactically plausible email address.
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}

/// Returns true for padded standard-alphabet base64.
pub fn is_valid_base64(content: &str) -> bool {
    content.len() % 4 == 0 && BASE64_PATTERN.is_match(content)
}

/// How strictly the body fields are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyRule {
    /// Both bodies must be present strings, possibly empty
    Present,
    /// Bodies may be omitted
    Optional,
}

/// Validate a decoded bulk payload `{ "emails": [...] }`.
pub fn validate_job(value: &Value) -> Result<BulkDispatchJob, ValidationError> {
    let root = value
        .as_object()
        .ok_or_else(|| ValidationError::Schema("payload must be a JSON object".to_string()))?;

    let emails = match root.get("emails") {
        None | Some(Value::Null) => return Err(ValidationError::EmptyJob),
        Some(Value::Array(emails)) => emails,
        Some(_) => {
            return Err(ValidationError::Schema("'emails' must be an array".to_string()));
        },
    };

    if emails.is_empty() {
        return Err(ValidationError::EmptyJob);
    }

    let items = emails
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(item, &format!("emails[{}]", index), BodyRule::Present))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(items = items.len(), "Bulk job validated");
    Ok(BulkDispatchJob { items })
}

/// Validate a single email request, where the bodies are optional.
pub fn validate_single(value: &Value) -> Result<EmailItem, ValidationError> {
    validate_item(value, "email", BodyRule::Optional)
}

fn validate_item(value: &Value, path: &str, bodies: BodyRule) -> Result<EmailItem, ValidationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValidationError::Schema(format!("'{}' must be an object", path)))?;

    let to = required_text(obj, path, "to")?;
    let subject = required_text(obj, path, "subject")?;

    let (body_text, body_html) = match bodies {
        BodyRule::Present => (
            Some(present_string(obj, path, "bodyText")?),
            Some(present_string(obj, path, "bodyHtml")?),
        ),
        BodyRule::Optional => (
            optional_string(obj, path, "bodyText")?,
            optional_string(obj, path, "bodyHtml")?,
        ),
    };

    if !is_valid_email(&to) {
        return Err(ValidationError::InvalidAddress {
            field: format!("{}.to", path),
            value: to,
        });
    }

    let attachments = match obj.get("attachments") {
        None | Some(Value::Null) => None,
        Some(Value::Array(list)) => Some(
            list.iter()
                .enumerate()
                .map(|(i, a)| validate_attachment(a, &format!("{}.attachments[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(_) => {
            return Err(ValidationError::Schema(format!(
                "'{}.attachments' must be an array",
                path
            )));
        },
    };

    let metadata: ItemMetadata = serde_json::from_value(value.clone())
        .map_err(|e| ValidationError::Schema(format!("'{}': {}", path, e)))?;

    Ok(EmailItem {
        to,
        subject,
        body_text,
        body_html,
        attachments,
        metadata,
    })
}

fn validate_attachment(
    value: &Value,
    path: &str,
) -> Result<portal_common::types::Attachment, ValidationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValidationError::Schema(format!("'{}' must be an object", path)))?;

    let filename = required_text(obj, path, "filename")?;
    let content = required_text(obj, path, "content")?;
    let encoding = required_text(obj, path, "encoding")?;
    let content_type = required_text(obj, path, "contentType")?;

    if encoding != "base64" {
        return Err(ValidationError::UnsupportedEncoding {
            field: format!("{}.encoding", path),
            value: encoding,
        });
    }

    if !is_valid_base64(&content) {
        return Err(ValidationError::InvalidBase64 {
            field: format!("{}.content", path),
        });
    }

    Ok(portal_common::types::Attachment {
        filename,
        content,
        encoding,
        content_type,
    })
}

fn string_at<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<Option<&'a str>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ValidationError::Schema(format!("'{}.{}' must be a string", path, key))),
    }
}

/// Present and not blank after trimming.
fn required_text(obj: &Map<String, Value>, path: &str, key: &str) -> Result<String, ValidationError> {
    match string_at(obj, path, key)? {
        None => Err(ValidationError::MissingField {
            field: format!("{}.{}", path, key),
        }),
        Some(s) if s.trim().is_empty() => Err(ValidationError::EmptyField {
            field: format!("{}.{}", path, key),
        }),
        Some(s) => Ok(s.to_string()),
    }
}

/// Present, but may be empty.
fn present_string(obj: &Map<String, Value>, path: &str, key: &str) -> Result<String, ValidationError> {
    string_at(obj, path, key)?
        .map(str::to_string)
        .ok_or_else(|| ValidationError::MissingField {
            field: format!("{}.{}", path, key),
        })
}

fn optional_string(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    Ok(string_at(obj, path, key)?.map(str::to_string))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(to: &str) -> Value {
        json!({ "to": to, "subject": "Asamblea", "bodyText": "", "bodyHtml": "" })
    }

    #[test]
    fn test_valid_job() {
        let job = validate_job(&json!({
            "emails": [
                item("uno@example.com"),
                {
                    "to": "dos@example.com",
                    "subject": "Recibo",
                    "bodyText": "Adjunto",
                    "bodyHtml": "<p>Adjunto</p>",
                    "nombre": "Ana",
                    "attachments": [{
                        "filename": "recibo.pdf",
                        "content": "JVBERi0xLjQ=",
                        "encoding": "base64",
                        "contentType": "application/pdf"
                    }]
                }
            ]
        }))
        .unwrap();

        assert_eq!(job.items.len(), 2);
        assert_eq!(job.items[1].metadata.nombre.as_deref(), Some("Ana"));
        assert_eq!(job.items[1].attachment_count(), 1);
        assert_eq!(job.items[0].body_text.as_deref(), Some(""));
    }

    #[test]
    fn test_empty_and_missing_list() {
        assert_eq!(validate_job(&json!({ "emails": [] })), Err(ValidationError::EmptyJob));
        assert_eq!(validate_job(&json!({})), Err(ValidationError::EmptyJob));
        assert!(matches!(
            validate_job(&json!({ "emails": "x" })),
            Err(ValidationError::Schema(_))
        ));
        assert!(matches!(validate_job(&json!([1, 2])), Err(ValidationError::Schema(_))));
    }

    #[test]
    fn test_missing_to_names_item() {
        let err = validate_job(&json!({
            "emails": [
                item("uno@example.com"),
                { "subject": "Sin destinatario", "bodyText": "", "bodyHtml": "" },
                item("tres@example.com")
            ]
        }))
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "emails[1].to".to_string()
            }
        );
    }

    #[test]
    fn test_fail_fast_reports_first_violation() {
        let err = validate_job(&json!({
            "emails": [
                item("not-an-address"),
                { "to": "dos@example.com" }
            ]
        }))
        .unwrap_err();

        assert_eq!(err.field(), Some("emails[0].to"));
        assert!(matches!(err, ValidationError::InvalidAddress { .. }));
    }

    #[test]
    fn test_blank_subject_and_missing_body() {
        let err = validate_job(&json!({
            "emails": [{ "to": "a@b.co", "subject": "   ", "bodyText": "", "bodyHtml": "" }]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyField {
                field: "emails[0].subject".to_string()
            }
        );

        let err = validate_job(&json!({
            "emails": [{ "to": "a@b.co", "subject": "x", "bodyText": "" }]
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("emails[0].bodyHtml"));
    }

    #[test]
    fn test_attachment_rules() {
        let with_attachment = |attachment: Value| {
            json!({
                "emails": [{
                    "to": "a@b.co", "subject": "x", "bodyText": "", "bodyHtml": "",
                    "attachments": [attachment]
                }]
            })
        };

        let err = validate_job(&with_attachment(json!({
            "filename": "a.txt", "content": "QUJD", "encoding": "utf8", "contentType": "text/plain"
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedEncoding { .. }));

        let err = validate_job(&with_attachment(json!({
            "filename": "a.txt", "content": "QUJ", "encoding": "base64", "contentType": "text/plain"
        })))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidBase64 {
                field: "emails[0].attachments[0].content".to_string()
            }
        );

        let err = validate_job(&with_attachment(json!({
            "filename": "a.txt", "content": "QUJD", "encoding": "base64"
        })))
        .unwrap_err();
        assert_eq!(err.field(), Some("emails[0].attachments[0].contentType"));
    }

    #[test]
    fn test_wrong_type_is_schema_error() {
        let err = validate_job(&json!({
            "emails": [{ "to": 42, "subject": "x", "bodyText": "", "bodyHtml": "" }]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Schema(_)));
    }

    #[test]
    fn test_validate_single_allows_missing_bodies() {
        let email = validate_single(&json!({ "to": "a@b.co", "subject": "Hola" })).unwrap();
        assert!(email.body_text.is_none());
        assert!(email.body_html.is_none());

        let err = validate_single(&json!({ "subject": "Hola" })).unwrap_err();
        assert_eq!(err.field(), Some("email.to"));
    }

    #[test]
    fn test_patterns() {
        assert!(is_valid_email("socio@club.example.org"));
        assert!(!is_valid_email("socio@club"));
        assert!(!is_valid_email("so cio@club.org"));

        assert!(is_valid_base64("QUJD"));
        assert!(is_valid_base64("QUI="));
        assert!(is_valid_base64("QQ=="));
        assert!(!is_valid_base64("QQ="));
        assert!(!is_valid_base64("QU!D"));
    }
}
