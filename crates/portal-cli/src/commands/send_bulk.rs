//! `portal send-bulk` command implementation
//!
//! Reads a JSON job file, gzips it and posts it to the bulk endpoint. The
//! server answers once every batch has been attempted.

use crate::api::{ApiClient, BulkEmailPayload};
use crate::error::{CliError, Result};
use colored::Colorize;
use portal_common::compression::gzip_json;
use std::path::Path;

/// Load and sanity-check a job file.
pub fn load_job(path: &Path) -> Result<BulkEmailPayload> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }

    let raw = std::fs::read_to_string(path)?;
    let payload: BulkEmailPayload = serde_json::from_str(&raw)
        .map_err(|e| CliError::invalid_job(format!("{}: {}", path.display(), e)))?;

    if payload.emails.is_empty() {
        return Err(CliError::invalid_job("At least one email is required"));
    }

    Ok(payload)
}

/// Submit a bulk job
pub async fn run(server_url: String, file: String, dry_run: bool) -> Result<()> {
    let path = Path::new(&file);
    let payload = load_job(path)?;
    let body = gzip_json(&payload)?;

    let attachments: usize = payload.emails.iter().map(|e| e.attachment_count()).sum();
    tracing::debug!(
        emails = payload.emails.len(),
        attachments,
        compressed_bytes = body.len(),
        "Prepared bulk job"
    );

    println!(
        "{} {} emails ({} attachments, {} bytes compressed)",
        "Job:".cyan().bold(),
        payload.emails.len(),
        attachments,
        body.len()
    );

    if dry_run {
        println!("{}", "Dry run: nothing sent.".yellow());
        return Ok(());
    }

    let client = ApiClient::new(server_url)?;
    println!("Sending to {} ...", client.base_url());

    let response = client.send_bulk(body).await?;

    if !response.result.success {
        return Err(CliError::Incomplete(response.result.message));
    }

    println!("{} {}", "✓".green(), response.message);
    println!("  {}", response.result.message);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_job() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.json");
        fs::write(
            &path,
            r#"{"emails":[{"to":"socio@example.com","subject":"Cuota","bodyText":"","bodyHtml":""}]}"#,
        )
        .unwrap();

        let payload = load_job(&path).unwrap();
        assert_eq!(payload.emails.len(), 1);
        assert_eq!(payload.emails[0].to, "socio@example.com");
    }

    #[test]
    fn test_load_job_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_job(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_load_job_rejects_empty_and_malformed() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, r#"{"emails":[]}"#).unwrap();
        assert!(matches!(load_job(&empty), Err(CliError::InvalidJob(_))));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, r#"{"emails":["#).unwrap();
        assert!(matches!(load_job(&broken), Err(CliError::InvalidJob(_))));
    }
}
