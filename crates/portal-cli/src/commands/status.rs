//! `portal status` command implementation

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use colored::Colorize;

/// Probe the server's health endpoint
pub async fn run(server_url: String) -> Result<()> {
    let client = ApiClient::new(server_url)?;

    if client.health_check().await? {
        println!("{} Server at {} is healthy", "✓".green(), client.base_url());
        Ok(())
    } else {
        Err(CliError::Unreachable(client.base_url().to_string()))
    }
}
