//! Portal CLI - Main entry point

use clap::Parser;
use portal_cli::{Cli, Commands, NotificationsCommand};
use portal_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("portal-cli")
        .filter_directives(if cli.verbose {
            "portal_cli=debug,portal_common=debug"
        } else {
            "portal_cli=warn"
        })
        .build();

    // Environment variables take precedence over the flags above
    let log_config = LogConfig::from_env_with(log_config.clone()).unwrap_or(log_config);

    // The CLI works without logging
    let _logging = init_logging(&log_config).ok();

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> portal_cli::Result<()> {
    let server_url = cli.server_url;

    match cli.command {
        Commands::SendBulk { file, dry_run } => {
            portal_cli::commands::send_bulk::run(server_url, file, dry_run).await
        },

        Commands::Send {
            to,
            subject,
            text,
            html,
        } => portal_cli::commands::send::run(server_url, to, subject, text, html).await,

        Commands::Notifications { command } => match command {
            NotificationsCommand::List {
                recipient,
                status,
                format,
            } => portal_cli::commands::notifications::list(server_url, recipient, status, format)
                .await,
            NotificationsCommand::MarkRead { id } => {
                portal_cli::commands::notifications::mark_read(server_url, id).await
            },
            NotificationsCommand::SetStatus { id, status } => {
                portal_cli::commands::notifications::set_status(server_url, id, status).await
            },
            NotificationsCommand::Delete { id } => {
                portal_cli::commands::notifications::delete(server_url, id).await
            },
        },

        Commands::Status => portal_cli::commands::status::run(server_url).await,
    }
}
