//! Portal CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line client for the member portal's email and notification API.
//!
//! # Overview
//!
//! - **Bulk Dispatch**: Gzip a JSON job file and submit it (`portal send-bulk`)
//! - **Single Email**: Send one message immediately (`portal send`)
//! - **Notifications**: List, mark and delete admin notifications (`portal notifications`)
//! - **Status Checking**: Probe server health (`portal status`)

pub mod api;
pub mod commands;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};

/// Portal - member portal mailing client
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(
        long,
        env = "PORTAL_SERVER_URL",
        default_value = api::client::DEFAULT_SERVER_URL,
        global = true
    )]
    pub server_url: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a bulk email job from a JSON file
    SendBulk {
        /// JSON file with an `emails` array
        file: String,

        /// Validate and compress the job without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Send a single email
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Subject line
        #[arg(short, long)]
        subject: String,

        /// Plain-text body
        #[arg(long)]
        text: Option<String>,

        /// HTML body
        #[arg(long)]
        html: Option<String>,
    },

    /// Manage notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommand,
    },

    /// Check server health
    Status,
}

/// Notification subcommands
#[derive(Subcommand, Debug)]
pub enum NotificationsCommand {
    /// List notifications, newest first
    List {
        /// Only notifications for this recipient
        #[arg(short, long)]
        recipient: Option<String>,

        /// Only notifications in this status (e.g. unread, read)
        #[arg(short, long)]
        status: Option<String>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Mark a notification as read
    MarkRead {
        /// Notification ID
        id: String,
    },

    /// Set a notification's status
    SetStatus {
        /// Notification ID
        id: String,

        /// New status (pending, unread, read, approved, rejected, active, unasigned)
        status: String,
    },

    /// Delete a notification
    Delete {
        /// Notification ID
        id: String,
    },
}
