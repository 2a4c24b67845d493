//! Configuration management

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/portal";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Dispatch Configuration Constants
// ============================================================================

/// Items dispatched concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Pause between consecutive batches, in seconds.
pub const DEFAULT_BATCH_DELAY_SECS: u64 = 60;

/// Total send attempts per item, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff base; the wait after failed attempt `n` is `base * 2^(n-1)`.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Largest compressed body accepted (25 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Largest decompressed JSON accepted (200 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 200 * 1024 * 1024;

/// Recipient of completion notifications.
pub const DEFAULT_ADMIN_RECIPIENT_ID: &str = "admin";

// ============================================================================
// Mail Configuration Constants
// ============================================================================

/// Display name used in the From header.
pub const DEFAULT_MAIL_FROM_NAME: &str = "Soporte";

/// Per-request timeout for the mail relay, in seconds.
pub const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 30;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub dispatch: DispatchConfig,
    pub mail: MailConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Which notification store backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("Invalid NOTIFICATION_STORE: {}", other),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Which count a completion notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCountPolicy {
    /// Every item in the job, delivered or not
    #[default]
    Attempted,
    /// Only items that were delivered
    Delivered,
}

impl FromStr for NotificationCountPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attempted" => Ok(NotificationCountPolicy::Attempted),
            "delivered" => Ok(NotificationCountPolicy::Delivered),
            other => anyhow::bail!("Invalid DISPATCH_NOTIFICATION_COUNT: {}", other),
        }
    }
}

/// Bulk dispatch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub batch_size: usize,
    pub batch_delay_secs: u64,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Ceiling on concurrent sends, independent of `batch_size`
    pub max_in_flight: Option<usize>,
    pub max_payload_bytes: usize,
    pub max_decompressed_bytes: usize,
    pub notification_count: NotificationCountPolicy,
    pub admin_recipient_id: String,
}

impl DispatchConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.batch_delay_secs)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_secs: DEFAULT_BATCH_DELAY_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_in_flight: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
            notification_count: NotificationCountPolicy::Attempted,
            admin_recipient_id: DEFAULT_ADMIN_RECIPIENT_ID.to_string(),
        }
    }
}

/// Outbound mail transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    /// POST each message to an HTTP mail relay
    Relay,
    /// Log messages without sending them
    Log,
}

impl FromStr for MailTransportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relay" | "http" => Ok(MailTransportKind::Relay),
            "log" => Ok(MailTransportKind::Log),
            other => anyhow::bail!("Invalid MAIL_TRANSPORT: {}", other),
        }
    }
}

/// Mail transport configuration, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub transport: MailTransportKind,
    pub relay_url: Option<String>,
    #[serde(skip_serializing)]
    pub relay_api_key: Option<String>,
    pub from_address: String,
    pub from_name: String,
    pub timeout_secs: u64,
}

impl MailConfig {
    /// Formatted From header, e.g. `"Soporte" <soporte@example.org>`
    pub fn from_header(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.from_address)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransportKind::Log,
            relay_url: None,
            relay_api_key: None,
            from_address: "noreply@localhost".to_string(),
            from_name: DEFAULT_MAIL_FROM_NAME.to_string(),
            timeout_secs: DEFAULT_MAIL_TIMEOUT_SECS,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: env_string("PORTAL_HOST").unwrap_or(defaults.server.host),
                port: env_parse("PORTAL_PORT").unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse("PORTAL_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                backend: match env_string("NOTIFICATION_STORE") {
                    Some(value) => value.parse()?,
                    None => StoreBackend::Postgres,
                },
                url: env_string("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env_parse("DATABASE_CONNECT_TIMEOUT")
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS").unwrap_or(true),
            },
            dispatch: DispatchConfig {
                batch_size: env_parse("DISPATCH_BATCH_SIZE").unwrap_or(DEFAULT_BATCH_SIZE),
                batch_delay_secs: env_parse("DISPATCH_BATCH_DELAY_SECS")
                    .unwrap_or(DEFAULT_BATCH_DELAY_SECS),
                max_attempts: env_parse("DISPATCH_MAX_ATTEMPTS").unwrap_or(DEFAULT_MAX_ATTEMPTS),
                base_delay_ms: env_parse("DISPATCH_BASE_DELAY_MS").unwrap_or(DEFAULT_BASE_DELAY_MS),
                max_in_flight: env_parse("DISPATCH_MAX_IN_FLIGHT"),
                max_payload_bytes: env_parse("DISPATCH_MAX_PAYLOAD_BYTES")
                    .unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES),
                max_decompressed_bytes: env_parse("DISPATCH_MAX_DECOMPRESSED_BYTES")
                    .unwrap_or(DEFAULT_MAX_DECOMPRESSED_BYTES),
                notification_count: match env_string("DISPATCH_NOTIFICATION_COUNT") {
                    Some(value) => value.parse()?,
                    None => NotificationCountPolicy::default(),
                },
                admin_recipient_id: env_string("DISPATCH_ADMIN_RECIPIENT_ID")
                    .unwrap_or(defaults.dispatch.admin_recipient_id),
            },
            mail: MailConfig {
                transport: match env_string("MAIL_TRANSPORT") {
                    Some(value) => value.parse()?,
                    None if env_string("MAIL_RELAY_URL").is_some() => MailTransportKind::Relay,
                    None => MailTransportKind::Log,
                },
                relay_url: env_string("MAIL_RELAY_URL"),
                relay_api_key: env_string("MAIL_RELAY_API_KEY"),
                from_address: env_string("MAIL_FROM_ADDRESS").unwrap_or(defaults.mail.from_address),
                from_name: env_string("MAIL_FROM_NAME").unwrap_or(defaults.mail.from_name),
                timeout_secs: env_parse("MAIL_TIMEOUT_SECS").unwrap_or(DEFAULT_MAIL_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.backend == StoreBackend::Postgres {
            if self.database.url.is_empty() {
                anyhow::bail!("Database URL cannot be empty");
            }
            if self.database.max_connections == 0 {
                anyhow::bail!("Database max_connections must be greater than 0");
            }
            if self.database.min_connections > self.database.max_connections {
                anyhow::bail!(
                    "Database min_connections ({}) cannot be greater than max_connections ({})",
                    self.database.min_connections,
                    self.database.max_connections
                );
            }
        }

        if self.dispatch.batch_size == 0 {
            anyhow::bail!("DISPATCH_BATCH_SIZE must be greater than 0");
        }
        if self.dispatch.max_attempts == 0 {
            anyhow::bail!("DISPATCH_MAX_ATTEMPTS must be at least 1");
        }
        if self.dispatch.max_in_flight == Some(0) {
            anyhow::bail!("DISPATCH_MAX_IN_FLIGHT must be greater than 0 when set");
        }
        if self.dispatch.max_payload_bytes == 0 || self.dispatch.max_decompressed_bytes == 0 {
            anyhow::bail!("Dispatch payload limits must be greater than 0");
        }
        if self.dispatch.admin_recipient_id.trim().is_empty() {
            anyhow::bail!("DISPATCH_ADMIN_RECIPIENT_ID cannot be empty");
        }

        if self.mail.transport == MailTransportKind::Relay && self.mail.relay_url.is_none() {
            anyhow::bail!("MAIL_RELAY_URL is required when MAIL_TRANSPORT=relay");
        }
        if self.mail.from_address.trim().is_empty() {
            anyhow::bail!("MAIL_FROM_ADDRESS cannot be empty");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            dispatch: DispatchConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatch.batch_size, 50);
        assert_eq!(config.dispatch.batch_delay(), Duration::from_secs(60));
        assert_eq!(config.dispatch.max_attempts, 3);
        assert_eq!(config.dispatch.base_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.dispatch.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_relay_url() {
        let mut config = Config::default();
        config.mail.transport = MailTransportKind::Relay;
        assert!(config.validate().is_err());

        config.mail.relay_url = Some("http://relay.local/send".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_store_skips_database_checks() {
        let mut config = Config::default();
        config.database.backend = StoreBackend::Memory;
        config.database.url.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(
            "Delivered".parse::<NotificationCountPolicy>().unwrap(),
            NotificationCountPolicy::Delivered
        );
        assert_eq!("log".parse::<MailTransportKind>().unwrap(), MailTransportKind::Log);
        assert!("smtp".parse::<MailTransportKind>().is_err());
    }

    #[test]
    fn test_from_header() {
        let mail = MailConfig {
            from_address: "soporte@example.org".to_string(),
            ..MailConfig::default()
        };
        assert_eq!(mail.from_header(), "\"Soporte\" <soporte@example.org>");
    }
}
