//! Retrying delivery channel
//!
//! Wraps an [`EmailTransport`] with bounded retries and exponential backoff.
//! The channel never fails: every call ends in a [`DispatchOutcome`] that
//! either carries the delivered item or the item together with the last
//! transport error.

use std::sync::Arc;
use std::time::Duration;

use portal_common::types::EmailItem;
use tracing::{debug, warn};

use super::clock::Sleeper;
use super::error::TransportError;
use super::transport::EmailTransport;
use crate::config::{DispatchConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// Retry bounds for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait inserted after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(DEFAULT_BASE_DELAY_MS))
    }
}

impl From<&DispatchConfig> for RetryPolicy {
    fn from(config: &DispatchConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay())
    }
}

/// Final result of delivering one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered {
        item: EmailItem,
        attempts: u32,
    },
    Failed {
        item: EmailItem,
        attempts: u32,
        error: TransportError,
    },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }

    pub fn item(&self) -> &EmailItem {
        match self {
            DispatchOutcome::Delivered { item, .. } | DispatchOutcome::Failed { item, .. } => item,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            DispatchOutcome::Delivered { attempts, .. }
            | DispatchOutcome::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            DispatchOutcome::Delivered { .. } => None,
            DispatchOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Delivers items through a transport, retrying failed sends.
///
/// Holds no per-item state, so one channel is shared by every concurrent send
/// of a job.
#[derive(Clone)]
pub struct RetryingChannel {
    transport: Arc<dyn EmailTransport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl RetryingChannel {
    pub fn new(
        transport: Arc<dyn EmailTransport>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Deliver `item`, retrying up to the policy's attempt bound.
    pub async fn send(&self, item: EmailItem) -> DispatchOutcome {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            debug!(
                recipient = %item.to,
                transport = self.transport.name(),
                "Send attempt {}/{}", attempt, max_attempts
            );

            match self.transport.send(&item).await {
                Ok(()) => {
                    debug!(recipient = %item.to, attempt, "Email delivered");
                    return DispatchOutcome::Delivered {
                        item,
                        attempts: attempt,
                    };
                },
                Err(error) if attempt < max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        recipient = %item.to,
                        "Send attempt {}/{} failed: {}. Retrying in {:?}...",
                        attempt, max_attempts, error, delay
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                },
                Err(error) => {
                    warn!(
                        recipient = %item.to,
                        "Failed to send email after {} attempts: {}",
                        attempt, error
                    );
                    return DispatchOutcome::Failed {
                        item,
                        attempts: attempt,
                        error,
                    };
                },
            }
        }
    }
}
