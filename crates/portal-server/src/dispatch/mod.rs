//! Bulk email dispatch pipeline
//!
//! A job moves through these stages:
//!
//! 1. [`decoder`] buffers the request body, checks the gzip signature,
//!    decompresses and parses it as JSON.
//! 2. [`validator`] turns the JSON into a [`BulkDispatchJob`], rejecting the
//!    whole job on the first invalid item.
//! 3. [`scheduler`] sends the items in fixed-size batches with a pause
//!    between batches.
//! 4. [`channel`] delivers one item through an [`transport::EmailTransport`],
//!    retrying with exponential backoff.
//! 5. [`report`] aggregates the outcomes and [`notifier`] records one
//!    completion notification for the administrators.
//!
//! [`service::BulkDispatchService`] wires the stages together.

pub mod channel;
pub mod clock;
pub mod decoder;
pub mod error;
pub mod notifier;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod transport;
pub mod validator;

use std::fmt;

use portal_common::types::EmailItem;

pub use channel::{DispatchOutcome, RetryPolicy, RetryingChannel};
pub use clock::{Sleeper, TokioSleeper};
pub use decoder::DecodeLimits;
pub use error::{DispatchError, IngestError, TransportError, ValidationError};
pub use notifier::CompletionNotifier;
pub use report::DispatchReport;
pub use scheduler::{BatchScheduler, SchedulerSettings};
pub use service::BulkDispatchService;
pub use transport::EmailTransport;

/// A validated bulk job: at least one item, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDispatchJob {
    pub items: Vec<EmailItem>,
}

impl BulkDispatchJob {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Lifecycle of one bulk job
///
/// Only `Decompressing` and `Validating` can end in `Failed`; once dispatch
/// starts the job always reaches `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Received,
    Decompressing,
    Validating,
    Dispatching { batch: usize, of: usize },
    Notifying,
    Done,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Received => write!(f, "received"),
            JobState::Decompressing => write!(f, "decompressing"),
            JobState::Validating => write!(f, "validating"),
            JobState::Dispatching { batch, of } => write!(f, "dispatching(batch {}/{})", batch, of),
            JobState::Notifying => write!(f, "notifying"),
            JobState::Done => write!(f, "done"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_display() {
        assert_eq!(JobState::Received.to_string(), "received");
        assert_eq!(
            JobState::Dispatching { batch: 2, of: 3 }.to_string(),
            "dispatching(batch 2/3)"
        );
        assert_eq!(JobState::Done.to_string(), "done");
    }
}
