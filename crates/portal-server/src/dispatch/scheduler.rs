//! Batch scheduling for bulk jobs
//!
//! Items are split into contiguous batches that keep the job's order.
//! Batches run one after another; the items of a batch are sent concurrently.
//! Between two batches the scheduler waits a fixed delay, which is what keeps
//! the mail relay from being flooded. There is no job-level timeout: once
//! started, every batch runs to completion.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use portal_common::types::EmailItem;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::channel::{DispatchOutcome, RetryingChannel};
use super::clock::Sleeper;
use super::{BulkDispatchJob, JobState};
use crate::config::{DispatchConfig, DEFAULT_BATCH_DELAY_SECS, DEFAULT_BATCH_SIZE};

/// Borrowing view of the batches `items` splits into.
pub fn partition(items: &[EmailItem], batch_size: usize) -> Vec<&[EmailItem]> {
    items.chunks(batch_size.max(1)).collect()
}

/// Sizes of the batches `total` items split into: `ceil(total / batch_size)`
/// entries, all full except possibly the last.
pub fn batch_sizes(total: usize, batch_size: usize) -> Vec<usize> {
    let batch_size = batch_size.max(1);
    (0..total.div_ceil(batch_size))
        .map(|i| batch_size.min(total - i * batch_size))
        .collect()
}

/// Batch cadence settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Upper bound on sends in flight at once; `None` means the whole batch
    pub max_in_flight: Option<usize>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_secs(DEFAULT_BATCH_DELAY_SECS),
            max_in_flight: None,
        }
    }
}

impl From<&DispatchConfig> for SchedulerSettings {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            batch_delay: config.batch_delay(),
            max_in_flight: config.max_in_flight,
        }
    }
}

/// Runs a validated job through the delivery channel batch by batch.
#[derive(Clone)]
pub struct BatchScheduler {
    channel: RetryingChannel,
    sleeper: Arc<dyn Sleeper>,
    settings: SchedulerSettings,
    limiter: Option<Arc<Semaphore>>,
}

impl BatchScheduler {
    pub fn new(
        channel: RetryingChannel,
        sleeper: Arc<dyn Sleeper>,
        settings: SchedulerSettings,
    ) -> Self {
        let limiter = settings
            .max_in_flight
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));
        Self {
            channel,
            sleeper,
            settings,
            limiter,
        }
    }

    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    pub fn channel(&self) -> &RetryingChannel {
        &self.channel
    }

    /// Dispatch every item of `job` and return one outcome per item.
    ///
    /// Outcomes follow batch order; inside a batch they follow item order,
    /// although the sends themselves complete in any order.
    pub async fn run(&self, job: BulkDispatchJob) -> Vec<DispatchOutcome> {
        let total = job.items.len();
        let batches = partition(&job.items, self.settings.batch_size);
        let batch_count = batches.len();
        let mut outcomes = Vec::with_capacity(total);

        info!(
            items = total,
            batches = batch_count,
            batch_size = self.settings.batch_size,
            "Starting dispatch"
        );

        for (index, batch) in batches.iter().enumerate() {
            let state = JobState::Dispatching {
                batch: index + 1,
                of: batch_count,
            };
            info!(state = %state, size = batch.len(), "Dispatching batch");

            let results = join_all(batch.iter().map(|item| self.send_limited(item.clone()))).await;
            let delivered = results.iter().filter(|o| o.is_delivered()).count();

            info!(
                batch = index + 1,
                delivered,
                failed = results.len() - delivered,
                "Batch completed"
            );
            outcomes.extend(results);

            if index + 1 < batch_count {
                debug!(delay = ?self.settings.batch_delay, "Waiting before next batch");
                self.sleeper.sleep(self.settings.batch_delay).await;
            }
        }

        outcomes
    }

    async fn send_limited(&self, item: EmailItem) -> DispatchOutcome {
        // The semaphore is never closed, so acquire only fails if it is dropped.
        let _permit = match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        };
        self.channel.send(item).await
    }
}
