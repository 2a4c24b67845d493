//! Bulk dispatch orchestration
//!
//! Drives one job from raw body to completion notification and logs every
//! [`JobState`] transition under a `job_id` span.

use std::fmt::Display;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use portal_common::types::BulkDispatchResult;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use super::channel::{DispatchOutcome, RetryPolicy, RetryingChannel};
use super::clock::Sleeper;
use super::decoder::{decode_stream, DecodeLimits};
use super::error::{DispatchError, ValidationError};
use super::notifier::CompletionNotifier;
use super::report::DispatchReport;
use super::scheduler::{BatchScheduler, SchedulerSettings};
use super::transport::EmailTransport;
use super::validator::{validate_job, validate_single};
use super::{BulkDispatchJob, JobState};
use crate::config::DispatchConfig;
use crate::store::NotificationStore;

pub const SUCCESS_MESSAGE: &str = "Correos enviados y notificación creada correctamente.";
pub const FAILURE_MESSAGE: &str = "Error al enviar los correos y crear la notificación.";

/// Decoder, validator, scheduler and notifier wired for one deployment.
#[derive(Clone)]
pub struct BulkDispatchService {
    scheduler: BatchScheduler,
    notifier: CompletionNotifier,
    limits: DecodeLimits,
}

impl BulkDispatchService {
    pub fn new(scheduler: BatchScheduler, notifier: CompletionNotifier, limits: DecodeLimits) -> Self {
        Self {
            scheduler,
            notifier,
            limits,
        }
    }

    /// Build the whole pipeline from dispatch settings and its collaborators.
    pub fn from_config(
        config: &DispatchConfig,
        transport: Arc<dyn EmailTransport>,
        store: Arc<dyn NotificationStore>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let channel = RetryingChannel::new(transport, sleeper.clone(), RetryPolicy::from(config));
        let scheduler = BatchScheduler::new(channel, sleeper, SchedulerSettings::from(config));
        let notifier = CompletionNotifier::new(
            store,
            config.notification_count,
            config.admin_recipient_id.clone(),
        );
        Self::new(scheduler, notifier, DecodeLimits::from(config))
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        self.notifier.store()
    }

    /// Decode, validate and dispatch a bulk job arriving as a chunk stream.
    ///
    /// Ingest and validation failures are returned before any email is sent.
    /// Once validated, the job runs on its own task and keeps going if this
    /// future is dropped.
    pub async fn run_stream<S, E>(&self, stream: S) -> Result<BulkDispatchResult, DispatchError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!("bulk_dispatch", job_id = %job_id);

        async move {
            info!(state = %JobState::Received, "Bulk job received");

            info!(state = %JobState::Decompressing, "Decoding payload");
            let value = decode_stream(stream, self.limits).await.map_err(|e| {
                warn!(state = %JobState::Failed, error = %e, "Bulk job rejected");
                e
            })?;

            info!(state = %JobState::Validating, "Validating job");
            let job = validate_job(&value).map_err(|e| {
                warn!(state = %JobState::Failed, error = %e, field = ?e.field(), "Bulk job rejected");
                e
            })?;

            // Detached from the request: a client that disconnects must not
            // stop the job halfway through its batches.
            let service = self.clone();
            let task = tokio::spawn(async move { service.dispatch(job).await }.in_current_span());

            Ok::<_, DispatchError>(task.await?)
        }
        .instrument(span)
        .await
    }

    /// Send every item of an already validated job and record the completion
    /// notification.
    pub async fn dispatch(&self, job: BulkDispatchJob) -> BulkDispatchResult {
        let outcomes = self.scheduler.run(job).await;
        let report = DispatchReport::from_outcomes(&outcomes);
        report.log();

        info!(state = %JobState::Notifying, "Recording completion notification");
        let result = match self.notifier.notify(&report).await {
            Ok(_) => BulkDispatchResult {
                success: true,
                message: SUCCESS_MESSAGE.to_string(),
            },
            Err(e) => {
                error!(error = %e, "Failed to record completion notification");
                BulkDispatchResult {
                    success: false,
                    message: FAILURE_MESSAGE.to_string(),
                }
            },
        };

        info!(state = %JobState::Done, success = result.success, "Bulk job finished");
        result
    }

    /// Validate and send a single email through the retrying channel.
    pub async fn send_single(&self, value: &serde_json::Value) -> Result<DispatchOutcome, ValidationError> {
        let item = validate_single(value)?;
        Ok(self.scheduler.channel().send(item).await)
    }
}
