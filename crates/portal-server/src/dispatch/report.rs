//! Aggregation of per-item outcomes

use serde::Serialize;

use super::channel::DispatchOutcome;

/// One undelivered item, as reported to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDelivery {
    pub to: String,
    pub attempts: u32,
    pub error: String,
}

/// Totals for a finished job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
    pub failures: Vec<FailedDelivery>,
}

impl DispatchReport {
    pub fn from_outcomes(outcomes: &[DispatchOutcome]) -> Self {
        let failures: Vec<FailedDelivery> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                DispatchOutcome::Delivered { .. } => None,
                DispatchOutcome::Failed {
                    item,
                    attempts,
                    error,
                } => Some(FailedDelivery {
                    to: item.to.clone(),
                    attempts: *attempts,
                    error: error.to_string(),
                }),
            })
            .collect();

        Self {
            total: outcomes.len(),
            delivered: outcomes.len() - failures.len(),
            failed: failures.len(),
            failures,
        }
    }

    pub fn all_delivered(&self) -> bool {
        self.failed == 0
    }

    /// Write the totals and every failure to the operator log.
    pub fn log(&self) {
        if self.all_delivered() {
            tracing::info!(
                total = self.total,
                delivered = self.delivered,
                "All emails delivered"
            );
            return;
        }

        tracing::warn!(
            total = self.total,
            delivered = self.delivered,
            failed = self.failed,
            "Bulk dispatch finished with failures"
        );
        for failure in &self.failures {
            tracing::warn!(
                to = %failure.to,
                attempts = failure.attempts,
                error = %failure.error,
                "Email not delivered"
            );
        }
    }
}
