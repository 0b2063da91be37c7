//! Digest delivery with an explicit retry policy.

use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use chrono::Utc;
use daybreak_core::{AttemptOutcome, DeliveryAttempt, Digest, ErrorKind, NotificationSink};
use tracing::{debug, info, warn};

/// Initial delay before the first retry.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Upper bound on the delay between retries.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Result of a delivery run: whether the digest landed, plus the full
/// attempt log for the run report.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// Whether any attempt succeeded.
    pub delivered: bool,
    /// Every attempt made, in order.
    pub attempts: Vec<DeliveryAttempt>,
}

/// Delivers a digest through a notification sink.
///
/// Retry is an explicit policy owned here, not buried in the sink:
/// only a transient delivery error is retried, with exponential backoff
/// up to the attempt budget. A rejection is terminal after the first
/// attempt, since retrying a structurally invalid request cannot
/// succeed. The same digest value is reused across attempts.
pub struct Dispatcher {
    max_retries: u32,
}

impl Dispatcher {
    /// Create a dispatcher with the given attempt budget.
    ///
    /// A budget of zero still permits one attempt.
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Deliver the digest, retrying transient failures.
    #[tracing::instrument(skip(self, digest, sink), fields(run_id = %digest.run_id))]
    pub async fn deliver(&self, digest: &Digest, sink: &dyn NotificationSink) -> DeliveryOutcome {
        let budget = self.max_retries.max(1);
        let mut backoff = ExponentialBackoff {
            initial_interval: INITIAL_BACKOFF,
            max_interval: MAX_BACKOFF,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempts = Vec::new();

        for attempt in 1..=budget {
            match sink.send(digest).await {
                Ok(()) => {
                    attempts.push(DeliveryAttempt {
                        attempt,
                        at: Utc::now(),
                        outcome: AttemptOutcome::Delivered,
                    });
                    info!(attempt, "digest delivered");
                    return DeliveryOutcome {
                        delivered: true,
                        attempts,
                    };
                }
                Err(e) => {
                    let kind = e.kind();
                    attempts.push(DeliveryAttempt {
                        attempt,
                        at: Utc::now(),
                        outcome: AttemptOutcome::Failed {
                            kind,
                            message: e.to_string(),
                        },
                    });

                    if kind != ErrorKind::Delivery {
                        warn!(attempt, error = %e, "delivery rejected, not retrying");
                        break;
                    }

                    if attempt < budget {
                        let wait = backoff.next_backoff().unwrap_or(MAX_BACKOFF);
                        debug!(
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            error = %e,
                            "transient delivery failure, backing off"
                        );
                        tokio::time::sleep(wait).await;
                    } else {
                        warn!(attempt, error = %e, "delivery retries exhausted");
                    }
                }
            }
        }

        DeliveryOutcome {
            delivered: false,
            attempts,
        }
    }
}
