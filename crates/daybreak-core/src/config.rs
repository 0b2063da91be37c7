//! Run configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::capability::MeetingTranscript;

/// Default calendar lookahead in hours.
const DEFAULT_LOOKAHEAD_HOURS: u64 = 24;

/// Default cap on findings the email agent contributes per run.
const DEFAULT_MAX_EMAIL_FINDINGS: usize = 10;

/// Default delivery attempt budget.
const DEFAULT_DELIVERY_RETRIES: u32 = 3;

/// Default per-agent timeout in seconds.
const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 30;

/// Default number of concurrent agent invocations.
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Configuration for one daily run.
///
/// Passed explicitly into the coordinator and threaded into each agent
/// through the run context; there is no process-wide mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Forward-looking calendar window in hours.
    pub lookahead_hours: u64,
    /// Cap on findings the email agent contributes per run.
    pub max_email_findings: usize,
    /// Optional cap applied to every agent's findings. `None` means no
    /// cap beyond the email agent's own.
    pub max_findings_per_agent: Option<usize>,
    /// Delivery attempt budget for the dispatcher.
    pub delivery_retries: u32,
    /// Per-agent timeout in seconds; an elapsed deadline becomes a
    /// retryable timeout failure, never a hang.
    pub agent_timeout_secs: u64,
    /// Maximum number of agents invoked concurrently.
    pub max_concurrency: usize,
    /// Transcripts queued for the meeting-notes agent in this run.
    #[serde(default)]
    pub transcripts: Vec<MeetingTranscript>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            lookahead_hours: DEFAULT_LOOKAHEAD_HOURS,
            max_email_findings: DEFAULT_MAX_EMAIL_FINDINGS,
            max_findings_per_agent: None,
            delivery_retries: DEFAULT_DELIVERY_RETRIES,
            agent_timeout_secs: DEFAULT_AGENT_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            transcripts: Vec::new(),
        }
    }
}

impl RunConfig {
    /// The calendar lookahead window.
    pub fn lookahead(&self) -> Duration {
        Duration::hours(self.lookahead_hours as i64)
    }

    /// The per-agent timeout.
    pub fn agent_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.agent_timeout_secs)
    }
}
