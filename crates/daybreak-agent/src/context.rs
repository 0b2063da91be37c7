//! Run-scoped context handed to each agent.

use chrono::{DateTime, Duration, Utc};
use daybreak_core::{MeetingTranscript, RunConfig};
use uuid::Uuid;

/// Parameters for one agent invocation.
///
/// The context carries run-scoped configuration only; agents never
/// share mutable state with each other through it.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Identifier of the run this invocation belongs to.
    pub run_id: Uuid,
    /// Reference time for the run (recency scoring, lead times).
    pub now: DateTime<Utc>,
    /// Forward-looking calendar window.
    pub lookahead: Duration,
    /// Cap on findings the email agent contributes.
    pub max_email_findings: usize,
    /// Optional cap applied to every agent's findings.
    pub max_findings_per_agent: Option<usize>,
    /// Transcripts queued for the meeting-notes agent.
    pub transcripts: Vec<MeetingTranscript>,
}

impl RunContext {
    /// Build a context for a run from its configuration.
    pub fn new(run_id: Uuid, now: DateTime<Utc>, config: &RunConfig) -> Self {
        Self {
            run_id,
            now,
            lookahead: config.lookahead(),
            max_email_findings: config.max_email_findings,
            max_findings_per_agent: config.max_findings_per_agent,
            transcripts: config.transcripts.clone(),
        }
    }

    /// Replace the queued transcripts.
    pub fn with_transcripts(mut self, transcripts: Vec<MeetingTranscript>) -> Self {
        self.transcripts = transcripts;
        self
    }
}
