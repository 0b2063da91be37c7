//! Run data model: findings, digests, and run reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CapabilityError;

/// Priority of a finding within the daily digest.
///
/// Ordering is derived, so `Low < Normal < High < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

/// What kind of information a finding carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A summarized unread message.
    Summary,
    /// An upcoming event worth a heads-up.
    Reminder,
    /// An action item extracted from a meeting transcript.
    ActionItem,
    /// A decision or note extracted from a meeting transcript.
    Note,
}

/// One discrete unit of information an agent contributes to the digest.
///
/// Immutable once created; ownership flows one-directionally from the
/// producing agent through the coordinator into the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the agent that produced this finding.
    pub source_agent: String,
    /// What kind of information this is.
    pub kind: FindingKind,
    /// Short human-readable title.
    pub title: String,
    /// Body text shown in the digest.
    pub body: String,
    /// Priority tier used for digest ordering.
    pub priority: Priority,
    /// When the underlying item occurred (message received, event start).
    pub timestamp: DateTime<Utc>,
    /// Stable key used to collapse duplicates across overlapping sources.
    pub dedup_key: String,
}

/// Classification of a failure, aligned with the capability error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connectivity,
    Auth,
    Processing,
    Timeout,
    Delivery,
    Rejected,
}

impl ErrorKind {
    /// Whether a failure of this kind could plausibly succeed on retry.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Connectivity | ErrorKind::Timeout | ErrorKind::Delivery
        )
    }
}

/// A recorded agent failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Name of the agent that failed.
    pub agent_name: String,
    /// Classified failure kind.
    pub kind: ErrorKind,
    /// Human-readable message for the run report.
    pub message: String,
    /// Whether retrying the agent could plausibly succeed.
    pub retryable: bool,
}

impl Failure {
    /// Record a capability error raised during an agent run.
    pub fn from_capability(agent_name: impl Into<String>, err: &CapabilityError) -> Self {
        Self {
            agent_name: agent_name.into(),
            kind: err.kind(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }

    /// Record an agent invocation that exceeded its deadline.
    pub fn timeout(agent_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            kind: ErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }
}

/// Outcome of one agent invocation.
///
/// An invocation either yields zero-or-more findings or reports exactly
/// one failure; it is never partially both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentResult {
    /// The agent completed and produced these findings.
    Findings(Vec<Finding>),
    /// The agent failed; no findings survive from this invocation.
    Failed(Failure),
}

impl AgentResult {
    /// Whether this result is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, AgentResult::Failed(_))
    }

    /// The findings, if the invocation succeeded.
    pub fn findings(&self) -> Option<&[Finding]> {
        match self {
            AgentResult::Findings(findings) => Some(findings),
            AgentResult::Failed(_) => None,
        }
    }

    /// The failure, if the invocation failed.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            AgentResult::Findings(_) => None,
            AgentResult::Failed(failure) => Some(failure),
        }
    }
}

/// The merged, ordered, deduplicated collection of findings for one run.
///
/// Built once per run; findings are sorted by priority descending then
/// timestamp ascending, and `dedup_key` values are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// Identifier of the run that produced this digest.
    pub run_id: Uuid,
    /// When the digest was assembled.
    pub generated_at: DateTime<Utc>,
    /// Ordered, deduplicated findings.
    pub findings: Vec<Finding>,
    /// Failures from agents that did not contribute, kept for audit.
    pub failures: Vec<Failure>,
}

impl Digest {
    /// Whether the digest carries no findings at all.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The sink accepted the digest.
    Delivered,
    /// The attempt failed with the given classification.
    Failed { kind: ErrorKind, message: String },
}

/// One entry in the delivery log of a run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    /// 1-based attempt number.
    pub attempt: u32,
    /// When the attempt was made.
    pub at: DateTime<Utc>,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// Per-agent outcome recorded in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentOutcome {
    /// The agent completed, contributing this many findings.
    Success { findings: usize },
    /// The agent failed.
    Failed { kind: ErrorKind, message: String },
}

/// States a run moves through.
///
/// ```text
/// Pending -> Running -> Aggregating -> Delivering -> Completed
///                            |              |    \-> Degraded
///                            |              \-----> Failed
///                            \--------------------> Failed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// The run has been created but no agent has started.
    #[default]
    Pending,
    /// Agent invocations are in flight.
    Running,
    /// All agents have settled; findings are being merged.
    Aggregating,
    /// The digest is being handed to the notification sink.
    Delivering,
    /// Every agent succeeded and the digest was delivered.
    Completed,
    /// Some agents failed but a partial digest was delivered.
    Degraded,
    /// Either every agent failed or delivery retries were exhausted.
    Failed,
}

impl RunState {
    /// Whether the run has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Degraded | RunState::Failed
        )
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Running, Aggregating)
                | (Aggregating, Delivering)
                | (Aggregating, Failed)
                | (Delivering, Completed)
                | (Delivering, Degraded)
                | (Delivering, Failed)
        )
    }
}

/// Terminal record of one daily run, for observability only.
///
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of the run.
    pub run_id: Uuid,
    /// Terminal state the run reached.
    pub state: RunState,
    /// Whether the digest reached the notification sink.
    pub digest_delivered: bool,
    /// Outcome per agent, keyed by agent name.
    pub agent_outcomes: BTreeMap<String, AgentOutcome>,
    /// Log of every delivery attempt, in order.
    pub delivery_attempts: Vec<DeliveryAttempt>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run reached its terminal state.
    pub finished_at: DateTime<Utc>,
}
