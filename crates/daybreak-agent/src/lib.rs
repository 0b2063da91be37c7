//! Agent contract and the built-in agent variants.
//!
//! An agent is a named unit that consumes one or more capability
//! interfaces and produces findings for the daily digest. The four
//! variants (email, calendar, meeting notes, notification) share one
//! interface and are dispatched by configuration, not subclassing.
//!
//! Failure semantics: every capability error is caught at the agent
//! boundary and converted into a recorded failure. An agent never lets
//! an error escape to the coordinator as an unhandled fault.

mod calendar;
mod context;
mod email;
mod meeting_notes;
mod notification;
mod scoring;

use async_trait::async_trait;
use daybreak_core::AgentResult;

pub use calendar::CalendarAgent;
pub use context::RunContext;
pub use email::EmailAgent;
pub use meeting_notes::MeetingNotesAgent;
pub use notification::NotificationAgent;
pub use scoring::{MessageScorer, cap_findings, default_message_scorer, score_to_priority};

/// A named unit of work in the daily run.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable name used in run reports and finding attribution.
    fn name(&self) -> &str;

    /// Execute one invocation against the run context.
    ///
    /// Returns either findings or exactly one failure; implementations
    /// must not panic or propagate capability errors.
    async fn run(&self, ctx: &RunContext) -> AgentResult;
}
