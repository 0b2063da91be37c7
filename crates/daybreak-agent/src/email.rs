//! Email agent: unread messages into ranked summary findings.

use std::sync::Arc;

use async_trait::async_trait;
use daybreak_core::{AgentResult, Failure, Finding, FindingKind, MessageSource, RawMessage};
use tracing::{debug, info};

use crate::scoring::{MessageScorer, cap_findings, default_message_scorer, score_to_priority};
use crate::{Agent, RunContext};

/// Maximum characters of a message snippet kept in a finding body.
const SNIPPET_MAX_CHARS: usize = 280;

/// Agent that summarizes unread messages into `Summary` findings.
///
/// Output is capped at the run's `max_email_findings`; the cap keeps the
/// highest-priority messages, ties broken most-recent-first. Messages
/// beyond the cap are still considered processed, they just do not
/// generate findings.
pub struct EmailAgent {
    source: Arc<dyn MessageSource>,
    scorer: MessageScorer,
}

impl EmailAgent {
    /// Create an email agent over a message source with the default
    /// scoring heuristic.
    pub fn new(source: Arc<dyn MessageSource>) -> Self {
        Self {
            source,
            scorer: Box::new(default_message_scorer),
        }
    }

    /// Replace the importance scorer.
    pub fn with_scorer(mut self, scorer: MessageScorer) -> Self {
        self.scorer = scorer;
        self
    }

    fn finding_for(&self, message: &RawMessage, ctx: &RunContext) -> Finding {
        let score = (self.scorer)(message, ctx.now);
        let title = if message.subject.is_empty() {
            "(no subject)".to_string()
        } else {
            message.subject.clone()
        };

        Finding {
            source_agent: self.name().to_string(),
            kind: FindingKind::Summary,
            title,
            body: format!(
                "From {}: {}",
                message.sender,
                truncate_chars(&message.snippet, SNIPPET_MAX_CHARS)
            ),
            priority: score_to_priority(score),
            timestamp: message.received_at,
            dedup_key: format!("email:{}", message.id),
        }
    }
}

#[async_trait]
impl Agent for EmailAgent {
    fn name(&self) -> &str {
        "email"
    }

    #[tracing::instrument(skip(self, ctx), fields(run_id = %ctx.run_id))]
    async fn run(&self, ctx: &RunContext) -> AgentResult {
        let messages = match self.source.fetch_unread().await {
            Ok(messages) => messages,
            Err(e) => return AgentResult::Failed(Failure::from_capability(self.name(), &e)),
        };

        debug!(count = messages.len(), "fetched unread messages");

        let findings: Vec<Finding> = messages
            .iter()
            .map(|message| self.finding_for(message, ctx))
            .collect();

        let kept = cap_findings(findings, ctx.max_email_findings);
        info!(kept = kept.len(), "email agent finished");

        AgentResult::Findings(kept)
    }
}

/// Truncate a string to a maximum number of characters (not bytes).
/// Safe for UTF-8 strings with multi-byte characters.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    }
}
