//! Meeting-notes agent: transcripts into action items and decisions.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use daybreak_core::{
    AgentResult, Failure, Finding, FindingKind, MeetingTranscript, Priority, TranscriptProcessor,
};
use tracing::{debug, info};

use crate::{Agent, RunContext};

/// Maximum characters of an extracted item kept in a finding title.
const TITLE_MAX_CHARS: usize = 80;

/// Agent that turns queued meeting transcripts into findings.
///
/// Action items become `ActionItem` findings (high priority), decisions
/// become `Note` findings (normal priority). Items with identical
/// normalized text within the same transcript are emitted once. A
/// transcript that yields nothing produces no findings; that is not a
/// failure.
pub struct MeetingNotesAgent {
    processor: Arc<dyn TranscriptProcessor>,
}

impl MeetingNotesAgent {
    /// Create a meeting-notes agent over a transcript processor.
    pub fn new(processor: Arc<dyn TranscriptProcessor>) -> Self {
        Self { processor }
    }

    fn finding_for(
        &self,
        transcript: &MeetingTranscript,
        item: &str,
        kind: FindingKind,
        normalized: &str,
        ctx: &RunContext,
    ) -> Finding {
        let label = match kind {
            FindingKind::ActionItem => "action",
            _ => "decision",
        };

        Finding {
            source_agent: self.name().to_string(),
            kind,
            title: clip_title(item),
            body: format!("{}\nFrom meeting: {}", item, transcript.title),
            priority: match kind {
                FindingKind::ActionItem => Priority::High,
                _ => Priority::Normal,
            },
            timestamp: ctx.now,
            dedup_key: format!("transcript:{}:{}:{}", transcript.meeting_id, label, normalized),
        }
    }
}

#[async_trait]
impl Agent for MeetingNotesAgent {
    fn name(&self) -> &str {
        "meeting_notes"
    }

    #[tracing::instrument(skip(self, ctx), fields(run_id = %ctx.run_id))]
    async fn run(&self, ctx: &RunContext) -> AgentResult {
        let mut findings = Vec::new();

        for transcript in &ctx.transcripts {
            let extraction = match self.processor.extract(&transcript.text).await {
                Ok(extraction) => extraction,
                Err(e) => return AgentResult::Failed(Failure::from_capability(self.name(), &e)),
            };

            debug!(
                meeting = %transcript.meeting_id,
                action_items = extraction.action_items.len(),
                decisions = extraction.decisions.len(),
                "transcript processed"
            );

            // Dedup by normalized text, scoped to this transcript
            let mut seen = HashSet::new();

            for item in &extraction.action_items {
                let normalized = normalize_item(item);
                if normalized.is_empty() || !seen.insert(normalized.clone()) {
                    continue;
                }
                findings.push(self.finding_for(
                    transcript,
                    item,
                    FindingKind::ActionItem,
                    &normalized,
                    ctx,
                ));
            }

            for decision in &extraction.decisions {
                let normalized = normalize_item(decision);
                if normalized.is_empty() || !seen.insert(normalized.clone()) {
                    continue;
                }
                findings.push(self.finding_for(
                    transcript,
                    decision,
                    FindingKind::Note,
                    &normalized,
                    ctx,
                ));
            }
        }

        info!(
            findings = findings.len(),
            transcripts = ctx.transcripts.len(),
            "meeting-notes agent finished"
        );

        AgentResult::Findings(findings)
    }
}

/// Normalize an extracted item for deduplication: lowercase, trimmed,
/// inner whitespace collapsed.
fn normalize_item(item: &str) -> String {
    item.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn clip_title(item: &str) -> String {
    let char_count = item.chars().count();
    if char_count <= TITLE_MAX_CHARS {
        item.to_string()
    } else {
        format!("{}...", item.chars().take(TITLE_MAX_CHARS).collect::<String>())
    }
}
