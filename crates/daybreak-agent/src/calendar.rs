//! Calendar agent: upcoming events into reminder findings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use daybreak_core::{
    AgentResult, EventSource, Failure, Finding, FindingKind, Priority, RawEvent,
};
use tracing::{debug, info};

use crate::{Agent, RunContext};

/// Default attendee count at which an event is considered important.
const DEFAULT_ATTENDEE_THRESHOLD: usize = 3;

/// Default title keywords that mark an event important.
const DEFAULT_TITLE_KEYWORDS: &[&str] = &["review", "interview", "1:1", "all hands", "deadline"];

/// Agent that emits a `Reminder` finding per important upcoming event.
///
/// An event is important when the organizer flagged it, the attendee
/// count reaches the threshold, or the title matches a keyword.
/// Reminder priority is derived from time-to-event and is monotonic:
/// it never decreases as the event gets closer.
pub struct CalendarAgent {
    source: Arc<dyn EventSource>,
    attendee_threshold: usize,
    title_keywords: Vec<String>,
}

impl CalendarAgent {
    /// Create a calendar agent over an event source with the default
    /// importance heuristic.
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            attendee_threshold: DEFAULT_ATTENDEE_THRESHOLD,
            title_keywords: DEFAULT_TITLE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Override the attendee threshold.
    pub fn with_attendee_threshold(mut self, threshold: usize) -> Self {
        self.attendee_threshold = threshold;
        self
    }

    /// Override the title keywords.
    pub fn with_title_keywords(mut self, keywords: Vec<String>) -> Self {
        self.title_keywords = keywords;
        self
    }

    fn is_important(&self, event: &RawEvent) -> bool {
        if event.flagged {
            return true;
        }
        if event.attendees.len() >= self.attendee_threshold {
            return true;
        }
        let title = event.title.to_lowercase();
        self.title_keywords.iter().any(|k| title.contains(k))
    }

    fn finding_for(&self, event: &RawEvent, ctx: &RunContext) -> Finding {
        let lead = event.start - ctx.now;
        let mut body = format!("Starts {}", event.start.format("%Y-%m-%d %H:%M UTC"));
        if let Some(ref location) = event.location {
            body.push_str(&format!("\nJoin: {}", location));
        }

        Finding {
            source_agent: self.name().to_string(),
            kind: FindingKind::Reminder,
            title: event.title.clone(),
            body,
            priority: priority_for_lead_time(lead),
            timestamp: event.start,
            dedup_key: format!("event:{}", event.id),
        }
    }
}

/// Map time-to-event to a reminder priority.
///
/// Monotonic non-decreasing as the lead time shrinks: within an hour is
/// urgent, within four hours high, within twelve normal, beyond that low.
pub fn priority_for_lead_time(lead: Duration) -> Priority {
    if lead <= Duration::hours(1) {
        Priority::Urgent
    } else if lead <= Duration::hours(4) {
        Priority::High
    } else if lead <= Duration::hours(12) {
        Priority::Normal
    } else {
        Priority::Low
    }
}

#[async_trait]
impl Agent for CalendarAgent {
    fn name(&self) -> &str {
        "calendar"
    }

    #[tracing::instrument(skip(self, ctx), fields(run_id = %ctx.run_id))]
    async fn run(&self, ctx: &RunContext) -> AgentResult {
        let events = match self.source.fetch_upcoming(ctx.lookahead).await {
            Ok(events) => events,
            Err(e) => return AgentResult::Failed(Failure::from_capability(self.name(), &e)),
        };

        debug!(count = events.len(), "fetched upcoming events");

        let findings: Vec<Finding> = events
            .iter()
            .filter(|event| self.is_important(event))
            .map(|event| self.finding_for(event, ctx))
            .collect();

        info!(
            important = findings.len(),
            total = events.len(),
            "calendar agent finished"
        );

        AgentResult::Findings(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use daybreak_core::{CapabilityError, ErrorKind, RunConfig};
    use proptest::prelude::*;
    use test_case::test_case;
    use uuid::Uuid;

    struct StaticSource {
        events: Vec<RawEvent>,
    }

    #[async_trait]
    impl EventSource for StaticSource {
        async fn fetch_upcoming(&self, _window: Duration) -> Result<Vec<RawEvent>, CapabilityError> {
            Ok(self.events.clone())
        }
    }

    struct DownSource;

    #[async_trait]
    impl EventSource for DownSource {
        async fn fetch_upcoming(&self, _window: Duration) -> Result<Vec<RawEvent>, CapabilityError> {
            Err(CapabilityError::Connectivity("calendar unreachable".into()))
        }
    }

    fn test_ctx() -> RunContext {
        RunContext::new(Uuid::new_v4(), Utc::now(), &RunConfig::default())
    }

    fn event(id: &str, title: &str, in_hours: i64, attendees: usize, flagged: bool) -> RawEvent {
        RawEvent {
            id: id.into(),
            title: title.into(),
            start: Utc::now() + Duration::hours(in_hours),
            attendees: (0..attendees).map(|i| format!("p{}@example.com", i)).collect(),
            flagged,
            location: None,
        }
    }

    #[test_case(0 => Priority::Urgent ; "starting now")]
    #[test_case(1 => Priority::Urgent ; "within the hour")]
    #[test_case(3 => Priority::High ; "within four hours")]
    #[test_case(10 => Priority::Normal ; "within twelve hours")]
    #[test_case(20 => Priority::Low ; "later today or tomorrow")]
    fn lead_time_priority(hours: i64) -> Priority {
        priority_for_lead_time(Duration::hours(hours))
    }

    #[tokio::test]
    async fn only_important_events_become_findings() {
        let agent = CalendarAgent::new(Arc::new(StaticSource {
            events: vec![
                event("1", "Coffee", 2, 1, false),
                event("2", "Design review", 2, 1, false),
                event("3", "Big sync", 2, 5, false),
                event("4", "Flagged thing", 2, 1, true),
            ],
        }));

        let result = agent.run(&test_ctx()).await;
        let findings = result.findings().unwrap();

        let keys: Vec<&str> = findings.iter().map(|f| f.dedup_key.as_str()).collect();
        assert_eq!(keys, vec!["event:2", "event:3", "event:4"]);
        assert!(findings.iter().all(|f| f.kind == FindingKind::Reminder));
    }

    #[tokio::test]
    async fn reminder_timestamp_is_event_start() {
        let e = event("1", "Design review", 6, 1, false);
        let start = e.start;
        let agent = CalendarAgent::new(Arc::new(StaticSource { events: vec![e] }));

        let result = agent.run(&test_ctx()).await;
        assert_eq!(result.findings().unwrap()[0].timestamp, start);
    }

    #[tokio::test]
    async fn join_link_surfaces_in_body() {
        let mut e = event("1", "Design review", 6, 1, false);
        e.location = Some("https://meet.example.com/xyz".into());
        let agent = CalendarAgent::new(Arc::new(StaticSource { events: vec![e] }));

        let result = agent.run(&test_ctx()).await;
        assert!(
            result.findings().unwrap()[0]
                .body
                .contains("https://meet.example.com/xyz")
        );
    }

    #[tokio::test]
    async fn source_error_becomes_failure() {
        let agent = CalendarAgent::new(Arc::new(DownSource));
        let result = agent.run(&test_ctx()).await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::Connectivity);
        assert!(failure.retryable);
    }

    proptest! {
        // Priority is monotonic non-decreasing as lead time shrinks
        #[test]
        fn priority_monotonic_in_lead_time(a in 0i64..10_000, b in 0i64..10_000) {
            let (closer, farther) = (a.min(b), a.max(b));
            let p_closer = priority_for_lead_time(Duration::minutes(closer));
            let p_farther = priority_for_lead_time(Duration::minutes(farther));
            prop_assert!(p_closer >= p_farther);
        }
    }
}
