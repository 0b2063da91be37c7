//! Notification agent: thin adapter around the notification sink.

use std::sync::Arc;

use async_trait::async_trait;
use daybreak_core::{AgentResult, NotificationSink};

use crate::{Agent, RunContext};

/// Agent variant that owns the notification sink.
///
/// It produces no findings and is not scheduled by the coordinator; the
/// delivery dispatcher reaches the sink through it instead.
pub struct NotificationAgent {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationAgent {
    /// Wrap a notification sink.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// The sink used for digest delivery.
    pub fn sink(&self) -> Arc<dyn NotificationSink> {
        Arc::clone(&self.sink)
    }
}

#[async_trait]
impl Agent for NotificationAgent {
    fn name(&self) -> &str {
        "notification"
    }

    async fn run(&self, _ctx: &RunContext) -> AgentResult {
        // Delivery happens through the dispatcher, never as a finding run.
        AgentResult::Findings(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use daybreak_core::{CapabilityError, Digest, RunConfig};
    use uuid::Uuid;

    struct NullSink;

    #[async_trait]
    impl NotificationSink for NullSink {
        async fn send(&self, _digest: &Digest) -> Result<(), CapabilityError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn produces_no_findings() {
        let agent = NotificationAgent::new(Arc::new(NullSink));
        let ctx = RunContext::new(Uuid::new_v4(), Utc::now(), &RunConfig::default());

        let result = agent.run(&ctx).await;
        assert!(result.findings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exposes_its_sink() {
        let agent = NotificationAgent::new(Arc::new(NullSink));
        let digest = Digest {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            findings: vec![],
            failures: vec![],
        };

        assert!(agent.sink().send(&digest).await.is_ok());
    }
}
