//! Run coordinator: drives one daily run through its state machine.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use daybreak_agent::{Agent, RunContext, cap_findings};
use daybreak_core::{
    AgentOutcome, AgentResult, Failure, NotificationSink, RunConfig, RunReport, RunState,
};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::digest::DigestBuilder;
use crate::dispatcher::Dispatcher;

/// Coordinates one daily run.
///
/// Agents are invoked with bounded concurrency and no ordering
/// dependency between them; the coordinator is the single
/// synchronization point that waits for every invocation to settle
/// before aggregating. One agent's failure never aborts its siblings.
pub struct Coordinator {
    config: RunConfig,
    agents: Vec<Arc<dyn Agent>>,
    sink: Arc<dyn NotificationSink>,
}

impl Coordinator {
    /// Create a coordinator with no agents configured.
    pub fn new(config: RunConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            agents: Vec::new(),
            sink,
        }
    }

    /// Replace the configured agents.
    pub fn with_agents(mut self, agents: Vec<Arc<dyn Agent>>) -> Self {
        self.agents = agents;
        self
    }

    /// Add one agent.
    pub fn add_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Execute one run to a terminal state.
    #[tracing::instrument(skip(self), fields(agents = self.agents.len()))]
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut state = RunState::Pending;

        info!(run_id = %run_id, "starting daily run");
        advance(&mut state, RunState::Running, run_id);

        let results = self.settle_agents(run_id, started_at).await;

        advance(&mut state, RunState::Aggregating, run_id);

        let agent_outcomes: BTreeMap<String, AgentOutcome> = results
            .iter()
            .map(|(name, result)| (name.clone(), outcome_for(result)))
            .collect();

        let any_failed = results.iter().any(|(_, r)| r.is_failure());
        let all_failed = !results.is_empty() && results.iter().all(|(_, r)| r.is_failure());

        if all_failed {
            advance(&mut state, RunState::Failed, run_id);
            error!(run_id = %run_id, "every agent failed, no digest to deliver");
            return RunReport {
                run_id,
                state,
                digest_delivered: false,
                agent_outcomes,
                delivery_attempts: Vec::new(),
                started_at,
                finished_at: Utc::now(),
            };
        }

        let agent_results: Vec<AgentResult> =
            results.into_iter().map(|(_, result)| result).collect();
        let digest = DigestBuilder::build(run_id, Utc::now(), &agent_results);

        advance(&mut state, RunState::Delivering, run_id);
        let delivery = Dispatcher::new(self.config.delivery_retries)
            .deliver(&digest, self.sink.as_ref())
            .await;

        let terminal = if !delivery.delivered {
            RunState::Failed
        } else if any_failed {
            RunState::Degraded
        } else {
            RunState::Completed
        };
        advance(&mut state, terminal, run_id);

        info!(
            run_id = %run_id,
            state = ?state,
            findings = digest.findings.len(),
            delivered = delivery.delivered,
            "daily run finished"
        );

        RunReport {
            run_id,
            state,
            digest_delivered: delivery.delivered,
            agent_outcomes,
            delivery_attempts: delivery.attempts,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Invoke every configured agent and wait for all of them to settle.
    ///
    /// Work is distributed over a bounded worker pool; results come back
    /// in completion order and are re-indexed to configuration order so
    /// aggregation is deterministic.
    async fn settle_agents(
        &self,
        run_id: Uuid,
        started_at: chrono::DateTime<Utc>,
    ) -> Vec<(String, AgentResult)> {
        if self.agents.is_empty() {
            warn!(run_id = %run_id, "no agents configured");
            return Vec::new();
        }

        let ctx = Arc::new(RunContext::new(run_id, started_at, &self.config));
        let timeout = self.config.agent_timeout();
        let worker_count = self.config.max_concurrency.clamp(1, self.agents.len());

        let (work_tx, work_rx) = mpsc::channel::<(usize, Arc<dyn Agent>)>(self.agents.len());
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, mut result_rx) =
            mpsc::channel::<(usize, String, AgentResult)>(self.agents.len());

        let mut worker_handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let ctx = Arc::clone(&ctx);

            let handle = tokio::spawn(async move {
                loop {
                    let work = { work_rx.lock().await.recv().await };
                    let Some((index, agent)) = work else {
                        break;
                    };

                    debug!(worker_id, agent = agent.name(), "invoking agent");
                    let result = invoke_agent(agent.as_ref(), &ctx, timeout).await;

                    if result_tx
                        .send((index, agent.name().to_string(), result))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
            worker_handles.push(handle);
        }
        drop(result_tx);

        for (index, agent) in self.agents.iter().enumerate() {
            // Channel capacity equals agent count, so this never blocks
            let _ = work_tx.send((index, Arc::clone(agent))).await;
        }
        drop(work_tx);

        let mut settled: Vec<Option<(String, AgentResult)>> =
            (0..self.agents.len()).map(|_| None).collect();
        while let Some((index, name, result)) = result_rx.recv().await {
            settled[index] = Some((name, result));
        }

        for handle in worker_handles {
            let _ = handle.await;
        }

        settled.into_iter().flatten().collect()
    }
}

/// Run one agent under its deadline, converting an elapsed timeout into
/// a retryable failure and applying the optional global findings cap.
async fn invoke_agent(agent: &dyn Agent, ctx: &RunContext, timeout: Duration) -> AgentResult {
    let result = match tokio::time::timeout(timeout, agent.run(ctx)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(agent = agent.name(), "agent timed out");
            return AgentResult::Failed(Failure::timeout(
                agent.name(),
                format!("agent timed out after {}s", timeout.as_secs()),
            ));
        }
    };

    match result {
        AgentResult::Findings(findings) => {
            let findings = match ctx.max_findings_per_agent {
                Some(cap) => cap_findings(findings, cap),
                None => findings,
            };
            AgentResult::Findings(findings)
        }
        failed => failed,
    }
}

fn outcome_for(result: &AgentResult) -> AgentOutcome {
    match result {
        AgentResult::Findings(findings) => AgentOutcome::Success {
            findings: findings.len(),
        },
        AgentResult::Failed(failure) => AgentOutcome::Failed {
            kind: failure.kind,
            message: failure.message.clone(),
        },
    }
}

/// Move the run to its next state, asserting the transition is legal.
fn advance(state: &mut RunState, next: RunState, run_id: Uuid) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal run state transition {:?} -> {:?}",
        state,
        next
    );
    debug!(run_id = %run_id, from = ?state, to = ?next, "run state transition");
    *state = next;
}

/// Execute one daily cycle: invoke the configured agents, merge their
/// findings into a digest, deliver it, and report the outcome.
///
/// This is the single externally invoked operation of the core.
pub async fn run_daily_cycle(
    config: RunConfig,
    agents: Vec<Arc<dyn Agent>>,
    sink: Arc<dyn NotificationSink>,
) -> RunReport {
    Coordinator::new(config, sink).with_agents(agents).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use daybreak_core::{
        CapabilityError, Digest, ErrorKind, Finding, FindingKind, Priority,
    };
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StaticAgent {
        name: &'static str,
        result: AgentResult,
    }

    #[async_trait]
    impl Agent for StaticAgent {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, _ctx: &RunContext) -> AgentResult {
            self.result.clone()
        }
    }

    struct HangingAgent;

    #[async_trait]
    impl Agent for HangingAgent {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn run(&self, _ctx: &RunContext) -> AgentResult {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            AgentResult::Findings(vec![])
        }
    }

    struct CountingSink {
        sends: AtomicU32,
    }

    impl CountingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sends: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl NotificationSink for CountingSink {
        async fn send(&self, _digest: &Digest) -> Result<(), CapabilityError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RejectingSink;

    #[async_trait]
    impl NotificationSink for RejectingSink {
        async fn send(&self, _digest: &Digest) -> Result<(), CapabilityError> {
            Err(CapabilityError::Rejected("bad channel".into()))
        }
    }

    fn finding(agent: &str, priority: Priority, key: &str) -> Finding {
        Finding {
            source_agent: agent.into(),
            kind: FindingKind::Summary,
            title: key.into(),
            body: String::new(),
            priority,
            timestamp: Utc::now(),
            dedup_key: key.into(),
        }
    }

    fn ok_agent(name: &'static str, findings: Vec<Finding>) -> Arc<dyn Agent> {
        Arc::new(StaticAgent {
            name,
            result: AgentResult::Findings(findings),
        })
    }

    fn failing_agent(name: &'static str) -> Arc<dyn Agent> {
        Arc::new(StaticAgent {
            name,
            result: AgentResult::Failed(Failure {
                agent_name: name.into(),
                kind: ErrorKind::Processing,
                message: "garbled input".into(),
                retryable: false,
            }),
        })
    }

    #[tokio::test]
    async fn all_successful_run_completes() {
        let sink = CountingSink::new();
        let report = run_daily_cycle(
            RunConfig::default(),
            vec![
                ok_agent("email", vec![finding("email", Priority::High, "e1")]),
                ok_agent("calendar", vec![finding("calendar", Priority::Low, "c1")]),
            ],
            sink.clone(),
        )
        .await;

        assert_eq!(report.state, RunState::Completed);
        assert!(report.digest_delivered);
        assert_eq!(report.agent_outcomes.len(), 2);
        assert_eq!(sink.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn partial_failure_degrades_but_delivers() {
        let sink = CountingSink::new();
        let report = run_daily_cycle(
            RunConfig::default(),
            vec![
                ok_agent("email", vec![finding("email", Priority::High, "e1")]),
                failing_agent("meeting_notes"),
            ],
            sink.clone(),
        )
        .await;

        assert_eq!(report.state, RunState::Degraded);
        assert!(report.digest_delivered);
        assert!(matches!(
            report.agent_outcomes["meeting_notes"],
            AgentOutcome::Failed {
                kind: ErrorKind::Processing,
                ..
            }
        ));
        assert!(matches!(
            report.agent_outcomes["email"],
            AgentOutcome::Success { findings: 1 }
        ));
    }

    #[tokio::test]
    async fn total_failure_skips_delivery() {
        let sink = CountingSink::new();
        let report = run_daily_cycle(
            RunConfig::default(),
            vec![failing_agent("email"), failing_agent("calendar")],
            sink.clone(),
        )
        .await;

        assert_eq!(report.state, RunState::Failed);
        assert!(!report.digest_delivered);
        assert!(report.delivery_attempts.is_empty());
        assert_eq!(sink.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_delivery_fails_run_despite_agent_success() {
        let report = run_daily_cycle(
            RunConfig::default(),
            vec![ok_agent("email", vec![finding("email", Priority::High, "e1")])],
            Arc::new(RejectingSink),
        )
        .await;

        assert_eq!(report.state, RunState::Failed);
        assert!(!report.digest_delivered);
        assert_eq!(report.delivery_attempts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hang_becomes_timeout_failure_and_run_degrades() {
        let sink = CountingSink::new();
        let config = RunConfig {
            agent_timeout_secs: 1,
            ..Default::default()
        };

        let report = run_daily_cycle(
            config,
            vec![
                ok_agent("email", vec![finding("email", Priority::High, "e1")]),
                Arc::new(HangingAgent),
            ],
            sink.clone(),
        )
        .await;

        assert_eq!(report.state, RunState::Degraded);
        assert!(matches!(
            report.agent_outcomes["hanging"],
            AgentOutcome::Failed {
                kind: ErrorKind::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn no_agents_still_delivers_empty_digest() {
        let sink = CountingSink::new();
        let report = run_daily_cycle(RunConfig::default(), vec![], sink.clone()).await;

        assert_eq!(report.state, RunState::Completed);
        assert!(report.digest_delivered);
        assert!(report.agent_outcomes.is_empty());
        assert_eq!(sink.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn global_cap_applies_to_every_agent() {
        let sink = CountingSink::new();
        let config = RunConfig {
            max_findings_per_agent: Some(1),
            ..Default::default()
        };

        let report = run_daily_cycle(
            config,
            vec![ok_agent(
                "calendar",
                vec![
                    finding("calendar", Priority::Low, "c1"),
                    finding("calendar", Priority::Urgent, "c2"),
                ],
            )],
            sink.clone(),
        )
        .await;

        assert!(matches!(
            report.agent_outcomes["calendar"],
            AgentOutcome::Success { findings: 1 }
        ));
    }

    #[tokio::test]
    async fn concurrency_of_one_still_settles_everything() {
        let sink = CountingSink::new();
        let config = RunConfig {
            max_concurrency: 1,
            ..Default::default()
        };

        let report = run_daily_cycle(
            config,
            vec![
                ok_agent("email", vec![]),
                ok_agent("calendar", vec![]),
                failing_agent("meeting_notes"),
            ],
            sink.clone(),
        )
        .await;

        assert_eq!(report.agent_outcomes.len(), 3);
        assert_eq!(report.state, RunState::Degraded);
    }
}
