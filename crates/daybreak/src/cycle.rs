//! Wiring for one daily cycle.

use std::path::Path;
use std::sync::Arc;

use miette::Result;
use tracing::info;

use daybreak_agent::{
    Agent, CalendarAgent, EmailAgent, MeetingNotesAgent, NotificationAgent,
};
use daybreak_core::{NotificationSink, RunConfig};
use daybreak_runner::run_daily_cycle;

use crate::fixtures::{
    FixtureEventSource, FixtureMessageSource, HeuristicTranscriptProcessor, load_transcripts,
};
use crate::sink::{LogSink, WebhookSink};

/// Assemble the agents over the data directory, execute one cycle, and
/// print the run report as JSON.
pub async fn run(data_dir: &Path, webhook_url: Option<&str>, mut config: RunConfig) -> Result<()> {
    config.transcripts = load_transcripts(&data_dir.join("transcripts.json"))
        .map_err(|e| miette::miette!("failed to load transcripts: {}", e))?;

    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(EmailAgent::new(Arc::new(FixtureMessageSource::new(
            data_dir.join("messages.json"),
        )))),
        Arc::new(CalendarAgent::new(Arc::new(FixtureEventSource::new(
            data_dir.join("events.json"),
        )))),
        Arc::new(MeetingNotesAgent::new(Arc::new(
            HeuristicTranscriptProcessor,
        ))),
    ];

    let sink: Arc<dyn NotificationSink> = match webhook_url {
        Some(url) => {
            info!(url, "delivering digest to webhook");
            Arc::new(WebhookSink::new(url))
        }
        None => Arc::new(LogSink),
    };
    let notification = NotificationAgent::new(sink);

    let report = run_daily_cycle(config, agents, notification.sink()).await;

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| miette::miette!("failed to serialize run report: {}", e))?;
    println!("{}", json);

    Ok(())
}
