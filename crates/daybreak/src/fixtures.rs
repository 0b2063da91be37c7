//! Fixture-backed capability adapters.
//!
//! These adapters read local JSON files instead of talking to remote
//! providers, which keeps the binary runnable without credentials. A
//! missing file is an empty source; an unreadable or malformed file is
//! a capability error, exercised the same way a remote failure would be.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use daybreak_core::{
    CapabilityError, EventSource, MeetingTranscript, MessageSource, RawEvent, RawMessage,
    TranscriptExtraction, TranscriptProcessor,
};
use serde::de::DeserializeOwned;
use tracing::debug;

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CapabilityError> {
    if !path.exists() {
        debug!(path = %path.display(), "fixture file missing, treating as empty");
        return Ok(Vec::new());
    }

    let data = std::fs::read_to_string(path).map_err(|e| {
        CapabilityError::Connectivity(format!("failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&data).map_err(|e| {
        CapabilityError::Processing(format!("malformed fixture {}: {}", path.display(), e))
    })
}

/// Message source reading `messages.json`.
pub struct FixtureMessageSource {
    path: PathBuf,
}

impl FixtureMessageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageSource for FixtureMessageSource {
    async fn fetch_unread(&self) -> Result<Vec<RawMessage>, CapabilityError> {
        load_json(&self.path)
    }
}

/// Event source reading `events.json`, filtered to the requested window.
pub struct FixtureEventSource {
    path: PathBuf,
}

impl FixtureEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventSource for FixtureEventSource {
    async fn fetch_upcoming(&self, window: Duration) -> Result<Vec<RawEvent>, CapabilityError> {
        let now = Utc::now();
        let horizon = now + window;
        let events: Vec<RawEvent> = load_json(&self.path)?;
        Ok(events
            .into_iter()
            .filter(|e| e.start >= now && e.start <= horizon)
            .collect())
    }
}

/// Load queued transcripts from `transcripts.json`.
pub fn load_transcripts(path: &Path) -> Result<Vec<MeetingTranscript>, CapabilityError> {
    load_json(path)
}

/// Keyword markers that open an action-item line.
const ACTION_MARKERS: &[&str] = &["action:", "todo:", "will ", "i'll ", "needs to "];

/// Keyword markers that open a decision line.
const DECISION_MARKERS: &[&str] = &["decision:", "decided", "we agreed", "agreed to "];

/// Line-oriented transcript processor.
///
/// A stand-in for a model-backed extractor: each transcript line that
/// carries an action or decision marker becomes one extracted item.
/// Input that is empty or not line-structured text is malformed.
pub struct HeuristicTranscriptProcessor;

#[async_trait]
impl TranscriptProcessor for HeuristicTranscriptProcessor {
    async fn extract(&self, transcript: &str) -> Result<TranscriptExtraction, CapabilityError> {
        if transcript.trim().is_empty() {
            return Err(CapabilityError::Processing("empty transcript".into()));
        }

        let mut extraction = TranscriptExtraction::default();

        for line in transcript.lines() {
            // Drop a leading "Speaker:" label before matching markers
            let content = line
                .split_once(':')
                .map(|(_, rest)| rest)
                .unwrap_or(line)
                .trim();
            if content.is_empty() {
                continue;
            }

            let lowered = line.to_lowercase();
            if ACTION_MARKERS.iter().any(|m| lowered.contains(m)) {
                extraction.action_items.push(content.to_string());
            } else if DECISION_MARKERS.iter().any(|m| lowered.contains(m)) {
                extraction.decisions.push(content.to_string());
            }
        }

        Ok(extraction)
    }
}
