//! Capability interfaces for external integrations.
//!
//! Each trait is the narrow contract the orchestration core requires
//! from one class of external collaborator. Adapters implement these
//! outside the core; the core never sees OAuth flows, wire formats, or
//! provider quirks.
//!
//! Contract guarantee shared by all four interfaces: every call is
//! idempotent-safe to retry from the caller's perspective. An adapter
//! whose failure leaves a partial side effect visible must not surface
//! it as a plain retryable error.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;
use crate::types::Digest;

/// An unread message as surfaced by a mail integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Provider-stable message identifier.
    pub id: String,
    /// Sender address or display name.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text snippet of the body.
    pub snippet: String,
    /// Whether the provider marked the message important.
    #[serde(default)]
    pub flagged: bool,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
}

/// An upcoming event as surfaced by a calendar integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Provider-stable event identifier.
    pub id: String,
    /// Event title.
    pub title: String,
    /// When the event starts.
    pub start: DateTime<Utc>,
    /// Attendee addresses.
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Whether the organizer explicitly flagged the event important.
    #[serde(default)]
    pub flagged: bool,
    /// Join link or room, when the provider carries one.
    #[serde(default)]
    pub location: Option<String>,
}

/// A meeting transcript queued for processing in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTranscript {
    /// Identifier of the meeting the transcript belongs to.
    pub meeting_id: String,
    /// Meeting title.
    pub title: String,
    /// Full transcript text.
    pub text: String,
}

/// Structured output of transcript processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptExtraction {
    /// Action items, one per entry.
    pub action_items: Vec<String>,
    /// Decisions made, one per entry.
    pub decisions: Vec<String>,
}

/// Source of unread messages.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch the currently unread messages.
    async fn fetch_unread(&self) -> Result<Vec<RawMessage>, CapabilityError>;
}

/// Source of upcoming calendar events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch events starting within the given forward-looking window.
    async fn fetch_upcoming(&self, window: Duration) -> Result<Vec<RawEvent>, CapabilityError>;
}

/// Extracts structured items from a meeting transcript.
#[async_trait]
pub trait TranscriptProcessor: Send + Sync {
    /// Extract action items and decisions from transcript text.
    ///
    /// Fails with [`CapabilityError::Processing`] on malformed input.
    async fn extract(&self, transcript: &str) -> Result<TranscriptExtraction, CapabilityError>;
}

/// Destination for the assembled digest.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver the digest.
    ///
    /// Fails with [`CapabilityError::Delivery`] when a retry may
    /// succeed, or [`CapabilityError::Rejected`] when it cannot.
    async fn send(&self, digest: &Digest) -> Result<(), CapabilityError>;
}
