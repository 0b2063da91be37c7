//! Core data model and capability contracts for Daybreak.
//!
//! This crate is the leaf of the workspace: it defines the typed
//! vocabulary the rest of the system speaks (findings, digests, run
//! reports), the capability interfaces that external integrations
//! implement, and the error taxonomy shared across crates.

mod capability;
mod config;
mod error;
mod types;

pub use capability::{
    EventSource, MeetingTranscript, MessageSource, NotificationSink, RawEvent, RawMessage,
    TranscriptExtraction, TranscriptProcessor,
};
pub use config::RunConfig;
pub use error::CapabilityError;
pub use types::{
    AgentOutcome, AgentResult, AttemptOutcome, DeliveryAttempt, Digest, ErrorKind, Failure,
    Finding, FindingKind, Priority, RunReport, RunState,
};
