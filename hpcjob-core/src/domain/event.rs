//! Job event domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event types shown when a caller asks for the basic event view
pub const BASIC_EVENT_TYPES: [EventType; 6] = [
    EventType::JobQueued,
    EventType::JobRegistered,
    EventType::JobInit,
    EventType::GlobusTransferInitSuccess,
    EventType::JobEnded,
    EventType::JobFailed,
];

/// Type of a job event
///
/// The gateway may add types at any time. Anything not listed here is kept
/// verbatim in [`EventType::Other`] and is neither basic nor terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    JobQueued,
    JobRegistered,
    JobInit,
    GlobusTransferInitSuccess,
    JobEnded,
    JobFailed,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::JobQueued => "JOB_QUEUED",
            EventType::JobRegistered => "JOB_REGISTERED",
            EventType::JobInit => "JOB_INIT",
            EventType::GlobusTransferInitSuccess => "GLOBUS_TRANSFER_INIT_SUCCESS",
            EventType::JobEnded => "JOB_ENDED",
            EventType::JobFailed => "JOB_FAILED",
            EventType::Other(raw) => raw,
        }
    }

    /// Whether this event ends the job lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventType::JobEnded | EventType::JobFailed)
    }

    /// Whether this event belongs to the basic display set
    pub fn is_basic(&self) -> bool {
        BASIC_EVENT_TYPES.contains(self)
    }
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "JOB_QUEUED" => EventType::JobQueued,
            "JOB_REGISTERED" => EventType::JobRegistered,
            "JOB_INIT" => EventType::JobInit,
            "GLOBUS_TRANSFER_INIT_SUCCESS" => EventType::GlobusTransferInitSuccess,
            "JOB_ENDED" => EventType::JobEnded,
            "JOB_FAILED" => EventType::JobFailed,
            _ => EventType::Other(raw),
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event recorded by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
