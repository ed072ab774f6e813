//! Job domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::credential::AccessToken;
use super::event::{EventType, JobEvent};
use super::folder::FolderRef;
use super::log::LogEntry;
use super::null_as_default;

/// Identity of one remote job
///
/// Assigned once at creation or reattach time and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobIdentity {
    pub id: String,
    pub hpc: Option<String>,
    pub access_token: AccessToken,
}

/// The gateway's view of a job
///
/// Read-only to the client. `events` and `logs` keep the gateway's insertion
/// order and are never reordered or deduplicated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: String,
    #[serde(default)]
    pub slurm_id: Option<String>,
    #[serde(default)]
    pub hpc: Option<String>,
    #[serde(default)]
    pub executable_folder: Option<FolderRef>,
    #[serde(default)]
    pub data_folder: Option<FolderRef>,
    #[serde(default)]
    pub result_folder: Option<FolderRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub param: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub env: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slurm: Map<String, Value>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<JobEvent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<LogEntry>,
}

impl JobSnapshot {
    /// Result folder, if the gateway has populated a usable one
    pub fn ready_result_folder(&self) -> Option<&FolderRef> {
        self.result_folder.as_ref().filter(|folder| !folder.is_empty())
    }

    /// Terminal outcome visible in this snapshot, scanning every event
    pub fn outcome(&self) -> Option<JobOutcome> {
        JobOutcome::from_events(&self.events)
    }
}

/// How a job lifecycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Ended,
    Failed,
}

impl JobOutcome {
    /// Derives the outcome from an event sequence
    ///
    /// Returns `None` while no terminal event is present. A `JOB_FAILED`
    /// anywhere in the sequence wins over `JOB_ENDED`.
    pub fn from_events(events: &[JobEvent]) -> Option<Self> {
        let mut outcome = None;
        for event in events {
            match event.event_type {
                EventType::JobFailed => return Some(JobOutcome::Failed),
                EventType::JobEnded => outcome = Some(JobOutcome::Ended),
                _ => {}
            }
        }
        outcome
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, JobOutcome::Failed)
    }
}

/// Partial job configuration
///
/// Only fields that are set are sent to the gateway. Empty maps count as
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_folder: Option<FolderRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_folder: Option<FolderRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_folder: Option<FolderRef>,
    #[serde(rename = "param", default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(rename = "env", default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<HashMap<String, String>>,
    #[serde(rename = "slurm", default, skip_serializing_if = "Option::is_none")]
    pub scheduler_directives: Option<Map<String, Value>>,
}

impl JobConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable_folder(mut self, folder: impl Into<FolderRef>) -> Self {
        self.executable_folder = Some(folder.into());
        self
    }

    pub fn data_folder(mut self, folder: impl Into<FolderRef>) -> Self {
        self.data_folder = Some(folder.into());
        self
    }

    pub fn result_folder(mut self, folder: impl Into<FolderRef>) -> Self {
        self.result_folder = Some(folder.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a scheduler directive such as `partition`, `walltime` or `num_of_node`
    pub fn slurm(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scheduler_directives
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Number of fields that would be sent
    pub fn field_count(&self) -> usize {
        [
            self.executable_folder.is_some(),
            self.data_folder.is_some(),
            self.result_folder.is_some(),
            self.parameters.as_ref().is_some_and(|m| !m.is_empty()),
            self.environment.as_ref().is_some_and(|m| !m.is_empty()),
            self.scheduler_directives.as_ref().is_some_and(|m| !m.is_empty()),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Drops empty maps so they are not sent as explicit empty values
    pub fn normalized(mut self) -> Self {
        self.parameters.take_if(|m| m.is_empty());
        self.environment.take_if(|m| m.is_empty());
        self.scheduler_directives.take_if(|m| m.is_empty());
        self
    }
}
