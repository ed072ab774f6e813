//! Log domain types

use serde::{Deserialize, Serialize};

/// A log line the gateway collected from the running job
///
/// Logs carry no type; termination is always decided from events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
