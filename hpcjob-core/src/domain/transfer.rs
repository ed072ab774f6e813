//! Result transfer domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a managed transfer as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Pending,
    Succeeded,
    Failed,
    /// Any status this client does not know; treated as still in flight
    #[serde(other)]
    Unknown,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Succeeded | TransferStatus::Failed)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Succeeded => "SUCCEEDED",
            TransferStatus::Failed => "FAILED",
            TransferStatus::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// A download of a job's result folder through the managed-transfer service
///
/// Lives only for the duration of one download call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTask {
    pub folder_id: String,
    pub source_path: String,
    pub destination_path: String,
    pub destination_endpoint: String,
    pub status: TransferStatus,
}
