//! Result transfer DTOs

use serde::{Deserialize, Serialize};

use crate::domain::credential::AccessToken;
use crate::domain::transfer::TransferStatus;

/// Request to start a managed transfer of a result folder
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInitRequest {
    pub job_id: String,
    pub access_token: AccessToken,
    pub from_path: String,
    pub to_path: String,
    pub to_endpoint: String,
}

/// Transfer status as polled from the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStatusResponse {
    pub status: TransferStatus,
}
