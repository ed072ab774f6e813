//! Folder transfer API endpoints

use crate::GatewayClient;
use crate::error::Result;
use hpcjob_core::domain::credential::AccessToken;
use hpcjob_core::dto::job::AccessQuery;
use hpcjob_core::dto::transfer::{TransferInitRequest, TransferStatusResponse};

impl GatewayClient {
    // =============================================================================
    // Managed Transfers
    // =============================================================================

    /// Start a managed download of a folder
    ///
    /// # Returns
    /// The gateway's acknowledgement, untouched
    pub async fn init_folder_download(
        &self,
        folder_id: &str,
        req: &TransferInitRequest,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint(&["folder", folder_id, "download", "globus-init"])?;
        let response = self.client.post(url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the state of a folder's managed download
    pub async fn get_folder_download_status(
        &self,
        folder_id: &str,
        token: &AccessToken,
    ) -> Result<TransferStatusResponse> {
        let url = self.endpoint(&["folder", folder_id, "download", "globus-status"])?;
        let response = self
            .client
            .get(url)
            .query(&AccessQuery {
                access_token: token,
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the state of the managed-transfer task attached to a job
    ///
    /// # Returns
    /// The gateway's task report, untouched
    pub async fn get_globus_task_status(
        &self,
        job_id: &str,
        token: &AccessToken,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint(&["file", job_id, "globus_task_status"])?;
        let response = self
            .client
            .get(url)
            .query(&AccessQuery {
                access_token: token,
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
