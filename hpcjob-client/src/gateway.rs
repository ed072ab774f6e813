//! Gateway abstraction
//!
//! The job handle, pollers and transfer monitor talk to the gateway through
//! this trait so tests can swap in a scripted implementation.

use async_trait::async_trait;
use hpcjob_core::domain::credential::AccessToken;
use hpcjob_core::domain::job::JobSnapshot;
use hpcjob_core::dto::job::{CreateJobRequest, CreatedJob, JobTokenRequest, UpdateJobRequest};
use hpcjob_core::dto::transfer::{TransferInitRequest, TransferStatusResponse};

use crate::GatewayClient;
use crate::error::Result;

/// Operations the compute gateway exposes
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Creates a job and returns its snapshot and job-scoped secret
    async fn create_job(&self, req: &CreateJobRequest) -> Result<CreatedJob>;

    /// Fetches a fresh snapshot of a job
    async fn get_job(&self, job_id: &str, token: &AccessToken) -> Result<JobSnapshot>;

    /// Submits a job to its scheduler
    async fn submit_job(&self, job_id: &str, req: &JobTokenRequest) -> Result<JobSnapshot>;

    /// Applies a partial configuration update
    async fn update_job(&self, job_id: &str, req: &UpdateJobRequest) -> Result<JobSnapshot>;

    /// Lists a job's result folder
    async fn result_folder_content(
        &self,
        job_id: &str,
        token: &AccessToken,
    ) -> Result<serde_json::Value>;

    /// Starts a managed download of a folder
    async fn init_transfer(
        &self,
        folder_id: &str,
        req: &TransferInitRequest,
    ) -> Result<serde_json::Value>;

    /// Polls the state of a folder's managed download
    async fn transfer_status(
        &self,
        folder_id: &str,
        token: &AccessToken,
    ) -> Result<TransferStatusResponse>;
    /// Reports the managed-transfer task attached to a job
    async fn globus_task_status(
        &self,
        job_id: &str,
        token: &AccessToken,
    ) -> Result<serde_json::Value>;
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn create_job(&self, req: &CreateJobRequest) -> Result<CreatedJob> {
        GatewayClient::create_job(self, req).await
    }

    async fn get_job(&self, job_id: &str, token: &AccessToken) -> Result<JobSnapshot> {
        GatewayClient::get_job(self, job_id, token).await
    }

    async fn submit_job(&self, job_id: &str, req: &JobTokenRequest) -> Result<JobSnapshot> {
        GatewayClient::submit_job(self, job_id, req).await
    }

    async fn update_job(&self, job_id: &str, req: &UpdateJobRequest) -> Result<JobSnapshot> {
        GatewayClient::update_job(self, job_id, req).await
    }

    async fn result_folder_content(
        &self,
        job_id: &str,
        token: &AccessToken,
    ) -> Result<serde_json::Value> {
        self.get_result_folder_content(job_id, token).await
    }

    async fn init_transfer(
        &self,
        folder_id: &str,
        req: &TransferInitRequest,
    ) -> Result<serde_json::Value> {
        self.init_folder_download(folder_id, req).await
    }

    async fn transfer_status(
        &self,
        folder_id: &str,
        token: &AccessToken,
    ) -> Result<TransferStatusResponse> {
        self.get_folder_download_status(folder_id, token).await
    }
    async fn globus_task_status(
        &self,
        job_id: &str,
        token: &AccessToken,
    ) -> Result<serde_json::Value> {
        self.get_globus_task_status(job_id, token).await
    }
}
