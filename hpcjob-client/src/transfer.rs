//! Result transfer monitor
//!
//! Downloads a finished job's result folder through the gateway's managed
//! transfer endpoints. The monitor is created from a job whose latest
//! snapshot exposes a result folder; it starts the transfer and then polls
//! its status with the same primitive the event followers use.

use hpcjob_core::domain::folder::FolderRef;
use hpcjob_core::domain::job::{JobIdentity, JobSnapshot};
use hpcjob_core::domain::transfer::{TransferStatus, TransferTask};
use hpcjob_core::dto::transfer::{TransferInitRequest, TransferStatusResponse};
use tracing::{debug, info, warn};

use crate::Gateway;
use crate::error::{ClientError, Result};
use crate::poll::{PollOptions, poll_until_terminal};
use crate::render::Renderer;

/// Where a result folder should be copied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Path inside the result folder to copy from
    pub from_path: String,
    /// Destination path on the receiving endpoint
    pub to_path: String,
    /// Managed-transfer endpoint receiving the files
    pub to_endpoint: String,
}

impl TransferRequest {
    pub fn new(
        from_path: impl Into<String>,
        to_path: impl Into<String>,
        to_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            from_path: from_path.into(),
            to_path: to_path.into(),
            to_endpoint: to_endpoint.into(),
        }
    }
}

/// How long a transfer call waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Poll until the transfer succeeds or fails
    UntilTerminal,
    /// Return the first status response, whatever it says
    FirstResponse,
}

/// Drives one result-folder transfer for a job
pub struct TransferMonitor<'a, G: Gateway> {
    gateway: &'a G,
    identity: &'a JobIdentity,
    folder: FolderRef,
    renderer: &'a mut dyn Renderer,
    options: PollOptions,
}

impl<'a, G: Gateway> TransferMonitor<'a, G> {
    /// Prepares a monitor for the result folder of `snapshot`
    ///
    /// Fails with [`ClientError::NotReady`] while the snapshot has no result
    /// folder, and with [`ClientError::Configuration`] when the folder is not
    /// a `globus://` reference or bare id. No request is made here.
    pub fn new(
        gateway: &'a G,
        identity: &'a JobIdentity,
        snapshot: Option<&JobSnapshot>,
        renderer: &'a mut dyn Renderer,
        options: PollOptions,
    ) -> Result<Self> {
        let folder = snapshot
            .and_then(JobSnapshot::ready_result_folder)
            .cloned()
            .ok_or_else(|| {
                ClientError::NotReady(format!(
                    "result folder of job {} is not ready",
                    identity.id
                ))
            })?;

        if !folder.is_managed_transfer() {
            return Err(ClientError::Configuration(format!(
                "result folder {} of job {} cannot be downloaded through managed transfer",
                folder, identity.id
            )));
        }

        Ok(Self {
            gateway,
            identity,
            folder,
            renderer,
            options,
        })
    }

    /// The result folder this monitor transfers
    pub fn folder(&self) -> &FolderRef {
        &self.folder
    }

    /// Starts the transfer and watches it according to `mode`
    pub async fn run(self, request: TransferRequest, mode: WaitMode) -> Result<TransferTask> {
        let TransferMonitor {
            gateway,
            identity,
            folder,
            renderer,
            options,
        } = self;

        let mut task = TransferTask {
            folder_id: folder.folder_id().to_string(),
            source_path: request.from_path,
            destination_path: request.to_path,
            destination_endpoint: request.to_endpoint,
            status: TransferStatus::Pending,
        };

        info!(
            "Starting transfer of folder {} for job {} to {}:{}",
            task.folder_id, identity.id, task.destination_endpoint, task.destination_path
        );

        let ack = gateway
            .init_transfer(
                &task.folder_id,
                &TransferInitRequest {
                    job_id: identity.id.clone(),
                    access_token: identity.access_token.clone(),
                    from_path: task.source_path.clone(),
                    to_path: task.destination_path.clone(),
                    to_endpoint: task.destination_endpoint.clone(),
                },
            )
            .await?;
        debug!("Transfer init acknowledged: {}", ack);

        let pending = &task;
        let folder_id = task.folder_id.as_str();
        let token = &identity.access_token;

        let response = poll_until_terminal(
            move || gateway.transfer_status(folder_id, token),
            |response: &TransferStatusResponse| {
                mode == WaitMode::FirstResponse || response.status.is_terminal()
            },
            |response: &TransferStatusResponse| {
                renderer.clear();
                renderer.render_transfer(&TransferTask {
                    status: response.status,
                    ..pending.clone()
                });
            },
            options,
        )
        .await?;

        task.status = response.status;

        match task.status {
            TransferStatus::Succeeded => {
                info!("Transfer of folder {} succeeded", task.folder_id);
                renderer.notice("✅ download success!");
            }
            TransferStatus::Failed => {
                warn!("Transfer of folder {} failed", task.folder_id);
                renderer.notice("❌ download fail!");
            }
            TransferStatus::Pending | TransferStatus::Unknown => {
                debug!(
                    "Returning in-flight transfer of folder {} ({})",
                    task.folder_id, task.status
                );
            }
        }

        Ok(task)
    }
}
