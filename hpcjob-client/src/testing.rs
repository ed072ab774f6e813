//! Scripted gateway and recording renderer shared by unit tests

use async_trait::async_trait;
use hpcjob_core::domain::credential::AccessToken;
use hpcjob_core::domain::event::JobEvent;
use hpcjob_core::domain::job::JobSnapshot;
use hpcjob_core::domain::transfer::{TransferStatus, TransferTask};
use hpcjob_core::dto::job::{CreateJobRequest, CreatedJob, JobTokenRequest, UpdateJobRequest};
use hpcjob_core::dto::transfer::{TransferInitRequest, TransferStatusResponse};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::Gateway;
use crate::error::{ClientError, Result};
use crate::render::Renderer;

/// A request the scripted gateway received, with its JSON body where there is one
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GatewayCall {
    CreateJob(Value),
    GetJob(String),
    SubmitJob(String),
    UpdateJob(String, Value),
    ResultFolderContent(String),
    InitTransfer(String, Value),
    TransferStatus(String),
    GlobusTaskStatus(String),
}

/// In-memory gateway answering from queues filled by the test
pub(crate) struct ScriptedGateway {
    job_id: String,
    token: AccessToken,
    create_response: Mutex<Option<CreatedJob>>,
    polls: Mutex<VecDeque<Result<JobSnapshot>>>,
    responses: Mutex<VecDeque<JobSnapshot>>,
    transfer_statuses: Mutex<VecDeque<TransferStatus>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    /// Gateway owning one job `job_id` on hpc `h1`, readable with `token`
    pub(crate) fn new(job_id: &str, token: &str) -> Self {
        let mut created = snapshot(job_id, &[]);
        created.hpc = Some("h1".to_string());
        Self {
            job_id: job_id.to_string(),
            token: AccessToken::new(token),
            create_response: Mutex::new(Some(CreatedJob {
                secret_token: Some(AccessToken::new(token)),
                snapshot: created,
            })),
            polls: Mutex::new(VecDeque::new()),
            responses: Mutex::new(VecDeque::new()),
            transfer_statuses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_create_response(self, created: CreatedJob) -> Self {
        *self.create_response.lock().unwrap() = Some(created);
        self
    }

    /// Queues the snapshot returned by the next `get_job`
    pub(crate) fn push_poll(&self, snapshot: JobSnapshot) {
        self.polls.lock().unwrap().push_back(Ok(snapshot));
    }

    pub(crate) fn push_poll_error(&self, error: ClientError) {
        self.polls.lock().unwrap().push_back(Err(error));
    }

    /// Queues one poll per prefix of `event_types`, so each poll sees one more event
    pub(crate) fn push_event_progression(&self, event_types: &[&str]) {
        for end in 1..=event_types.len() {
            self.push_poll(snapshot(&self.job_id, &event_types[..end]));
        }
    }

    /// Queues the snapshot returned by the next submit or update
    pub(crate) fn push_response(&self, snapshot: JobSnapshot) {
        self.responses.lock().unwrap().push_back(snapshot);
    }

    pub(crate) fn push_transfer_statuses(&self, statuses: &[TransferStatus]) {
        self.transfer_statuses
            .lock()
            .unwrap()
            .extend(statuses.iter().copied());
    }

    pub(crate) fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, matches: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn authorize(&self, job_id: &str, token: &AccessToken) -> Result<()> {
        if job_id != self.job_id {
            return Err(ClientError::api_error(404, "job not found"));
        }
        if token != &self.token {
            return Err(ClientError::api_error(401, "invalid access token"));
        }
        Ok(())
    }

    fn next_response(&self, job_id: &str) -> JobSnapshot {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| snapshot(job_id, &[]))
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn create_job(&self, req: &CreateJobRequest) -> Result<CreatedJob> {
        self.record(GatewayCall::CreateJob(serde_json::to_value(req).unwrap()));
        self.create_response
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ClientError::api_error(500, "no scripted create response"))
    }

    async fn get_job(&self, job_id: &str, token: &AccessToken) -> Result<JobSnapshot> {
        self.record(GatewayCall::GetJob(job_id.to_string()));
        self.authorize(job_id, token)?;
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api_error(500, "no scripted snapshot left")))
    }

    async fn submit_job(&self, job_id: &str, req: &JobTokenRequest) -> Result<JobSnapshot> {
        self.record(GatewayCall::SubmitJob(job_id.to_string()));
        self.authorize(job_id, &req.access_token)?;
        Ok(self.next_response(job_id))
    }

    async fn update_job(&self, job_id: &str, req: &UpdateJobRequest) -> Result<JobSnapshot> {
        self.record(GatewayCall::UpdateJob(
            job_id.to_string(),
            serde_json::to_value(req).unwrap(),
        ));
        self.authorize(job_id, &req.access_token)?;
        Ok(self.next_response(job_id))
    }

    async fn result_folder_content(&self, job_id: &str, token: &AccessToken) -> Result<Value> {
        self.record(GatewayCall::ResultFolderContent(job_id.to_string()));
        self.authorize(job_id, token)?;
        Ok(json!(["output.txt"]))
    }

    async fn init_transfer(&self, folder_id: &str, req: &TransferInitRequest) -> Result<Value> {
        self.record(GatewayCall::InitTransfer(
            folder_id.to_string(),
            serde_json::to_value(req).unwrap(),
        ));
        self.authorize(&req.job_id, &req.access_token)?;
        Ok(json!({"success": true}))
    }

    async fn transfer_status(
        &self,
        folder_id: &str,
        _token: &AccessToken,
    ) -> Result<TransferStatusResponse> {
        self.record(GatewayCall::TransferStatus(folder_id.to_string()));
        let status = self
            .transfer_statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::api_error(500, "no scripted transfer status left"))?;
        Ok(TransferStatusResponse { status })
    }
    async fn globus_task_status(&self, job_id: &str, token: &AccessToken) -> Result<Value> {
        self.record(GatewayCall::GlobusTaskStatus(job_id.to_string()));
        self.authorize(job_id, token)?;
        Ok(json!({"status": "SUCCEEDED"}))
    }
}

/// Builds a snapshot of job `id` carrying events of the given types
pub(crate) fn snapshot(id: &str, event_types: &[&str]) -> JobSnapshot {
    let events: Vec<Value> = event_types
        .iter()
        .map(|t| json!({"type": t, "message": format!("{t} happened"), "createdAt": "2024-03-01T12:00:00Z"}))
        .collect();
    serde_json::from_value(json!({
        "id": id,
        "hpc": "h1",
        "maintainer": "m1",
        "events": events,
        "logs": [{"message": "hello from the job", "createdAt": "2024-03-01T12:00:00Z"}]
    }))
    .unwrap()
}

/// What a [`RecordingRenderer`] was asked to draw
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    Clear,
    Job(String),
    Events(Vec<String>),
    Logs(usize),
    Transfer(TransferStatus),
    Notice(String),
}

/// Renderer recording frames into a buffer the test keeps a handle to
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingRenderer {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingRenderer {
    pub(crate) fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    fn push(&self, frame: Frame) {
        self.frames.lock().unwrap().push(frame);
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        self.push(Frame::Clear);
    }

    fn render_job(&mut self, snapshot: &JobSnapshot) {
        self.push(Frame::Job(snapshot.id.clone()));
    }

    fn render_events(&mut self, _snapshot: &JobSnapshot, events: &[&JobEvent]) {
        self.push(Frame::Events(
            events
                .iter()
                .map(|e| e.event_type.as_str().to_string())
                .collect(),
        ));
    }

    fn render_logs(&mut self, snapshot: &JobSnapshot) {
        self.push(Frame::Logs(snapshot.logs.len()));
    }

    fn render_transfer(&mut self, task: &TransferTask) {
        self.push(Frame::Transfer(task.status));
    }

    fn notice(&mut self, message: &str) {
        self.push(Frame::Notice(message.to_string()));
    }
}
