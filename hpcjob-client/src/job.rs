//! Job handle
//!
//! [`Job`] is the in-process proxy for one remote job. It is built by
//! [`JobBuilder`] either by creating a new job or by attaching to an existing
//! one, and from then on mediates every read and write against that job.
//!
//! Nothing here polls in the background: the follow methods run their loop on
//! the caller's task and return once the job reaches a terminal event.

use hpcjob_core::domain::credential::AccessToken;
use hpcjob_core::domain::event::JobEvent;
use hpcjob_core::domain::job::{JobConfiguration, JobIdentity, JobOutcome, JobSnapshot};
use hpcjob_core::domain::log::LogEntry;
use hpcjob_core::domain::transfer::TransferTask;
use hpcjob_core::dto::job::{CreateJobRequest, JobTokenRequest, UpdateJobRequest};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::poll::{PollOptions, poll_until_terminal};
use crate::render::{Renderer, TerminalRenderer};
use crate::transfer::{TransferMonitor, TransferRequest, WaitMode};
use crate::{Gateway, GatewayClient};

/// Timing used by a job's polling loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub event_refresh_interval: Duration,
    pub log_refresh_interval: Duration,
    pub transfer_poll_interval: Duration,
    /// Deadline applied to each loop
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            event_refresh_interval: Duration::from_secs(10),
            log_refresh_interval: Duration::from_secs(15),
            transfer_poll_interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// Which events a follower draws
///
/// Only affects display. Terminal detection always scans every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Lifecycle milestones only
    #[default]
    Basic,
    /// Every event the gateway recorded
    All,
}

impl EventFilter {
    /// Selects the events to display, keeping gateway order
    pub fn select<'a>(&self, events: &'a [JobEvent]) -> Vec<&'a JobEvent> {
        events
            .iter()
            .filter(|event| match self {
                EventFilter::Basic => event.event_type.is_basic(),
                EventFilter::All => true,
            })
            .collect()
    }
}

/// Builder for [`Job`] handles
///
/// Use [`create`](JobBuilder::create) for a new job or
/// [`attach`](JobBuilder::attach) for an existing one.
pub struct JobBuilder<G: Gateway = GatewayClient> {
    gateway: Arc<G>,
    maintainer: Option<String>,
    hpc: Option<String>,
    auth_token: Option<AccessToken>,
    renderer: Box<dyn Renderer>,
    print_job: bool,
    settings: PollSettings,
}

impl<G: Gateway> JobBuilder<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            maintainer: None,
            hpc: None,
            auth_token: None,
            renderer: Box::new(TerminalRenderer::new()),
            print_job: true,
            settings: PollSettings::default(),
        }
    }

    /// Maintainer (job pool) the new job belongs to
    pub fn maintainer(mut self, maintainer: impl Into<String>) -> Self {
        self.maintainer = Some(maintainer.into());
        self
    }

    /// Requests a specific HPC; otherwise the gateway chooses
    pub fn hpc(mut self, hpc: impl Into<String>) -> Self {
        self.hpc = Some(hpc.into());
        self
    }

    /// Authentication capability used to create jobs
    ///
    /// Also forwarded on submit and configure, as the gateway expects.
    pub fn auth_token(mut self, token: impl Into<AccessToken>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Whether the initial snapshot is rendered
    pub fn print_job(mut self, print_job: bool) -> Self {
        self.print_job = print_job;
        self
    }

    pub fn settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Creates a new job on the gateway
    pub async fn create(self) -> Result<Job<G>> {
        let maintainer = self.require_maintainer()?;
        let auth_token = self
            .auth_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ClientError::Configuration(
                    "an authentication token is required to create a job".to_string(),
                )
            })?;

        let req = CreateJobRequest {
            maintainer,
            hpc: self.hpc.clone(),
            jupyterhub_api_token: Some(auth_token),
            user: None,
            password: None,
        };

        self.finish_create(req).await
    }

    /// Creates a new job by logging in to the HPC directly
    ///
    /// The credentials are sent with the creation request and dropped right
    /// after it.
    #[deprecated(note = "use an authentication token with `create` instead")]
    pub async fn create_with_password(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Job<G>> {
        warn!("⚠️ HPC password input detected; do not distribute code with login credentials");
        self.renderer.notice(
            "⚠️ HPC password input detected, change your code to use an authentication token instead",
        );
        self.renderer
            .notice("🙅‍♂️ it's not safe to distribute code with login credentials");

        let maintainer = self.require_maintainer()?;
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Configuration(
                "both an HPC username and password are required".to_string(),
            ));
        }

        let req = CreateJobRequest {
            maintainer,
            hpc: self.hpc.clone(),
            jupyterhub_api_token: self.auth_token.clone(),
            user: Some(username),
            password: Some(password),
        };

        self.finish_create(req).await
    }

    /// Attaches to an existing job
    ///
    /// Fails with [`ClientError::NotFound`] when the gateway does not know the
    /// job or rejects the token.
    pub async fn attach(
        self,
        id: impl Into<String>,
        access_token: impl Into<AccessToken>,
    ) -> Result<Job<G>> {
        let id = id.into();
        let access_token = access_token.into();
        if id.is_empty() {
            return Err(ClientError::Configuration(
                "job id cannot be empty".to_string(),
            ));
        }
        if access_token.is_empty() {
            return Err(ClientError::Configuration(
                "access token cannot be empty".to_string(),
            ));
        }

        info!("Attaching to job {}", id);

        let snapshot = self
            .gateway
            .get_job(&id, &access_token)
            .await
            .map_err(|e| {
                if e.is_not_found() || e.is_unauthorized() {
                    ClientError::NotFound(format!("job {}: {}", id, e))
                } else {
                    e
                }
            })?;

        let identity = JobIdentity {
            hpc: snapshot.hpc.clone(),
            id,
            access_token,
        };
        self.into_job(identity, snapshot)
    }

    fn require_maintainer(&self) -> Result<String> {
        self.maintainer
            .clone()
            .filter(|maintainer| !maintainer.is_empty())
            .ok_or_else(|| {
                ClientError::Configuration("maintainer is required to create a job".to_string())
            })
    }

    async fn finish_create(self, req: CreateJobRequest) -> Result<Job<G>> {
        info!(
            "Creating job for maintainer {} (hpc: {})",
            req.maintainer,
            req.hpc.as_deref().unwrap_or("gateway default")
        );

        let created = self.gateway.create_job(&req).await?;
        let CreateJobRequest {
            jupyterhub_api_token,
            ..
        } = req;

        let access_token = created
            .secret_token
            .filter(|token| !token.is_empty())
            .or(jupyterhub_api_token)
            .ok_or_else(|| {
                ClientError::Lifecycle(format!(
                    "gateway returned no access token for job {}",
                    created.snapshot.id
                ))
            })?;

        let identity = JobIdentity {
            id: created.snapshot.id.clone(),
            hpc: created.snapshot.hpc.clone().or_else(|| self.hpc.clone()),
            access_token,
        };
        self.into_job(identity, created.snapshot)
    }

    fn into_job(self, identity: JobIdentity, snapshot: JobSnapshot) -> Result<Job<G>> {
        if identity.id.is_empty() {
            return Err(ClientError::Lifecycle(
                "gateway did not assign a job id".to_string(),
            ));
        }

        info!(
            "Job {} ready on {}",
            identity.id,
            identity.hpc.as_deref().unwrap_or("unknown hpc")
        );

        let mut job = Job {
            identity,
            auth_token: self.auth_token,
            gateway: self.gateway,
            renderer: self.renderer,
            settings: self.settings,
            last_snapshot: None,
        };
        if self.print_job {
            job.renderer.render_job(&snapshot);
        }
        job.last_snapshot = Some(snapshot);
        Ok(job)
    }
}

/// Handle to one remote job
pub struct Job<G: Gateway = GatewayClient> {
    identity: JobIdentity,
    auth_token: Option<AccessToken>,
    gateway: Arc<G>,
    renderer: Box<dyn Renderer>,
    settings: PollSettings,
    last_snapshot: Option<JobSnapshot>,
}

impl<G: Gateway> fmt::Debug for Job<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("identity", &self.identity)
            .field("settings", &self.settings)
            .field("has_snapshot", &self.last_snapshot.is_some())
            .finish()
    }
}

impl<G: Gateway> Job<G> {
    pub fn identity(&self) -> &JobIdentity {
        &self.identity
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }

    pub fn hpc(&self) -> Option<&str> {
        self.identity.hpc.as_deref()
    }

    /// Snapshot from the most recent gateway response
    pub fn last_snapshot(&self) -> Option<&JobSnapshot> {
        self.last_snapshot.as_ref()
    }

    // =============================================================================
    // Lifecycle
    // =============================================================================

    /// Submits the job to its scheduler
    ///
    /// Not idempotent: calling twice submits twice.
    pub async fn submit(&mut self) -> Result<&mut Self> {
        info!("Submitting job {}", self.identity.id);

        let snapshot = self
            .gateway
            .submit_job(&self.identity.id, &self.token_request())
            .await?;

        self.renderer.notice("✅ job submitted");
        self.renderer.render_job(&snapshot);
        self.last_snapshot = Some(snapshot);
        Ok(self)
    }

    /// Applies a partial configuration
    ///
    /// An empty configuration is a caller mistake: it is reported and nothing
    /// is sent. Otherwise the gateway's merged snapshot replaces the cached
    /// one.
    pub async fn configure(&mut self, configuration: JobConfiguration) -> Result<()> {
        if configuration.is_empty() {
            warn!(
                "Ignoring configure call for job {} with no fields set",
                self.identity.id
            );
            self.renderer.notice("❌ please set at least one parameter");
            return Ok(());
        }

        debug!(
            "Updating {} field(s) of job {}",
            configuration.field_count(),
            self.identity.id
        );

        let req = UpdateJobRequest {
            configuration: configuration.normalized(),
            access_token: self.identity.access_token.clone(),
            jupyterhub_api_token: self.auth_token.clone(),
        };
        let snapshot = self.gateway.update_job(&self.identity.id, &req).await?;

        self.renderer.render_job(&snapshot);
        self.last_snapshot = Some(snapshot);
        Ok(())
    }

    // =============================================================================
    // Status
    // =============================================================================

    /// Fetches the job and renders it
    pub async fn status(&mut self) -> Result<()> {
        let snapshot = self.fetch().await?;
        self.renderer.render_job(&snapshot);
        self.last_snapshot = Some(snapshot);
        Ok(())
    }

    /// Fetches the job and returns the snapshot without rendering
    pub async fn snapshot(&mut self) -> Result<JobSnapshot> {
        let snapshot = self.fetch().await?;
        self.last_snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Current events, unfiltered, from a single fetch
    pub async fn events(&mut self) -> Result<Vec<JobEvent>> {
        Ok(self.snapshot().await?.events)
    }

    /// Current logs from a single fetch
    pub async fn logs(&mut self) -> Result<Vec<LogEntry>> {
        Ok(self.snapshot().await?.logs)
    }

    /// Lists the job's result folder
    pub async fn result_folder_content(&self) -> Result<serde_json::Value> {
        self.gateway
            .result_folder_content(&self.identity.id, &self.identity.access_token)
            .await
    }

    /// Reports the managed-transfer task the gateway attached to this job
    pub async fn globus_task_status(&self) -> Result<serde_json::Value> {
        self.gateway
            .globus_task_status(&self.identity.id, &self.identity.access_token)
            .await
    }

    // =============================================================================
    // Followers
    // =============================================================================

    /// Polls and renders events until the job ends or fails
    pub async fn follow_events(&mut self, filter: EventFilter) -> Result<JobOutcome> {
        let interval = self.settings.event_refresh_interval;
        self.follow_events_every(filter, interval).await
    }

    /// Like [`follow_events`](Job::follow_events) with an explicit refresh interval
    pub async fn follow_events_every(
        &mut self,
        filter: EventFilter,
        interval: Duration,
    ) -> Result<JobOutcome> {
        info!(
            "Following events of job {} every {:?}",
            self.identity.id, interval
        );
        self.follow(interval, |renderer, snapshot| {
            renderer.render_events(snapshot, &filter.select(&snapshot.events));
        })
        .await
    }

    /// Polls and renders logs until the job ends or fails
    pub async fn follow_logs(&mut self) -> Result<JobOutcome> {
        let interval = self.settings.log_refresh_interval;
        self.follow_logs_every(interval).await
    }

    /// Like [`follow_logs`](Job::follow_logs) with an explicit refresh interval
    pub async fn follow_logs_every(&mut self, interval: Duration) -> Result<JobOutcome> {
        info!(
            "Following logs of job {} every {:?}",
            self.identity.id, interval
        );
        self.follow(interval, |renderer, snapshot| {
            renderer.render_logs(snapshot);
        })
        .await
    }

    async fn follow<D>(&mut self, interval: Duration, mut draw: D) -> Result<JobOutcome>
    where
        D: FnMut(&mut dyn Renderer, &JobSnapshot),
    {
        let options = PollOptions::new(interval).with_timeout(self.settings.timeout);
        let gateway = &*self.gateway;
        let identity = &self.identity;
        let renderer = &mut self.renderer;
        let last_snapshot = &mut self.last_snapshot;

        let (snapshot, outcome) = poll_until_terminal(
            move || async move {
                let snapshot = gateway.get_job(&identity.id, &identity.access_token).await?;
                let outcome = snapshot.outcome();
                Ok::<_, ClientError>((snapshot, outcome))
            },
            |(_, outcome): &(JobSnapshot, Option<JobOutcome>)| outcome.is_some(),
            |(snapshot, _): &(JobSnapshot, Option<JobOutcome>)| {
                renderer.clear();
                draw(renderer.as_mut(), snapshot);
                *last_snapshot = Some(snapshot.clone());
            },
            options,
        )
        .await?;

        let outcome = outcome.ok_or_else(|| {
            ClientError::Lifecycle(format!(
                "polling of job {} stopped without a terminal event",
                snapshot.id
            ))
        })?;

        info!("Job {} reached terminal outcome {:?}", self.identity.id, outcome);
        Ok(outcome)
    }

    // =============================================================================
    // Results
    // =============================================================================

    /// Prepares a monitor for downloading the result folder
    ///
    /// Uses the cached snapshot; fails with [`ClientError::NotReady`] and no
    /// request while it has no result folder.
    pub fn transfer_monitor(&mut self) -> Result<TransferMonitor<'_, G>> {
        let options = PollOptions::new(self.settings.transfer_poll_interval)
            .with_timeout(self.settings.timeout);
        TransferMonitor::new(
            &*self.gateway,
            &self.identity,
            self.last_snapshot.as_ref(),
            self.renderer.as_mut(),
            options,
        )
    }

    /// Downloads the result folder through the managed-transfer service
    pub async fn download_result_folder_by_globus(
        &mut self,
        request: TransferRequest,
        mode: WaitMode,
    ) -> Result<TransferTask> {
        self.transfer_monitor()?.run(request, mode).await
    }

    fn token_request(&self) -> JobTokenRequest {
        JobTokenRequest {
            access_token: self.identity.access_token.clone(),
            jupyterhub_api_token: self.auth_token.clone(),
        }
    }

    async fn fetch(&self) -> Result<JobSnapshot> {
        debug!("Fetching job {}", self.identity.id);
        self.gateway
            .get_job(&self.identity.id, &self.identity.access_token)
            .await
    }
}
