//! Job DTOs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::credential::AccessToken;
use crate::domain::job::{JobConfiguration, JobSnapshot};

/// Request to create a new job
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub maintainer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hpc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jupyterhub_api_token: Option<AccessToken>,
    /// Legacy direct HPC login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for CreateJobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateJobRequest")
            .field("maintainer", &self.maintainer)
            .field("hpc", &self.hpc)
            .field("jupyterhub_api_token", &self.jupyterhub_api_token)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Gateway response to job creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJob {
    /// Job-scoped secret; later requests authenticate with it
    #[serde(default)]
    pub secret_token: Option<AccessToken>,
    #[serde(flatten)]
    pub snapshot: JobSnapshot,
}

/// Body for requests that only need to authenticate (e.g. submit)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTokenRequest {
    pub access_token: AccessToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jupyterhub_api_token: Option<AccessToken>,
}

/// Partial update of a job's configuration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(flatten)]
    pub configuration: JobConfiguration,
    pub access_token: AccessToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jupyterhub_api_token: Option<AccessToken>,
}

/// Query string carrying the access token on GET requests
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessQuery<'a> {
    pub access_token: &'a AccessToken,
}
