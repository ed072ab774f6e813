//! Job-related API endpoints

use crate::GatewayClient;
use crate::error::Result;
use hpcjob_core::domain::credential::AccessToken;
use hpcjob_core::domain::job::JobSnapshot;
use hpcjob_core::dto::job::{
    AccessQuery, CreateJobRequest, CreatedJob, JobTokenRequest, UpdateJobRequest,
};

impl GatewayClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Create a new job
    ///
    /// # Returns
    /// The created job's snapshot together with its job-scoped secret
    pub async fn create_job(&self, req: &CreateJobRequest) -> Result<CreatedJob> {
        let url = self.endpoint(&["job"])?;
        let response = self.client.post(url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the current snapshot of a job
    ///
    /// # Arguments
    /// * `job_id` - The gateway-assigned job id
    /// * `token` - Access token scoped to the job
    pub async fn get_job(&self, job_id: &str, token: &AccessToken) -> Result<JobSnapshot> {
        let url = self.endpoint(&["job", job_id])?;
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

    /// Submit a job to its scheduler
    ///
    /// Submitting twice is forwarded as-is.
    pub async fn submit_job(&self, job_id: &str, req: &JobTokenRequest) -> Result<JobSnapshot> {
        let url = self.endpoint(&["job", job_id, "submit"])?;
        let response = self.client.post(url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Update a job's configuration
    ///
    /// # Returns
    /// The gateway's merged view of the job
    pub async fn update_job(&self, job_id: &str, req: &UpdateJobRequest) -> Result<JobSnapshot> {
        let url = self.endpoint(&["job", job_id])?;
        let response = self.client.put(url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// List the contents of a job's result folder
    ///
    /// The listing format belongs to the gateway and is returned untouched.
    pub async fn get_result_folder_content(
        &self,
        job_id: &str,
        token: &AccessToken,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint(&["job", job_id, "result-folder-content"])?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use hpcjob_core::domain::job::JobConfiguration;
    use mockito::Matcher;
    use serde_json::json;

    const SNAPSHOT: &str = r#"{
        "id": "j1",
        "slurmId": null,
        "hpc": "h1",
        "executableFolder": null,
        "dataFolder": null,
        "resultFolder": null,
        "param": {},
        "env": {},
        "slurm": {},
        "userId": null,
        "maintainer": "m1",
        "createdAt": "2024-03-01T12:00:00.000Z",
        "events": [],
        "logs": []
    }"#;

    #[tokio::test]
    async fn test_create_job_posts_request() {
        let mut server = mockito::Server::new_async().await;
        let body = SNAPSHOT.replacen("\"id\": \"j1\",", "\"id\": \"j1\", \"secretToken\": \"sec\",", 1);
        let mock = server
            .mock("POST", "/job")
            .match_body(Matcher::Json(json!({
                "maintainer": "m1",
                "hpc": "h1",
                "jupyterhubApiToken": "hub"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url());
        let created = client
            .create_job(&CreateJobRequest {
                maintainer: "m1".to_string(),
                hpc: Some("h1".to_string()),
                jupyterhub_api_token: Some(AccessToken::new("hub")),
                user: None,
                password: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.snapshot.id, "j1");
        assert_eq!(created.secret_token, Some(AccessToken::new("sec")));
    }

    #[tokio::test]
    async fn test_get_job_sends_token_as_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/job/j1")
            .match_query(Matcher::UrlEncoded("accessToken".into(), "tok".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SNAPSHOT)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url());
        let snapshot = client.get_job("j1", &AccessToken::new("tok")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(snapshot.hpc.as_deref(), Some("h1"));
    }

    #[tokio::test]
    async fn test_update_job_sends_only_set_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/job/j1")
            .match_body(Matcher::Json(json!({
                "param": {"steps": 10},
                "accessToken": "tok"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SNAPSHOT)
            .expect(1)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url());
        client
            .update_job(
                "j1",
                &UpdateJobRequest {
                    configuration: JobConfiguration::new().param("steps", 10),
                    access_token: AccessToken::new("tok"),
                    jupyterhub_api_token: None,
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_carries_gateway_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/job/j1/submit")
            .with_status(409)
            .with_body(r#"{"error":"job already submitted"}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url());
        let err = client
            .submit_job(
                "j1",
                &JobTokenRequest {
                    access_token: AccessToken::new("tok"),
                    jupyterhub_api_token: None,
                },
            )
            .await
            .unwrap_err();

        match err {
            ClientError::ApiError { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "job already submitted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_result_folder_content_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/j1/result-folder-content")
            .match_query(Matcher::UrlEncoded("accessToken".into(), "tok".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["output.txt", "plots/"]"#)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url());
        let listing = client
            .get_result_folder_content("j1", &AccessToken::new("tok"))
            .await
            .unwrap();

        assert_eq!(listing, json!(["output.txt", "plots/"]));
    }
}
