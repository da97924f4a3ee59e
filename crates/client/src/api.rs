//! REST client for the workflow engine's HTTP endpoints.
//!
//! Wraps `POST /workflow`, `GET /status/{id}` and `GET /results/{id}`
//! using [`reqwest`]. Every request carries a fresh `x-request-id` header
//! so dashboard calls can be correlated with the engine's logs.

use std::time::Duration;

use async_trait::async_trait;
use mfw_core::input::WorkflowInput;
use mfw_core::routes::WORKFLOW_PATH;
use mfw_core::workflow::WorkflowCreated;
use mfw_core::{Fetch, FetchError, SubmitWorkflow};

/// Header used to correlate a request with the engine's logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors from building the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowApiError {
    #[error("Invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP client for a single workflow engine.
#[derive(Debug)]
pub struct WorkflowApi {
    client: reqwest::Client,
    base_url: String,
}

impl WorkflowApi {
    /// Create a client for the engine at `base_url` with a per-request
    /// timeout.
    ///
    /// * `base_url` - e.g. `http://localhost:8000`. A trailing slash is
    ///   stripped.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WorkflowApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, WorkflowApiError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(WorkflowApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the engine root.
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // ---- private helpers ----

    /// Map a non-2xx response to [`FetchError::Transport`], returning the
    /// response unchanged on success.
    fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn request_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

fn network_error(e: reqwest::Error) -> FetchError {
    FetchError::Network(e.to_string())
}

#[async_trait]
impl Fetch for WorkflowApi {
    async fn get(&self, locator: &str) -> Result<String, FetchError> {
        let request_id = Self::request_id();
        tracing::debug!(locator, request_id = %request_id, "GET");

        let response = self
            .client
            .get(self.url(locator))
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(network_error)?;

        let response = Self::ensure_success(response)?;
        response.text().await.map_err(network_error)
    }
}

#[async_trait]
impl SubmitWorkflow for WorkflowApi {
    /// Send `POST /workflow` with the batch as the JSON body and return
    /// the engine-assigned workflow id.
    async fn create_workflow(&self, input: &WorkflowInput) -> Result<WorkflowCreated, FetchError> {
        let request_id = Self::request_id();
        tracing::info!(
            request_id = %request_id,
            sensors = input.sensor_readings.len(),
            measurements = input.measurements.len(),
            batch_id = input.batch_id().unwrap_or("-"),
            "Submitting workflow",
        );

        let response = self
            .client
            .post(self.url(WORKFLOW_PATH))
            .header(REQUEST_ID_HEADER, &request_id)
            .json(input)
            .send()
            .await
            .map_err(network_error)?;

        let response = Self::ensure_success(response)?;
        let body = response.text().await.map_err(network_error)?;
        serde_json::from_str::<WorkflowCreated>(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
