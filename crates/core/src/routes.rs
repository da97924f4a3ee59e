//! Resource paths and polling cadence of the workflow engine API.
//!
//! These must match the routes served by the engine's HTTP front
//! (`POST /workflow`, `GET /status/{id}`, `GET /results/{id}`).

use std::time::Duration;

use crate::types::WorkflowId;

/// Creation endpoint.
pub const WORKFLOW_PATH: &str = "/workflow";

/// How often the status feed is polled while a workflow is selected.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// How often the results feed is polled while a workflow is selected.
pub const RESULTS_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Locator of the status feed for `id`.
pub fn status_path(id: &WorkflowId) -> String {
    format!("/status/{id}")
}

/// Locator of the results feed for `id`.
pub fn results_path(id: &WorkflowId) -> String {
    format!("/results/{id}")
}
