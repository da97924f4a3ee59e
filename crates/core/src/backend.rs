//! Boundary traits for the workflow engine.
//!
//! The poller and the submit panel only see these traits; the reqwest
//! implementation lives in `mfw-client`, and tests substitute scripted
//! fakes.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::input::WorkflowInput;
use crate::workflow::WorkflowCreated;

/// Read side: a plain GET returning the raw response body.
///
/// Decoding is left to the caller so that malformed bodies surface as
/// [`FetchError::Decode`] at the same place for every feed.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `locator` (a path relative to the engine's base URL).
    ///
    /// Non-2xx responses must map to [`FetchError::Transport`].
    async fn get(&self, locator: &str) -> Result<String, FetchError>;
}

/// Write side: create a workflow from a batch.
#[async_trait]
pub trait SubmitWorkflow: Send + Sync {
    async fn create_workflow(&self, input: &WorkflowInput) -> Result<WorkflowCreated, FetchError>;
}
