//! Shared domain types for the manufacturing workflow dashboard.
//!
//! - [`workflow`]: status and results payloads served by the engine.
//! - [`input`]: the batch submitted to create a workflow.
//! - [`routes`]: endpoint paths and polling cadence.
//! - [`backend`]: the `Fetch` / `SubmitWorkflow` boundary traits.
//! - [`error`]: fetch and submission error taxonomy.

pub mod backend;
pub mod error;
pub mod input;
pub mod routes;
pub mod types;
pub mod workflow;

pub use backend::{Fetch, SubmitWorkflow};
pub use error::{FetchError, SubmissionError};
pub use types::{Timestamp, WorkflowId};
