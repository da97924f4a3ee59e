//! HTTP client for the manufacturing workflow engine.
//!
//! [`WorkflowApi`] implements the [`mfw_core::Fetch`] and
//! [`mfw_core::SubmitWorkflow`] boundary traits over [`reqwest`].

pub mod api;

pub use api::{WorkflowApi, WorkflowApiError};
