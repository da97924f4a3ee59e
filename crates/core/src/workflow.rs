//! Response payloads of the workflow engine's read endpoints.
//!
//! These mirror the JSON returned by `GET /status/{id}` and
//! `GET /results/{id}`. They are produced by the backend and read-only to
//! the dashboard. Fields the engine may omit default to empty values so a
//! partially populated response still decodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::WorkflowId;

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Lifecycle state shared by workflows and their tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    /// A state this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the engine will make no further progress on this item.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status feed
// ---------------------------------------------------------------------------

/// One step of a workflow as reported by the status feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier of the analysis step, e.g. `"detect_outliers"`.
    pub task_type: String,
    pub task_status: RunStatus,
    /// Failure message recorded by the worker, if any.
    #[serde(default)]
    pub error: Option<String>,
    /// How many times the engine has tried this task.
    #[serde(default)]
    pub attempts: Option<u32>,
}

/// Body of `GET /status/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub workflow_id: Option<WorkflowId>,
    pub status: RunStatus,
    /// Tasks in the order the engine scheduled them.
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Results feed
// ---------------------------------------------------------------------------

/// Final classification of a completed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Warning,
    Fail,
    #[serde(other)]
    Unknown,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warning => "WARNING",
            Self::Fail => "FAIL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis result attached to a workflow once it concludes.
///
/// Outlier and trend records are opaque to the dashboard; they are only
/// counted and pretty-printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Absent until the workflow concludes.
    #[serde(default)]
    pub verdict: Option<Verdict>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub outliers: Vec<serde_json::Value>,
    #[serde(default)]
    pub trends: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_critical_outliers: Option<bool>,
    #[serde(default)]
    pub unstable_sensors: Vec<String>,
}

/// Body of `GET /results/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsPayload {
    #[serde(default)]
    pub workflow_id: Option<WorkflowId>,
    #[serde(default)]
    pub status: Option<RunStatus>,
    /// `null` or missing until the engine has stored a result.
    #[serde(default)]
    pub result: Option<ResultRecord>,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Body returned by `POST /workflow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCreated {
    pub workflow_id: WorkflowId,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
