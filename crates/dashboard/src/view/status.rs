//! Status panel: workflow badge plus one row per task.

use std::fmt;

use mfw_core::workflow::{RunStatus, StatusPayload};
use mfw_core::WorkflowId;
use mfw_poller::PollState;

use super::{Badge, RetryNotice, NEUTRAL_COLOR};

/// Badge color for a workflow or task status.
pub fn status_color(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Completed => "#22c55e",
        RunStatus::Running => "#eab308",
        RunStatus::Pending => "#94a3b8",
        RunStatus::Failed => "#ef4444",
        RunStatus::Unknown => NEUTRAL_COLOR,
    }
}

fn badge(status: RunStatus) -> Badge {
    Badge::new(status.as_str(), status_color(status))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task_type: String,
    pub badge: Badge,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    /// No workflow selected.
    Inactive,
    /// Polling, but no status has been decoded yet.
    Loading {
        workflow_id: WorkflowId,
        retry: Option<RetryNotice>,
    },
    Ready {
        workflow_id: WorkflowId,
        workflow: Badge,
        tasks: Vec<TaskRow>,
        retry: Option<RetryNotice>,
    },
}

impl StatusView {
    pub fn project(key: Option<&WorkflowId>, state: &PollState<StatusPayload>) -> Self {
        let Some(workflow_id) = key.cloned() else {
            return Self::Inactive;
        };
        let retry = RetryNotice::from_state(state, &[]);

        match &state.data {
            None => Self::Loading { workflow_id, retry },
            Some(payload) => Self::Ready {
                workflow_id,
                workflow: badge(payload.status),
                tasks: payload
                    .tasks
                    .iter()
                    .map(|t| TaskRow {
                        task_type: t.task_type.clone(),
                        badge: badge(t.task_status),
                        error: t.error.clone(),
                    })
                    .collect(),
                retry,
            },
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => Ok(()),
            Self::Loading { workflow_id, retry } => {
                writeln!(f, "== Status - Workflow #{workflow_id} ==")?;
                writeln!(f, "Loading...")?;
                if let Some(retry) = retry {
                    writeln!(f, "  {retry}")?;
                }
                Ok(())
            }
            Self::Ready {
                workflow_id,
                workflow,
                tasks,
                retry,
            } => {
                writeln!(f, "== Status - Workflow #{workflow_id} ==")?;
                writeln!(f, "Workflow: {workflow}")?;
                for task in tasks {
                    write!(f, "  {:<24} {}", task.task_type, task.badge)?;
                    if let Some(error) = &task.error {
                        write!(f, " ({error})")?;
                    }
                    writeln!(f)?;
                }
                if let Some(retry) = retry {
                    writeln!(f, "  {retry}")?;
                }
                Ok(())
            }
        }
    }
}
