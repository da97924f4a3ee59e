//! Submit panel: the one-shot `POST /workflow` call and its inline state.
//!
//! A successful submission yields the new subscription key; a failed one
//! only records an inline error so active polling is left alone.

use std::fmt;

use mfw_core::input::WorkflowInput;
use mfw_core::{SubmissionError, SubmitWorkflow, WorkflowId};

/// Inline state of the submit panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPanel {
    /// Text that will be submitted next; starts as the sample batch.
    pub input: String,
    pub submitting: bool,
    pub error: Option<String>,
    pub last_created: Option<WorkflowId>,
}

impl Default for SubmitPanel {
    fn default() -> Self {
        Self {
            input: WorkflowInput::sample_text(),
            submitting: false,
            error: None,
            last_created: None,
        }
    }
}

impl SubmitPanel {
    /// Parse, validate and submit `text`.
    ///
    /// The previous inline error is cleared when the attempt starts and
    /// replaced by this attempt's error, if any.
    pub async fn submit(
        &mut self,
        submitter: &dyn SubmitWorkflow,
        text: &str,
    ) -> Result<WorkflowId, SubmissionError> {
        self.input = text.to_string();
        self.begin();

        let result = create(submitter, text).await;

        self.submitting = false;
        match &result {
            Ok(id) => {
                tracing::info!(workflow_id = %id, "Workflow created");
                self.last_created = Some(id.clone());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Workflow submission failed");
                self.error = Some(e.to_string());
            }
        }
        result
    }

    /// Enter the submitting state and clear the previous error.
    pub fn begin(&mut self) {
        self.error = None;
        self.submitting = true;
    }

    /// Record a failure that happened before the call (e.g. unreadable
    /// input file).
    pub fn fail(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.error = Some(message.into());
    }
}

async fn create(submitter: &dyn SubmitWorkflow, text: &str) -> Result<WorkflowId, SubmissionError> {
    let input = WorkflowInput::parse(text)?;
    let created = submitter.create_workflow(&input).await?;
    Ok(created.workflow_id)
}

impl fmt::Display for SubmitPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Submit Workflow ==")?;
        if self.submitting {
            writeln!(f, "Submitting...")?;
        }
        if let Some(id) = &self.last_created {
            writeln!(f, "Last created: #{id}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        Ok(())
    }
}
