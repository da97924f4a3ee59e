//! Top-level dashboard state.
//!
//! [`Dashboard`] owns the subscription key (through
//! [`WorkflowSubscriptions`]) and the submit panel. Submissions and
//! `watch`/`stop` commands are the only writers of the key; the status and
//! results panels are projected from engine snapshots on every render.

use std::sync::Arc;

use mfw_core::{Fetch, SubmissionError, SubmitWorkflow, WorkflowId};
use mfw_poller::WorkflowSubscriptions;

use crate::command::{Command, HELP};
use crate::submit::SubmitPanel;
use crate::view::{ResultsView, StatusView};

/// What the input loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep running; print `output` if any.
    Continue(Option<String>),
    Quit,
}

pub struct Dashboard {
    submitter: Arc<dyn SubmitWorkflow>,
    subscriptions: WorkflowSubscriptions,
    panel: SubmitPanel,
}

impl Dashboard {
    /// Dashboard polling at the engine's fixed cadence.
    pub fn new(submitter: Arc<dyn SubmitWorkflow>, fetcher: Arc<dyn Fetch>) -> Self {
        Self::with_subscriptions(submitter, WorkflowSubscriptions::new(fetcher))
    }

    pub fn with_subscriptions(
        submitter: Arc<dyn SubmitWorkflow>,
        subscriptions: WorkflowSubscriptions,
    ) -> Self {
        Self {
            submitter,
            subscriptions,
            panel: SubmitPanel::default(),
        }
    }

    pub fn subscriptions(&self) -> &WorkflowSubscriptions {
        &self.subscriptions
    }

    pub fn panel(&self) -> &SubmitPanel {
        &self.panel
    }

    /// Submit `text` as a batch. On success the new workflow id becomes the
    /// subscription key; on failure the key is left untouched.
    pub async fn submit(&mut self, text: &str) -> Result<WorkflowId, SubmissionError> {
        let id = self.panel.submit(self.submitter.as_ref(), text).await?;
        self.subscriptions.set_key(Some(id.clone()));
        Ok(id)
    }

    /// Show the submit panel as busy before a submit command runs, so the
    /// caller can render it while the request is outstanding.
    pub fn begin_submit(&mut self) -> String {
        self.panel.begin();
        self.render()
    }

    /// Follow an existing workflow.
    pub fn watch(&mut self, id: WorkflowId) {
        self.subscriptions.set_key(Some(id));
    }

    /// Stop following the current workflow.
    pub fn stop(&mut self) {
        self.subscriptions.set_key(None);
    }

    pub fn status_view(&self) -> StatusView {
        StatusView::project(
            self.subscriptions.key(),
            &self.subscriptions.status().snapshot(),
        )
    }

    pub fn results_view(&self) -> ResultsView {
        ResultsView::project(
            self.subscriptions.key(),
            &self.subscriptions.results().snapshot(),
        )
    }

    /// All panels as text.
    pub fn render(&self) -> String {
        let mut out = self.panel.to_string();
        let status = self.status_view().to_string();
        if !status.is_empty() {
            out.push('\n');
            out.push_str(&status);
        }
        let results = self.results_view().to_string();
        if !results.is_empty() {
            out.push('\n');
            out.push_str(&results);
        }
        out
    }

    /// Apply one stdin command.
    pub async fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Submit(path) => {
                let text = match path {
                    None => self.panel.input.clone(),
                    Some(path) => match tokio::fs::read_to_string(&path).await {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "Cannot read batch file");
                            self.panel
                                .fail(format!("Cannot read {}: {e}", path.display()));
                            return Flow::Continue(Some(self.render()));
                        }
                    },
                };
                // The outcome is recorded on the panel.
                let _ = self.submit(&text).await;
                Flow::Continue(Some(self.render()))
            }
            Command::Watch(id) => {
                self.watch(id);
                Flow::Continue(Some(self.render()))
            }
            Command::Stop => {
                self.stop();
                Flow::Continue(Some(self.render()))
            }
            Command::Show => Flow::Continue(Some(self.render())),
            Command::Help => Flow::Continue(Some(HELP.to_string())),
            Command::Quit => Flow::Quit,
        }
    }

    /// Tear down both polling engines.
    pub fn shutdown(&mut self) {
        self.subscriptions.shutdown();
    }
}
