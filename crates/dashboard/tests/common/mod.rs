//! In-memory workflow engine used by the dashboard integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mfw_core::input::WorkflowInput;
use mfw_core::workflow::WorkflowCreated;
use mfw_core::{Fetch, FetchError, SubmitWorkflow, WorkflowId};

type Reply = Result<String, FetchError>;

/// Feed replies are consumed in order; the last one repeats forever.
pub struct FakeEngine {
    feeds: Mutex<HashMap<String, VecDeque<Reply>>>,
    create_result: Mutex<Result<WorkflowId, FetchError>>,
    submitted: Mutex<Vec<WorkflowInput>>,
    calls: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn new(next_id: &str) -> Arc<Self> {
        Arc::new(Self {
            feeds: Mutex::new(HashMap::new()),
            create_result: Mutex::new(Ok(WorkflowId::new(next_id))),
            submitted: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn script(&self, locator: &str, replies: Vec<Reply>) {
        self.feeds
            .lock()
            .unwrap()
            .insert(locator.to_string(), replies.into());
    }

    pub fn fail_creation(&self, err: FetchError) {
        *self.create_result.lock().unwrap() = Err(err);
    }

    pub fn submitted(&self) -> Vec<WorkflowInput> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn call_count(&self, locator: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == locator)
            .count()
    }
}

#[async_trait]
impl Fetch for FakeEngine {
    async fn get(&self, locator: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(locator.to_string());

        let mut feeds = self.feeds.lock().unwrap();
        let Some(queue) = feeds.get_mut(locator) else {
            return Err(FetchError::Transport { status: 404 });
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(Err(FetchError::Transport { status: 404 }))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or(Err(FetchError::Transport { status: 404 }))
        }
    }
}

#[async_trait]
impl SubmitWorkflow for FakeEngine {
    async fn create_workflow(&self, input: &WorkflowInput) -> Result<WorkflowCreated, FetchError> {
        self.submitted.lock().unwrap().push(input.clone());
        let result = self.create_result.lock().unwrap().clone();
        result.map(|workflow_id| WorkflowCreated { workflow_id })
    }
}

pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub async fn advance_ms(ms: u64) {
    tokio::time::advance(std::time::Duration::from_millis(ms)).await;
    settle().await;
}

pub fn status_body(status: &str, task_status: &str) -> Reply {
    Ok(format!(
        r#"{{"workflow_id": 42, "status": "{status}", "tasks": [{{"task_type": "dimensional_check", "task_status": "{task_status}", "error": null}}]}}"#
    ))
}
