//! Shared test fixtures for the polling engine integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mfw_core::{Fetch, FetchError};
use tokio::sync::oneshot;

pub type Reply = Result<String, FetchError>;

enum Scripted {
    Now(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// In-memory [`Fetch`] whose replies are scripted per locator.
///
/// Queued replies are consumed first (in order); after that the sticky
/// reply set with [`respond`](Self::respond) / [`fail`](Self::fail) is
/// used. Gated replies hold the attempt suspended until the test sends
/// the reply, which lets tests choose the completion order.
#[derive(Default)]
pub struct ScriptedFetcher {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    sticky: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every unqueued request for `locator` with `body`.
    pub fn respond(&self, locator: &str, body: &str) {
        self.sticky
            .lock()
            .unwrap()
            .insert(locator.to_string(), Ok(body.to_string()));
    }

    /// Fail every unqueued request for `locator` with `err`.
    pub fn fail(&self, locator: &str, err: FetchError) {
        self.sticky
            .lock()
            .unwrap()
            .insert(locator.to_string(), Err(err));
    }

    /// Queue a one-off immediate reply.
    pub fn enqueue(&self, locator: &str, reply: Reply) {
        self.queue(locator, Scripted::Now(reply));
    }

    /// Queue a one-off reply that is held until the returned sender fires.
    pub fn gate(&self, locator: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.queue(locator, Scripted::Gated(rx));
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, locator: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == locator)
            .count()
    }

    fn sticky_reply(&self, locator: &str) -> Reply {
        self.sticky
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("no reply for {locator}"))))
    }

    fn queue(&self, locator: &str, scripted: Scripted) {
        self.queued
            .lock()
            .unwrap()
            .entry(locator.to_string())
            .or_default()
            .push_back(scripted);
    }
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn get(&self, locator: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(locator.to_string());

        let next = self
            .queued
            .lock()
            .unwrap()
            .get_mut(locator)
            .and_then(|q| q.pop_front());

        match next {
            Some(Scripted::Now(reply)) => reply,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("gate dropped".into()))),
            None => self.sticky_reply(locator),
        }
    }
}

/// Let every ready task run without advancing the paused clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock by `ms` and let woken tasks run.
pub async fn advance_ms(ms: u64) {
    tokio::time::advance(std::time::Duration::from_millis(ms)).await;
    settle().await;
}

/// JSON body of a minimal status payload.
pub fn status_body(status: &str) -> String {
    format!(r#"{{"status": "{status}", "tasks": []}}"#)
}
