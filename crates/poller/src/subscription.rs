//! Subscription-key wiring for the status and results feeds.
//!
//! [`WorkflowSubscriptions`] owns the current subscription key (the
//! selected workflow id) and one independent [`PollingEngine`] per feed.
//! Each feed derives its locator from the key; replacing the key
//! re-points both engines, which tears down everything owned by the old
//! key before the new activations start.

use std::sync::Arc;
use std::time::Duration;

use mfw_core::routes::{results_path, status_path, RESULTS_POLL_INTERVAL, STATUS_POLL_INTERVAL};
use mfw_core::workflow::{ResultsPayload, StatusPayload};
use mfw_core::{Fetch, WorkflowId};
use serde::de::DeserializeOwned;

use crate::engine::PollingEngine;

/// An engine plus the rule that maps a key to its locator.
pub struct FeedBinding<T> {
    engine: PollingEngine<T>,
    locate: fn(&WorkflowId) -> String,
}

impl<T> FeedBinding<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(engine: PollingEngine<T>, locate: fn(&WorkflowId) -> String) -> Self {
        Self { engine, locate }
    }

    pub fn engine(&self) -> &PollingEngine<T> {
        &self.engine
    }

    /// Locator this feed uses for `key`; `None` when there is no key.
    pub fn locator_for(&self, key: Option<&WorkflowId>) -> Option<String> {
        key.map(self.locate)
    }

    fn bind(&mut self, key: Option<&WorkflowId>) {
        let locator = self.locator_for(key);
        self.engine.set_locator(locator);
    }
}

/// Current subscription key and the two feeds it drives.
pub struct WorkflowSubscriptions {
    key: Option<WorkflowId>,
    status: FeedBinding<StatusPayload>,
    results: FeedBinding<ResultsPayload>,
}

impl WorkflowSubscriptions {
    /// Feeds polled at the engine's fixed cadence (status 2 s, results 3 s).
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self::with_intervals(fetcher, STATUS_POLL_INTERVAL, RESULTS_POLL_INTERVAL)
    }

    pub fn with_intervals(
        fetcher: Arc<dyn Fetch>,
        status_interval: Duration,
        results_interval: Duration,
    ) -> Self {
        Self {
            key: None,
            status: FeedBinding::new(
                PollingEngine::new("status", Arc::clone(&fetcher), status_interval),
                status_path,
            ),
            results: FeedBinding::new(
                PollingEngine::new("results", fetcher, results_interval),
                results_path,
            ),
        }
    }

    pub fn key(&self) -> Option<&WorkflowId> {
        self.key.as_ref()
    }

    /// Replace the subscription key and re-point both feeds.
    pub fn set_key(&mut self, key: Option<WorkflowId>) {
        if self.key == key {
            return;
        }

        match (&self.key, &key) {
            (_, Some(new)) => tracing::info!(workflow_id = %new, "Subscribing to workflow"),
            (Some(old), None) => tracing::info!(workflow_id = %old, "Unsubscribing from workflow"),
            (None, None) => {}
        }

        self.key = key;
        self.status.bind(self.key.as_ref());
        self.results.bind(self.key.as_ref());
    }

    pub fn status(&self) -> &PollingEngine<StatusPayload> {
        self.status.engine()
    }

    pub fn results(&self) -> &PollingEngine<ResultsPayload> {
        self.results.engine()
    }

    /// Tear down both feeds. The key is kept so a caller can inspect what
    /// was being watched.
    pub fn shutdown(&mut self) {
        self.status.engine.shutdown();
        self.results.engine.shutdown();
    }
}
