//! Locator-driven polling engine.
//!
//! [`PollingEngine`] keeps a [`PollState`] fresh for whatever locator it
//! is currently pointed at. Pointing it at a locator issues an attempt
//! immediately and then one per interval; pointing it at `None` stops all
//! network activity and clears the state.
//!
//! Each activation is owned by an [`Activation`] value. Dropping it, on
//! any path (locator change, interval change, [`PollingEngine::shutdown`]
//! or the engine itself being dropped), cancels the timer and retires the
//! activation's liveness token in one step. In-flight requests are not
//! aborted; their results arrive with a dead token and are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mfw_core::{Fetch, FetchError};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::state::{ApplyOutcome, DiscardReason, LivenessToken, PollState};

/// Smallest accepted polling interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

type Cell<T> = Arc<watch::Sender<PollState<T>>>;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Lifetime attempt counters of one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub issued: u64,
    pub applied: u64,
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    issued: AtomicU64,
    applied: AtomicU64,
    discarded: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: ApplyOutcome) {
        let counter = match outcome {
            ApplyOutcome::Applied => &self.applied,
            ApplyOutcome::Discarded(_) => &self.discarded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> EngineStats {
        EngineStats {
            issued: self.issued.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

/// Timer and liveness token of one activation, released together on drop.
struct Activation<T> {
    locator: String,
    token: LivenessToken,
    timer: CancellationToken,
    cell: Cell<T>,
}

impl<T> Drop for Activation<T> {
    fn drop(&mut self) {
        self.timer.cancel();
        let token = self.token;
        // Retiring is invisible to readers, so no notification.
        self.cell.send_if_modified(|state| {
            state.retire(token);
            false
        });
    }
}

// ---------------------------------------------------------------------------
// PollingEngine
// ---------------------------------------------------------------------------

/// Repeatedly fetches and decodes `T` from the current locator and
/// publishes the latest payload or error through a watch channel.
///
/// Must be driven from within a tokio runtime.
pub struct PollingEngine<T> {
    name: &'static str,
    fetcher: Arc<dyn Fetch>,
    interval: Duration,
    cell: Cell<T>,
    counters: Arc<Counters>,
    activation: Option<Activation<T>>,
}

impl<T> PollingEngine<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create an inactive engine.
    ///
    /// * `name` - label used in log lines, e.g. `"status"`.
    /// * `interval` - time between attempt issues; clamped to
    ///   [`MIN_INTERVAL`].
    pub fn new(name: &'static str, fetcher: Arc<dyn Fetch>, interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(PollState::default());
        Self {
            name,
            fetcher,
            interval: interval.max(MIN_INTERVAL),
            cell: Arc::new(tx),
            counters: Arc::new(Counters::default()),
            activation: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Locator of the current activation, if any.
    pub fn locator(&self) -> Option<&str> {
        self.activation.as_ref().map(|a| a.locator.as_str())
    }

    /// Receiver notified whenever the published state changes.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.cell.subscribe()
    }

    /// Clone of the current published state.
    pub fn snapshot(&self) -> PollState<T> {
        self.cell.borrow().clone()
    }

    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }

    /// Point the engine at `locator`.
    ///
    /// Setting the locator it is already polling is a no-op. Any other
    /// change tears down the current activation, discards the published
    /// payload and, for `Some`, starts a new activation whose first
    /// attempt is issued immediately.
    ///
    /// After [`shutdown`](Self::shutdown) the published state still names
    /// the old locator, so `None` still resets it.
    pub fn set_locator(&mut self, locator: Option<String>) {
        let published = self.cell.borrow().locator.clone();
        if self.locator() == locator.as_deref() && published == locator {
            return;
        }

        self.deactivate();
        self.cell.send_if_modified(|state| state.reset(locator.clone()));

        match locator {
            Some(locator) => self.activate(locator),
            None => tracing::info!(engine = self.name, "Polling stopped"),
        }
    }

    /// Change the cadence. An active engine restarts its timer under a new
    /// liveness token; the published payload is kept.
    pub fn set_interval(&mut self, interval: Duration) {
        let interval = interval.max(MIN_INTERVAL);
        if interval == self.interval {
            return;
        }
        self.interval = interval;

        let current = self.locator().map(str::to_string);
        if let Some(locator) = current {
            self.deactivate();
            self.activate(locator);
        }
    }

    /// Tear down the current activation without touching the published
    /// payload. Results still in flight are discarded when they land.
    pub fn shutdown(&mut self) {
        if self.activation.is_some() {
            tracing::info!(engine = self.name, "Polling engine shut down");
        }
        self.deactivate();
    }

    fn deactivate(&mut self) {
        if let Some(activation) = self.activation.take() {
            tracing::debug!(
                engine = self.name,
                locator = %activation.locator,
                generation = activation.token.generation(),
                "Retiring activation",
            );
        }
    }

    fn activate(&mut self, locator: String) {
        let token = self.cell.borrow().token();
        let timer = CancellationToken::new();

        tracing::info!(
            engine = self.name,
            locator = %locator,
            interval_ms = self.interval.as_millis() as u64,
            generation = token.generation(),
            "Polling started",
        );

        tokio::spawn(drive(
            Cycle {
                engine: self.name,
                fetcher: Arc::clone(&self.fetcher),
                cell: Arc::clone(&self.cell),
                counters: Arc::clone(&self.counters),
                locator: locator.clone(),
                token,
            },
            self.interval,
            timer.clone(),
        ));

        self.activation = Some(Activation {
            locator,
            token,
            timer,
            cell: Arc::clone(&self.cell),
        });
    }
}

// ---------------------------------------------------------------------------
// Timer and attempts
// ---------------------------------------------------------------------------

/// Everything an attempt needs, stamped at activation time.
struct Cycle<T> {
    engine: &'static str,
    fetcher: Arc<dyn Fetch>,
    cell: Cell<T>,
    counters: Arc<Counters>,
    locator: String,
    token: LivenessToken,
}

impl<T> Clone for Cycle<T> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine,
            fetcher: Arc::clone(&self.fetcher),
            cell: Arc::clone(&self.cell),
            counters: Arc::clone(&self.counters),
            locator: self.locator.clone(),
            token: self.token,
        }
    }
}

/// Issue one attempt per tick until `timer` is cancelled. The first tick
/// fires immediately; attempts run as their own tasks so a slow response
/// never delays the next issue.
async fn drive<T>(cycle: Cycle<T>, interval: Duration, timer: CancellationToken)
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = timer.cancelled() => break,
            _ = ticker.tick() => {
                cycle.counters.issued.fetch_add(1, Ordering::Relaxed);
                tokio::spawn(attempt(cycle.clone()));
            }
        }
    }

    tracing::debug!(engine = cycle.engine, locator = %cycle.locator, "Poll timer released");
}

/// Fetch, decode and offer the result to the published state.
async fn attempt<T>(cycle: Cycle<T>) -> ApplyOutcome
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let result = fetch_and_decode::<T>(cycle.fetcher.as_ref(), &cycle.locator).await;

    if let Err(e) = &result {
        tracing::warn!(engine = cycle.engine, locator = %cycle.locator, error = %e, "Poll attempt failed");
    }

    let outcome = publish(&cycle.cell, cycle.token, result);
    cycle.counters.record(outcome);

    match outcome {
        ApplyOutcome::Applied => {
            tracing::debug!(engine = cycle.engine, locator = %cycle.locator, "Poll result applied");
        }
        ApplyOutcome::Discarded(reason) => {
            tracing::debug!(
                engine = cycle.engine,
                locator = %cycle.locator,
                generation = cycle.token.generation(),
                ?reason,
                "Poll result discarded",
            );
        }
    }
    outcome
}

/// Check the token and mutate the state under the channel's write lock,
/// so a concurrent retire can never slip between the two.
fn publish<T>(cell: &Cell<T>, token: LivenessToken, result: Result<T, FetchError>) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::Discarded(DiscardReason::Stale);
    cell.send_if_modified(|state| {
        outcome = state.apply(token, result);
        outcome.is_applied()
    });
    outcome
}

/// GET `locator` and decode the body as JSON.
pub async fn fetch_and_decode<T: DeserializeOwned>(
    fetcher: &dyn Fetch,
    locator: &str,
) -> Result<T, FetchError> {
    let body = fetcher.get(locator).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
}
