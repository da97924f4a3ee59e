//! Integration tests for `PollingEngine` lifecycle and race safety.
//!
//! All tests run on a paused clock so that cadence and completion order
//! are fully controlled by the test.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use mfw_core::workflow::{RunStatus, StatusPayload};
use mfw_core::{FetchError, WorkflowId};
use mfw_poller::PollingEngine;

use common::{advance_ms, settle, status_body, ScriptedFetcher};

const INTERVAL_MS: u64 = 2000;

fn tagged_body(tag: &str) -> String {
    format!(r#"{{"workflow_id": "{tag}", "status": "running", "tasks": []}}"#)
}

fn tag_of(payload: &Option<StatusPayload>) -> Option<String> {
    payload
        .as_ref()
        .and_then(|p| p.workflow_id.as_ref())
        .map(WorkflowId::to_string)
}

fn engine(fetcher: &std::sync::Arc<ScriptedFetcher>) -> PollingEngine<StatusPayload> {
    PollingEngine::new(
        "status",
        fetcher.clone(),
        Duration::from_millis(INTERVAL_MS),
    )
}

// ---------------------------------------------------------------------------
// Test: activation issues an attempt immediately
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn activation_fetches_without_waiting_an_interval() {
    let fetcher = ScriptedFetcher::new();
    fetcher.respond("/status/1", &status_body("pending"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;

    assert_eq!(fetcher.calls(), vec!["/status/1".to_string()]);
    let state = engine.snapshot();
    assert_eq!(state.data.unwrap().status, RunStatus::Pending);
    assert_eq!(state.locator.as_deref(), Some("/status/1"));
}

#[tokio::test(start_paused = true)]
async fn loading_until_first_payload_arrives() {
    let fetcher = ScriptedFetcher::new();
    let gate = fetcher.gate("/status/1");
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    assert!(engine.snapshot().is_loading());

    gate.send(Ok(status_body("running"))).unwrap();
    settle().await;
    assert!(!engine.snapshot().is_loading());
}

// ---------------------------------------------------------------------------
// Test: "none" locator
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn no_locator_means_no_network_activity() {
    let fetcher = ScriptedFetcher::new();
    let mut engine = engine(&fetcher);

    engine.set_locator(None);
    advance_ms(10 * INTERVAL_MS).await;

    assert!(fetcher.calls().is_empty());
    let state = engine.snapshot();
    assert!(!state.is_active());
    assert!(state.data.is_none());
}

#[tokio::test(start_paused = true)]
async fn clearing_locator_resets_state_and_stops_polling() {
    let fetcher = ScriptedFetcher::new();
    fetcher.respond("/status/1", &status_body("running"));
    let mut engine = engine(&fetcher);
    let mut rx = engine.subscribe();

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    assert!(engine.snapshot().data.is_some());

    rx.mark_unchanged();
    engine.set_locator(None);
    assert!(rx.has_changed().unwrap());

    let state = engine.snapshot();
    assert!(state.data.is_none());
    assert!(state.error.is_none());
    assert!(engine.locator().is_none());

    advance_ms(5 * INTERVAL_MS).await;
    assert_eq!(fetcher.call_count("/status/1"), 1);
}

// ---------------------------------------------------------------------------
// Test: cadence
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn polls_on_fixed_cadence() {
    let fetcher = ScriptedFetcher::new();
    fetcher.respond("/status/1", &status_body("running"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    assert_eq!(fetcher.call_count("/status/1"), 1);

    advance_ms(INTERVAL_MS - 1).await;
    assert_eq!(fetcher.call_count("/status/1"), 1);

    advance_ms(1).await;
    assert_eq!(fetcher.call_count("/status/1"), 2);

    advance_ms(INTERVAL_MS).await;
    assert_eq!(fetcher.call_count("/status/1"), 3);
    assert_eq!(engine.stats().issued, 3);
}

#[tokio::test(start_paused = true)]
async fn slow_response_does_not_delay_next_cycle() {
    let fetcher = ScriptedFetcher::new();
    let _slow = fetcher.gate("/status/1");
    fetcher.respond("/status/1", &status_body("running"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    advance_ms(INTERVAL_MS).await;

    // First attempt is still suspended, second was issued on schedule.
    assert_eq!(fetcher.call_count("/status/1"), 2);
    assert_eq!(engine.snapshot().data.unwrap().status, RunStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn same_locator_does_not_restart() {
    let fetcher = ScriptedFetcher::new();
    fetcher.respond("/status/1", &status_body("running"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    engine.set_locator(Some("/status/1".into()));
    settle().await;

    assert_eq!(fetcher.call_count("/status/1"), 1);
    assert!(engine.snapshot().data.is_some());
}

#[tokio::test(start_paused = true)]
async fn interval_change_restarts_cadence_and_keeps_payload() {
    let fetcher = ScriptedFetcher::new();
    fetcher.respond("/status/1", &status_body("running"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    let before = engine.snapshot().generation();

    engine.set_interval(Duration::from_millis(500));
    assert!(engine.snapshot().data.is_some());
    assert_ne!(engine.snapshot().generation(), before);
    settle().await;
    assert_eq!(fetcher.call_count("/status/1"), 2);

    advance_ms(500).await;
    assert_eq!(fetcher.call_count("/status/1"), 3);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_clamped() {
    let fetcher = ScriptedFetcher::new();
    let engine = PollingEngine::<StatusPayload>::new("status", fetcher, Duration::ZERO);
    assert_eq!(engine.interval(), mfw_poller::engine::MIN_INTERVAL);
}

// ---------------------------------------------------------------------------
// Test: failures keep the last good payload
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn transport_error_keeps_previous_payload() {
    let fetcher = ScriptedFetcher::new();
    fetcher.enqueue("/status/1", Ok(status_body("running")));
    fetcher.enqueue("/status/1", Err(FetchError::Transport { status: 503 }));
    fetcher.enqueue("/status/1", Ok(status_body("completed")));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    assert_eq!(engine.snapshot().data.unwrap().status, RunStatus::Running);

    advance_ms(INTERVAL_MS).await;
    let state = engine.snapshot();
    assert_eq!(state.data.unwrap().status, RunStatus::Running);
    assert_eq!(state.error, Some(FetchError::Transport { status: 503 }));
    assert_eq!(state.consecutive_failures, 1);

    advance_ms(INTERVAL_MS).await;
    let state = engine.snapshot();
    assert_eq!(state.data.unwrap().status, RunStatus::Completed);
    assert!(state.error.is_none());
    assert_eq!(state.consecutive_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn decode_error_keeps_previous_payload() {
    let fetcher = ScriptedFetcher::new();
    fetcher.enqueue("/status/1", Ok(status_body("pending")));
    fetcher.enqueue("/status/1", Ok("<html>bad gateway</html>".into()));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    advance_ms(INTERVAL_MS).await;

    let state = engine.snapshot();
    assert_eq!(state.data.unwrap().status, RunStatus::Pending);
    assert_matches!(state.error, Some(FetchError::Decode(_)));
}

#[tokio::test(start_paused = true)]
async fn failure_before_any_payload_stays_loading() {
    let fetcher = ScriptedFetcher::new();
    fetcher.fail("/status/1", FetchError::Network("connection refused".into()));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    advance_ms(INTERVAL_MS).await;

    let state = engine.snapshot();
    assert!(state.is_loading());
    assert_eq!(state.consecutive_failures, 2);
}

// ---------------------------------------------------------------------------
// Test: race safety across locator changes
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn late_response_for_previous_locator_is_discarded() {
    let fetcher = ScriptedFetcher::new();
    let old = fetcher.gate("/status/a");
    fetcher.respond("/status/b", &tagged_body("b"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/a".into()));
    settle().await;
    engine.set_locator(Some("/status/b".into()));
    settle().await;
    assert_eq!(tag_of(&engine.snapshot().data).as_deref(), Some("b"));

    old.send(Ok(tagged_body("a"))).unwrap();
    settle().await;

    assert_eq!(tag_of(&engine.snapshot().data).as_deref(), Some("b"));
    assert_eq!(engine.stats().discarded, 1);
}

#[tokio::test(start_paused = true)]
async fn late_error_for_previous_locator_is_discarded() {
    let fetcher = ScriptedFetcher::new();
    let old = fetcher.gate("/status/a");
    fetcher.respond("/status/b", &tagged_body("b"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/a".into()));
    settle().await;
    engine.set_locator(Some("/status/b".into()));
    settle().await;

    old.send(Err(FetchError::Transport { status: 500 })).unwrap();
    settle().await;

    let state = engine.snapshot();
    assert!(state.error.is_none());
    assert_eq!(state.consecutive_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn in_flight_response_across_switch_to_none_is_discarded() {
    let fetcher = ScriptedFetcher::new();
    let in_flight = fetcher.gate("/status/a");
    let mut engine = engine(&fetcher);
    let mut rx = engine.subscribe();

    engine.set_locator(Some("/status/a".into()));
    settle().await;
    engine.set_locator(None);
    rx.mark_unchanged();

    in_flight.send(Ok(tagged_body("a"))).unwrap();
    settle().await;

    let state = engine.snapshot();
    assert!(!rx.has_changed().unwrap());
    assert!(state.data.is_none());
    assert!(!state.is_active());
    assert_eq!(engine.stats().discarded, 1);
}

#[tokio::test(start_paused = true)]
async fn reply_from_before_none_does_not_land_after_reactivating_same_locator() {
    let fetcher = ScriptedFetcher::new();
    let first = fetcher.gate("/status/a");
    let second = fetcher.gate("/status/a");
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/a".into()));
    settle().await;
    engine.set_locator(None);
    engine.set_locator(Some("/status/a".into()));
    settle().await;
    assert_eq!(fetcher.call_count("/status/a"), 2);

    second.send(Ok(status_body("running"))).unwrap();
    settle().await;
    first.send(Ok(status_body("failed"))).unwrap();
    settle().await;

    assert_eq!(engine.snapshot().data.unwrap().status, RunStatus::Running);
    let stats = engine.stats();
    assert_eq!(stats.applied, 1);
    assert_eq!(stats.discarded, 1);
}

#[tokio::test(start_paused = true)]
async fn final_state_matches_last_locator_for_every_completion_order() {
    const LOCATORS: [&str; 3] = ["/status/a", "/status/b", "/status/c"];
    const ORDERS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for order in ORDERS {
        let fetcher = ScriptedFetcher::new();
        let mut gates: Vec<_> = LOCATORS.iter().map(|l| Some(fetcher.gate(l))).collect();
        let mut engine = engine(&fetcher);

        // Switch faster than the interval: every activation has exactly one
        // attempt in flight when the next switch happens.
        for locator in LOCATORS {
            engine.set_locator(Some(locator.to_string()));
            settle().await;
        }

        for i in order {
            let gate = gates[i].take().unwrap();
            let tag = &LOCATORS[i]["/status/".len()..];
            gate.send(Ok(tagged_body(tag))).unwrap();
            settle().await;

            let current = tag_of(&engine.snapshot().data);
            assert!(
                current.is_none() || current.as_deref() == Some("c"),
                "order {order:?}: stale payload {current:?} was applied"
            );
        }

        assert_eq!(
            tag_of(&engine.snapshot().data).as_deref(),
            Some("c"),
            "order {order:?}"
        );
        let stats = engine.stats();
        assert_eq!(stats.applied, 1, "order {order:?}");
        assert_eq!(stats.discarded, 2, "order {order:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn overlapping_cycles_under_one_locator_are_last_applied_wins() {
    let fetcher = ScriptedFetcher::new();
    let first = fetcher.gate("/status/1");
    fetcher.enqueue("/status/1", Ok(status_body("running")));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    advance_ms(INTERVAL_MS).await;
    assert_eq!(engine.snapshot().data.unwrap().status, RunStatus::Running);

    // The older cycle belongs to the same activation, so it still applies.
    first.send(Ok(status_body("pending"))).unwrap();
    settle().await;
    assert_eq!(engine.snapshot().data.unwrap().status, RunStatus::Pending);
}

// ---------------------------------------------------------------------------
// Test: teardown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn shutdown_suppresses_in_flight_results() {
    let fetcher = ScriptedFetcher::new();
    fetcher.enqueue("/status/1", Ok(status_body("running")));
    let mut engine = engine(&fetcher);
    let mut rx = engine.subscribe();

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    let in_flight = fetcher.gate("/status/1");
    advance_ms(INTERVAL_MS).await;
    assert_eq!(fetcher.call_count("/status/1"), 2);

    rx.mark_unchanged();
    engine.shutdown();
    in_flight.send(Ok(status_body("failed"))).unwrap();
    settle().await;

    assert!(!rx.has_changed().unwrap());
    assert_eq!(engine.snapshot().data.unwrap().status, RunStatus::Running);
    assert_eq!(engine.stats().discarded, 1);

    advance_ms(5 * INTERVAL_MS).await;
    assert_eq!(fetcher.call_count("/status/1"), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_engine_suppresses_in_flight_results() {
    let fetcher = ScriptedFetcher::new();
    let in_flight = fetcher.gate("/status/1");
    let mut engine = engine(&fetcher);
    let rx = engine.subscribe();

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    drop(engine);

    in_flight.send(Ok(status_body("completed"))).unwrap();
    settle().await;

    assert!(rx.borrow().data.is_none());
    advance_ms(5 * INTERVAL_MS).await;
    assert_eq!(fetcher.call_count("/status/1"), 1);
}

#[tokio::test(start_paused = true)]
async fn clearing_locator_after_shutdown_resets_state() {
    let fetcher = ScriptedFetcher::new();
    fetcher.respond("/status/1", &status_body("running"));
    let mut engine = engine(&fetcher);

    engine.set_locator(Some("/status/1".into()));
    settle().await;
    engine.shutdown();
    assert!(engine.snapshot().data.is_some());

    engine.set_locator(None);

    let state = engine.snapshot();
    assert!(state.data.is_none());
    assert!(state.locator.is_none());
    assert!(!state.is_active());
}
