//! Race-free polling of the workflow engine's read feeds.
//!
//! - [`PollingEngine`]: polls one locator on a fixed cadence and
//!   publishes the latest payload/error through a `tokio::sync::watch`
//!   channel.
//! - [`PollState`]: the published cell, guarded by liveness tokens so
//!   results from a retired activation are never applied.
//! - [`WorkflowSubscriptions`]: derives the status and results locators
//!   from the current workflow id and drives one engine per feed.

pub mod engine;
pub mod state;
pub mod subscription;

pub use engine::{fetch_and_decode, EngineStats, PollingEngine};
pub use state::{ApplyOutcome, DiscardReason, LivenessToken, PollState};
pub use subscription::{FeedBinding, WorkflowSubscriptions};
