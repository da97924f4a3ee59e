//! Pure projections of poll state into renderable panels.
//!
//! Views only read a [`PollState`] snapshot; nothing here can reach back
//! into the polling engines.

pub mod results;
pub mod status;

use std::fmt;

use mfw_poller::PollState;

pub use results::{Disclosure, ResultsView};
pub use status::{StatusView, TaskRow};

/// Color used when a status or verdict has no entry in its table.
pub const NEUTRAL_COLOR: &str = "#94a3b8";

/// Consecutive failures after which the retry notice reads as persistent.
pub const PERSISTENT_FAILURE_THRESHOLD: u32 = 5;

/// Colored label shown for a status or verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub color: &'static str,
}

impl Badge {
    pub fn new(label: impl Into<String>, color: &'static str) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ({})", self.label, self.color)
    }
}

/// Benign "still trying" affordance shown while a feed keeps failing.
///
/// The feed keeps polling at its normal cadence regardless; this only
/// changes what the operator sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryNotice {
    pub failures: u32,
    pub message: String,
    /// Failures reached [`PERSISTENT_FAILURE_THRESHOLD`].
    pub persistent: bool,
}

impl RetryNotice {
    /// Notice for the latest error in `state`, unless its HTTP status is
    /// one of `expected` (e.g. 409 from the results feed before the
    /// workflow completes).
    pub fn from_state<T>(state: &PollState<T>, expected: &[u16]) -> Option<Self> {
        let error = state.error.as_ref()?;
        if error.status().is_some_and(|s| expected.contains(&s)) {
            return None;
        }
        Some(Self {
            failures: state.consecutive_failures,
            message: error.to_string(),
            persistent: state.consecutive_failures >= PERSISTENT_FAILURE_THRESHOLD,
        })
    }
}

impl fmt::Display for RetryNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.persistent {
            write!(
                f,
                "backend unreachable for {} attempts, still trying ({})",
                self.failures, self.message
            )
        } else {
            write!(
                f,
                "still trying ({} failed, last error: {})",
                self.failures, self.message
            )
        }
    }
}
