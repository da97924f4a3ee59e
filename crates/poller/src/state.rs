//! Published state of a polling engine and the liveness-token rules that
//! guard it.
//!
//! Every activation of an engine owns one generation number. Attempts are
//! stamped with a [`LivenessToken`] carrying that generation when they are
//! issued, and [`PollState::apply`] only mutates the state when the token
//! still matches. Retiring an activation bumps the generation, so any
//! result stamped with the old value is discarded on arrival.

use chrono::Utc;
use mfw_core::{FetchError, Timestamp};

// ---------------------------------------------------------------------------
// LivenessToken
// ---------------------------------------------------------------------------

/// Generation stamp captured when a poll cycle is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessToken {
    generation: u64,
}

impl LivenessToken {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

// ---------------------------------------------------------------------------
// ApplyOutcome
// ---------------------------------------------------------------------------

/// Why a completed attempt was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The attempt was issued under a generation that has since been
    /// retired (locator change, interval change or teardown).
    Stale,
}

/// Result of offering a completed attempt to the published state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Discarded(DiscardReason),
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

// ---------------------------------------------------------------------------
// PollState
// ---------------------------------------------------------------------------

/// Latest payload and error of one polling engine.
///
/// A failed attempt records its error next to the last good payload
/// instead of replacing it, so a transient failure never blanks the view.
#[derive(Debug, Clone)]
pub struct PollState<T> {
    generation: u64,
    /// Locator currently being polled; `None` when inactive.
    pub locator: Option<String>,
    /// Last successfully decoded payload for `locator`.
    pub data: Option<T>,
    /// Error of the most recent attempt, cleared by the next success.
    pub error: Option<FetchError>,
    /// Failed attempts since the last success.
    pub consecutive_failures: u32,
    pub last_success_at: Option<Timestamp>,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            locator: None,
            data: None,
            error: None,
            consecutive_failures: 0,
            last_success_at: None,
        }
    }
}

impl<T> PollState<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.locator.is_some()
    }

    /// Active but nothing has been decoded yet.
    pub fn is_loading(&self) -> bool {
        self.is_active() && self.data.is_none()
    }

    /// Token for an attempt issued right now.
    pub(crate) fn token(&self) -> LivenessToken {
        LivenessToken {
            generation: self.generation,
        }
    }

    /// Offer a completed attempt. The state is only touched when `token`
    /// belongs to the current generation.
    pub(crate) fn apply(
        &mut self,
        token: LivenessToken,
        result: Result<T, FetchError>,
    ) -> ApplyOutcome {
        if token.generation != self.generation {
            return ApplyOutcome::Discarded(DiscardReason::Stale);
        }

        match result {
            Ok(payload) => {
                self.data = Some(payload);
                self.error = None;
                self.consecutive_failures = 0;
                self.last_success_at = Some(Utc::now());
            }
            Err(e) => {
                self.error = Some(e);
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }
        ApplyOutcome::Applied
    }

    /// Kill `token` if it is still the live one. Returns whether the
    /// generation moved.
    pub(crate) fn retire(&mut self, token: LivenessToken) -> bool {
        if token.generation != self.generation {
            return false;
        }
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Drop everything tied to the previous locator. Returns whether any
    /// visible field changed.
    pub(crate) fn reset(&mut self, locator: Option<String>) -> bool {
        let changed = self.locator != locator
            || self.data.is_some()
            || self.error.is_some()
            || self.consecutive_failures != 0;

        self.locator = locator;
        self.data = None;
        self.error = None;
        self.consecutive_failures = 0;
        self.last_success_at = None;
        changed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
