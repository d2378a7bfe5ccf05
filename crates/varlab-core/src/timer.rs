#![forbid(unsafe_code)]

//! Single-shot countdown timers driven by elapsed-time ticks.
//!
//! A [`OneShot`] is armed with the session generation current at the time.
//! Each [`tick`](OneShot::tick) subtracts the elapsed time; when the countdown
//! reaches zero the timer fires once and disarms. If the session generation
//! has moved on since arming, the timer is discarded without firing, so a
//! level change or reset can never be hit by a callback meant for the old
//! state.
//!
//! # Example
//!
//! ```
//! use varlab_core::timer::OneShot;
//! use std::time::Duration;
//!
//! let mut t = OneShot::new(Duration::from_millis(600));
//! t.arm(0);
//! assert!(!t.tick(Duration::from_millis(500), 0));
//! assert!(t.tick(Duration::from_millis(100), 0));
//! assert_eq!(t.remaining(), None);
//! ```

use std::time::Duration;

/// Cancellable, restartable single-shot countdown.
#[derive(Debug, Clone)]
pub struct OneShot {
    duration: Duration,
    remaining: Option<Duration>,
    generation: u64,
}

impl OneShot {
    /// Create a disarmed timer with the given countdown.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: None,
            generation: 0,
        }
    }

    /// Time left, or `None` when disarmed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// Start (or restart) the full countdown under `generation`.
    pub fn arm(&mut self, generation: u64) {
        self.remaining = Some(self.duration);
        self.generation = generation;
    }

    /// Drop any pending countdown.
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Advance by `elapsed`. Returns `true` exactly once, on the tick that
    /// reaches zero. A timer armed under a generation other than `current`
    /// is disarmed silently.
    pub fn tick(&mut self, elapsed: Duration, current: u64) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        if self.generation != current {
            self.remaining = None;
            return false;
        }
        let left = remaining.saturating_sub(elapsed);
        if left.is_zero() {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(left);
            false
        }
    }
}
