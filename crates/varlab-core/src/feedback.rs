#![forbid(unsafe_code)]

//! Transient feedback toast.
//!
//! At most one message is visible. Showing a message replaces whatever was
//! there and restarts the auto-hide countdown from the moment it became
//! visible. Dismissing cancels the countdown, so a hide meant for an earlier
//! message can never land on a later one.
//!
//! ```text
//!   show ──▶ Visible ──(duration elapses)──▶ Hidden
//!              │  ▲                           ▲
//!              │  └──── show (restart) ───────┤
//!              └──────── dismiss ─────────────┘
//! ```

use std::time::Duration;

use crate::timer::OneShot;

/// Default time a toast stays up.
pub const DEFAULT_FEEDBACK_DURATION: Duration = Duration::from_millis(2000);

/// How a message should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    /// Correct placement or level cleared.
    Success,
    /// Wrong bucket.
    Error,
    /// Neutral notices (reset, level intro, all complete).
    #[default]
    Info,
}

impl Severity {
    /// Icon glyph for rendering.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Success => '\u{2713}', // ✓
            Self::Error => '\u{2717}',   // ✗
            Self::Info => 'i',
        }
    }

    /// ASCII fallback glyph.
    #[must_use]
    pub const fn as_ascii(self) -> char {
        match self {
            Self::Success => '+',
            Self::Error => 'x',
            Self::Info => 'i',
        }
    }
}

/// The current toast content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedback {
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
}

/// Owns the toast and its auto-hide timer.
#[derive(Debug, Clone)]
pub struct FeedbackChannel {
    current: Feedback,
    timer: OneShot,
}

impl FeedbackChannel {
    /// Create a hidden channel whose toasts last `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            current: Feedback::default(),
            timer: OneShot::new(duration),
        }
    }

    /// Current toast (possibly hidden).
    #[must_use]
    pub fn current(&self) -> &Feedback {
        &self.current
    }

    /// Time until auto-hide, if a toast is up.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    /// Replace the toast and restart the countdown.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity, generation: u64) {
        self.current = Feedback {
            message: message.into(),
            severity,
            visible: true,
        };
        self.timer.arm(generation);
    }

    /// Hide now and cancel the pending auto-hide. The message text is kept.
    pub fn dismiss(&mut self) {
        self.current.visible = false;
        self.timer.cancel();
    }

    /// Hide and forget the message entirely.
    pub fn clear(&mut self) {
        self.current = Feedback::default();
        self.timer.cancel();
    }

    /// Advance the countdown. Returns `true` if the toast was hidden.
    pub fn tick(&mut self, elapsed: Duration, generation: u64) -> bool {
        if self.timer.tick(elapsed, generation) {
            self.current.visible = false;
            true
        } else {
            false
        }
    }
}

impl Default for FeedbackChannel {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn starts_hidden() {
        let ch = FeedbackChannel::default();
        assert!(!ch.current().visible);
        assert_eq!(ch.current().message, "");
        assert_eq!(ch.remaining(), None);
    }

    #[test]
    fn auto_hides_after_duration() {
        let mut ch = FeedbackChannel::default();
        ch.show("hello", Severity::Success, 0);
        assert!(ch.current().visible);
        assert!(!ch.tick(ms(1999), 0));
        assert!(ch.current().visible);
        assert!(ch.tick(ms(1), 0));
        assert!(!ch.current().visible);
        assert_eq!(ch.current().message, "hello");
    }

    #[test]
    fn new_message_replaces_and_restarts() {
        let mut ch = FeedbackChannel::default();
        ch.show("first", Severity::Info, 0);
        ch.tick(ms(1500), 0);
        ch.show("second", Severity::Error, 0);
        assert_eq!(ch.current().message, "second");
        assert_eq!(ch.current().severity, Severity::Error);
        assert!(!ch.tick(ms(1500), 0));
        assert!(ch.current().visible);
        assert!(ch.tick(ms(500), 0));
    }

    #[test]
    fn dismiss_cancels_stale_hide() {
        let mut ch = FeedbackChannel::default();
        ch.show("first", Severity::Info, 0);
        ch.tick(ms(1900), 0);
        ch.dismiss();
        assert!(!ch.current().visible);
        assert!(!ch.tick(ms(200), 0));
        ch.show("second", Severity::Success, 0);
        assert!(!ch.tick(ms(200), 0));
        assert!(ch.current().visible);
    }

    #[test]
    fn generation_change_discards_timer() {
        let mut ch = FeedbackChannel::default();
        ch.show("old", Severity::Info, 4);
        assert!(!ch.tick(ms(5000), 5));
        // The toast itself stays up; the owner is expected to clear it.
        assert!(ch.current().visible);
    }

    #[test]
    fn clear_forgets_message() {
        let mut ch = FeedbackChannel::default();
        ch.show("x", Severity::Error, 0);
        ch.clear();
        assert_eq!(ch.current(), &Feedback::default());
    }

    #[test]
    fn severity_glyphs() {
        assert_eq!(Severity::Success.as_char(), '✓');
        assert_eq!(Severity::Error.as_ascii(), 'x');
        assert_eq!(Severity::default(), Severity::Info);
    }
}
