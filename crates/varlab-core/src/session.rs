#![forbid(unsafe_code)]

//! The classification session: the game's only mutable state.
//!
//! A [`Session`] tracks where every item of the active level sits, validates
//! drops against each item's true category, detects completion, and drives
//! the feedback toast and the error-shake flag.
//!
//! # State machine
//!
//! ```text
//!            begin_drag(id)              end_drag(id, target)
//!   Idle ─────────────────▶ Dragging(id) ─────────────────────▶ Idle
//!                                                   │
//!                                  mismatch ────────┴──▶ Flash(id, error)
//!                                                         (shake clears on its own)
//! ```
//!
//! # Invariants
//!
//! 1. The placement map holds exactly one entry per item of the active level.
//! 2. `is_cleared()` is true iff every item sits in its true bucket. Once set
//!    it stays set until [`reset_level`](Session::reset_level) or a level
//!    change.
//! 3. At most one item is being dragged.
//! 4. Every reset and level change bumps [`generation`](Session::generation);
//!    timers armed under an older generation never fire.
//!
//! # Edge cases
//!
//! | Input | Result |
//! |-------|--------|
//! | Unknown item id | No-op ([`DropOutcome::Ignored`]) |
//! | Released outside any target | Drag ends, nothing else changes |
//! | Dropped on the pool | Same as released outside |
//! | Out-of-range level index | No-op, returns `false` |
//! | Advance while not cleared | [`Advance::NotCleared`] |

use std::collections::HashMap;
use std::time::Duration;

use crate::catalog::{Catalog, Item, Level};
use crate::category::{Category, Placement};
use crate::feedback::{DEFAULT_FEEDBACK_DURATION, Feedback, FeedbackChannel, Severity};
#[cfg_attr(not(feature = "tracing"), allow(unused_imports))]
use crate::logging::TARGET;
use crate::timer::OneShot;

/// Default time an item shakes after a wrong drop.
pub const DEFAULT_SHAKE_DURATION: Duration = Duration::from_millis(600);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What [`Session::advance_level`] does after the last level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastLevel {
    /// Enter the terminal "all levels complete" state.
    #[default]
    Finish,
    /// Start over at the first level.
    Wrap,
}

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the shake flag stays set (default: 600ms).
    pub shake_duration: Duration,
    /// How long a toast stays visible (default: 2000ms).
    pub feedback_duration: Duration,
    /// Behavior past the final level (default: [`LastLevel::Finish`]).
    pub last_level: LastLevel,
    /// Show an info toast naming the level on every level entry
    /// (default: false).
    pub announce_levels: bool,
    /// Level to start on. Out-of-range values start on level 0.
    pub start_level: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shake_duration: DEFAULT_SHAKE_DURATION,
            feedback_duration: DEFAULT_FEEDBACK_DURATION,
            last_level: LastLevel::Finish,
            announce_levels: false,
            start_level: 0,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_shake_duration(mut self, d: Duration) -> Self {
        self.shake_duration = d;
        self
    }

    #[must_use]
    pub fn with_feedback_duration(mut self, d: Duration) -> Self {
        self.feedback_duration = d;
        self
    }

    /// Wrap to the first level instead of finishing.
    #[must_use]
    pub fn wrap_at_end(mut self) -> Self {
        self.last_level = LastLevel::Wrap;
        self
    }

    #[must_use]
    pub fn announce_levels(mut self, announce: bool) -> Self {
        self.announce_levels = announce;
        self
    }

    #[must_use]
    pub fn start_level(mut self, index: usize) -> Self {
        self.start_level = index;
        self
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of releasing a dragged item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No target, the pool, or an unknown item. Nothing changed.
    Ignored,
    /// Placed in its true bucket. `cleared` is true if this drop completed
    /// the level.
    Accepted { cleared: bool },
    /// Wrong bucket. The item stays where it was and shakes.
    Rejected { hint: String },
}

/// Result of [`Session::advance_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The level is not cleared yet; nothing changed.
    NotCleared,
    /// Now on the given level.
    Moved(usize),
    /// The last level was cleared and the session is finished.
    Finished,
}

/// Owned snapshot of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub level_index: usize,
    /// Item ids with their placement, in level order.
    pub placements: Vec<(String, Placement)>,
    pub active_drag: Option<String>,
    pub shaking: Option<String>,
    pub feedback: Feedback,
    pub cleared: bool,
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Runtime state for one player.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    config: SessionConfig,
    level_index: usize,
    placements: HashMap<String, Placement>,
    active_drag: Option<String>,
    shaking: Option<String>,
    shake_timer: OneShot,
    feedback: FeedbackChannel,
    cleared: bool,
    finished: bool,
    generation: u64,
}

impl Session {
    /// Start a session on `config.start_level`.
    #[must_use]
    pub fn new(catalog: Catalog, config: SessionConfig) -> Self {
        let start = if config.start_level < catalog.len() {
            config.start_level
        } else {
            0
        };
        let mut session = Self {
            shake_timer: OneShot::new(config.shake_duration),
            feedback: FeedbackChannel::new(config.feedback_duration),
            catalog,
            config,
            level_index: start,
            placements: HashMap::new(),
            active_drag: None,
            shaking: None,
            cleared: false,
            finished: false,
            generation: 0,
        };
        session.enter_level(start);
        session
    }

    /// Session over the built-in catalog with default tuning.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(Catalog::builtin(), SessionConfig::default())
    }

    // --- drag lifecycle ----------------------------------------------------

    /// Pick up an item. Clears any shake and hides the toast.
    ///
    /// Returns `false` (and changes nothing) for an id not in this level.
    pub fn begin_drag(&mut self, item_id: &str) -> bool {
        if self.level().item(item_id).is_none() {
            crate::debug!(target: TARGET, item_id, "begin_drag ignored: unknown item");
            return false;
        }
        self.active_drag = Some(item_id.to_string());
        self.shaking = None;
        self.shake_timer.cancel();
        self.feedback.dismiss();
        crate::trace!(target: TARGET, item_id, "drag started");
        true
    }

    /// Release an item over `target` (`None` when outside every target).
    pub fn end_drag(&mut self, item_id: &str, target: Option<Placement>) -> DropOutcome {
        self.active_drag = None;

        let Some(category) = self.level().item(item_id).map(|it| it.category) else {
            crate::debug!(target: TARGET, item_id, "end_drag ignored: unknown item");
            return DropOutcome::Ignored;
        };

        let bucket = match target {
            Some(Placement::Bucket(bucket)) => bucket,
            Some(Placement::Unplaced) | None => return DropOutcome::Ignored,
        };

        if bucket == category {
            self.placements
                .insert(item_id.to_string(), Placement::Bucket(bucket));
            let success = self.catalog.messages().success.clone();
            self.feedback.show(success, Severity::Success, self.generation);
            crate::debug!(target: TARGET, item_id, %bucket, "drop accepted");
            let cleared = self.check_completion();
            DropOutcome::Accepted { cleared }
        } else {
            let hint = self
                .catalog
                .messages()
                .hint_for(category.as_str())
                .to_string();
            self.feedback.show(hint.clone(), Severity::Error, self.generation);
            self.shaking = Some(item_id.to_string());
            self.shake_timer.arm(self.generation);
            crate::debug!(target: TARGET, item_id, %bucket, %category, "drop rejected");
            DropOutcome::Rejected { hint }
        }
    }

    /// Abandon the active drag, if any, as if released outside every target.
    pub fn cancel_drag(&mut self) {
        if self.active_drag.take().is_some() {
            crate::trace!(target: TARGET, "drag cancelled");
        }
    }

    /// Mark the level cleared if every item sits in its true bucket.
    ///
    /// Returns `true` only on the transition. Calling it again after the
    /// level is cleared does nothing and emits no feedback.
    pub fn check_completion(&mut self) -> bool {
        if self.cleared {
            return false;
        }
        let level = &self.catalog.levels()[self.level_index];
        let done = level.items.iter().all(|it| {
            self.placements
                .get(&it.id)
                .is_some_and(|p| p.is_correct_for(it.category))
        });
        if !done {
            return false;
        }
        self.cleared = true;
        let msg = self.catalog.messages().level_cleared.clone();
        self.feedback.show(msg, Severity::Success, self.generation);
        crate::info!(target: TARGET, level = self.level_index, "level cleared");
        true
    }

    // --- level control -----------------------------------------------------

    /// Put every item back in the pool and start the level over.
    pub fn reset_level(&mut self) {
        self.reinitialize();
        let msg = self.catalog.messages().reset.clone();
        self.feedback.show(msg, Severity::Info, self.generation);
        crate::info!(target: TARGET, level = self.level_index, "level reset");
    }

    /// Switch to level `index`. Out-of-range indices are ignored.
    pub fn go_to_level(&mut self, index: usize) -> bool {
        if index >= self.catalog.len() {
            crate::warn!(target: TARGET, index, "go_to_level ignored: out of range");
            return false;
        }
        self.enter_level(index);
        true
    }

    /// Move on from a cleared level.
    pub fn advance_level(&mut self) -> Advance {
        if !self.cleared {
            return Advance::NotCleared;
        }
        let next = self.level_index + 1;
        if next < self.catalog.len() {
            self.enter_level(next);
            return Advance::Moved(next);
        }
        match self.config.last_level {
            LastLevel::Wrap => {
                self.enter_level(0);
                Advance::Moved(0)
            }
            LastLevel::Finish => {
                if !self.finished {
                    self.finished = true;
                    self.active_drag = None;
                    let msg = self.catalog.messages().all_complete.clone();
                    self.feedback.show(msg, Severity::Info, self.generation);
                    crate::info!(target: TARGET, "all levels complete");
                }
                Advance::Finished
            }
        }
    }

    // --- feedback / timers ---------------------------------------------------

    /// Hide the toast now and cancel its pending auto-hide.
    pub fn dismiss_feedback(&mut self) {
        self.feedback.dismiss();
    }

    /// Advance the shake and toast timers by `elapsed`.
    ///
    /// Returns `true` if anything visible changed.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let mut changed = false;
        if self.shake_timer.tick(elapsed, self.generation) {
            self.shaking = None;
            changed = true;
        }
        if self.feedback.tick(elapsed, self.generation) {
            changed = true;
        }
        changed
    }

    /// Time until the next timer fires, if any is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.shake_timer.remaining(), self.feedback.remaining()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // --- observers -----------------------------------------------------------

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    /// The active level.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.catalog.levels()[self.level_index]
    }

    /// Where `item_id` sits, or `None` if it is not in this level.
    #[must_use]
    pub fn placement(&self, item_id: &str) -> Option<Placement> {
        self.placements.get(item_id).copied()
    }

    /// The full placement map for the active level.
    #[must_use]
    pub fn placements(&self) -> &HashMap<String, Placement> {
        &self.placements
    }

    /// Items still in the pool, in level order.
    pub fn pool_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items_at(Placement::Unplaced)
    }

    /// Items placed in `category`'s bucket, in level order.
    pub fn bucket_items(&self, category: Category) -> impl Iterator<Item = &Item> + '_ {
        self.items_at(Placement::Bucket(category))
    }

    /// Number of items already in their true bucket.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.level()
            .items
            .iter()
            .filter(|it| {
                self.placement(&it.id)
                    .is_some_and(|p| p.is_correct_for(it.category))
            })
            .count()
    }

    #[must_use]
    pub fn active_drag(&self) -> Option<&str> {
        self.active_drag.as_deref()
    }

    #[must_use]
    pub fn shaking(&self) -> Option<&str> {
        self.shaking.as_deref()
    }

    #[must_use]
    pub fn feedback(&self) -> &Feedback {
        self.feedback.current()
    }

    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// True after the final level is cleared and advanced past
    /// (with [`LastLevel::Finish`]).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Owned copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        SessionView {
            level_index: self.level_index,
            placements: self
                .level()
                .items
                .iter()
                .map(|it| (it.id.clone(), self.placement(&it.id).unwrap_or_default()))
                .collect(),
            active_drag: self.active_drag.clone(),
            shaking: self.shaking.clone(),
            feedback: self.feedback.current().clone(),
            cleared: self.cleared,
            finished: self.finished,
        }
    }

    // --- internals -----------------------------------------------------------

    fn items_at(&self, placement: Placement) -> impl Iterator<Item = &Item> + '_ {
        self.level()
            .items
            .iter()
            .filter(move |it| self.placements.get(&it.id) == Some(&placement))
    }

    fn enter_level(&mut self, index: usize) {
        self.level_index = index;
        self.reinitialize();
        if self.config.announce_levels {
            let msg = self.catalog.messages().intro(&self.level().title);
            self.feedback.show(msg, Severity::Info, self.generation);
        }
        crate::info!(target: TARGET, level = index, "entered level");
    }

    fn reinitialize(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.placements = self
            .level()
            .items
            .iter()
            .map(|it| (it.id.clone(), Placement::Unplaced))
            .collect();
        self.cleared = false;
        self.finished = false;
        self.active_drag = None;
        self.shaking = None;
        self.shake_timer.cancel();
        self.feedback.clear();
    }
}
