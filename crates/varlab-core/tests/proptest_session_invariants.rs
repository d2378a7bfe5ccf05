//! Property-based invariant tests for the classification session.
//!
//! Random operation sequences against the built-in catalog must preserve:
//!
//! 1. The placement map keys are exactly the active level's item ids.
//! 2. `is_cleared()` iff every item sits in its true bucket.
//! 3. A drop changes an item's placement iff the target is its true bucket.
//! 4. After a reset every item is in the pool.
//! 5. `is_cleared()` only goes false through a reset or a level change.
//! 6. The shake flag, when set, names an item of the active level, and a
//!    shaking item stops shaking within 600ms whatever else happens.
//! 7. A level change (even mid-drag) leaves everything in the pool.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;
use varlab_core::{Advance, Category, Placement, Session};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Begin(usize),
    End(usize, Option<Placement>),
    Reset,
    Go(usize),
    Advance,
    Tick(u64),
    Dismiss,
    Check,
    Cancel,
}

fn target_strategy() -> impl Strategy<Value = Option<Placement>> {
    prop_oneof![
        Just(None),
        Just(Some(Placement::Unplaced)),
        Just(Some(Placement::Bucket(Category::Manipulated))),
        Just(Some(Placement::Bucket(Category::Controlled))),
        Just(Some(Placement::Bucket(Category::Responding))),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Item index 6 is out of range for every built-in level.
    prop_oneof![
        3 => (0usize..7).prop_map(Op::Begin),
        6 => ((0usize..7), target_strategy()).prop_map(|(i, t)| Op::End(i, t)),
        1 => Just(Op::Reset),
        1 => (0usize..6).prop_map(Op::Go),
        1 => Just(Op::Advance),
        2 => (0u64..1200).prop_map(Op::Tick),
        1 => Just(Op::Dismiss),
        1 => Just(Op::Check),
        1 => Just(Op::Cancel),
    ]
}

fn item_id(s: &Session, index: usize) -> String {
    s.level()
        .items
        .get(index)
        .map_or_else(|| "no-such-item".to_string(), |it| it.id.clone())
}

fn all_correct(s: &Session) -> bool {
    s.level()
        .items
        .iter()
        .all(|it| s.placement(&it.id) == Some(Placement::Bucket(it.category)))
}

fn all_unplaced(s: &Session) -> bool {
    s.placements().values().all(|p| *p == Placement::Unplaced)
}

fn check_structure(s: &Session) -> Result<(), TestCaseError> {
    let level_ids: HashSet<&str> = s.level().items.iter().map(|it| it.id.as_str()).collect();
    let map_ids: HashSet<&str> = s.placements().keys().map(String::as_str).collect();
    prop_assert_eq!(&level_ids, &map_ids);
    prop_assert_eq!(s.is_cleared(), all_correct(s));
    if let Some(id) = s.shaking() {
        prop_assert!(level_ids.contains(id), "shaking unknown item {}", id);
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// Invariants over random sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn random_play_preserves_invariants(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let mut s = Session::builtin();
        check_structure(&s)?;

        for op in ops {
            let was_cleared = s.is_cleared();
            let level_before = s.level_index();
            let resets_level = matches!(op, Op::Reset | Op::Go(_) | Op::Advance);

            match op {
                Op::Begin(i) => {
                    let id = item_id(&s, i);
                    s.begin_drag(&id);
                }
                Op::End(i, target) => {
                    let id = item_id(&s, i);
                    let before = s.placement(&id);
                    let truth = s.level().item(&id).map(|it| it.category);
                    s.end_drag(&id, target);
                    let after = s.placement(&id);
                    let matches = matches!(
                        (target, truth),
                        (Some(Placement::Bucket(t)), Some(c)) if t == c
                    );
                    if matches {
                        prop_assert_eq!(after, target);
                    } else {
                        prop_assert_eq!(after, before);
                    }
                    prop_assert_eq!(s.active_drag(), None);
                }
                Op::Reset => {
                    s.reset_level();
                    prop_assert!(all_unplaced(&s));
                    prop_assert!(!s.is_cleared());
                }
                Op::Go(i) => {
                    let moved = s.go_to_level(i);
                    prop_assert_eq!(moved, i < s.catalog().len());
                    if moved {
                        prop_assert_eq!(s.level_index(), i);
                        prop_assert!(all_unplaced(&s));
                        prop_assert_eq!(s.active_drag(), None);
                    } else {
                        prop_assert_eq!(s.level_index(), level_before);
                    }
                }
                Op::Advance => {
                    match s.advance_level() {
                        Advance::NotCleared => {
                            prop_assert!(!was_cleared);
                        }
                        Advance::Moved(i) => {
                            prop_assert_eq!(i, level_before + 1);
                            prop_assert!(all_unplaced(&s));
                        }
                        Advance::Finished => {
                            prop_assert!(s.is_finished());
                        }
                    }
                }
                Op::Tick(ms) => {
                    s.tick(Duration::from_millis(ms));
                }
                Op::Dismiss => s.dismiss_feedback(),
                Op::Check => {
                    let flipped = s.check_completion();
                    prop_assert!(!(flipped && was_cleared));
                }
                Op::Cancel => {
                    s.cancel_drag();
                    prop_assert_eq!(s.active_drag(), None);
                }
            }

            if was_cleared && !s.is_cleared() {
                prop_assert!(resets_level, "cleared dropped without reset or level change");
            }
            check_structure(&s)?;
        }
    }

    #[test]
    fn shake_always_clears_within_window(
        wrong in 0usize..6,
        noise in prop::collection::vec((0usize..6, target_strategy()), 0..10),
        steps in prop::collection::vec(1u64..200, 1..8),
    ) {
        let mut s = Session::builtin();
        let item = s.level().items[wrong].clone();
        let bad = Category::ALL
            .into_iter()
            .find(|&c| c != item.category)
            .map(Placement::Bucket);
        s.end_drag(&item.id, bad);
        prop_assert_eq!(s.shaking(), Some(item.id.as_str()));

        // Unrelated releases in the meantime must not extend or cancel it.
        let mut elapsed = 0u64;
        for ((i, target), step) in noise.iter().zip(steps.iter().cycle()) {
            if *i == wrong {
                continue;
            }
            let id = item_id(&s, *i);
            s.end_drag(&id, *target);
            s.tick(Duration::from_millis(*step));
            elapsed += step;
            if elapsed >= 600 {
                break;
            }
        }
        if elapsed < 600 {
            s.tick(Duration::from_millis(600 - elapsed));
        }
        prop_assert_ne!(s.shaking(), Some(item.id.as_str()));
    }
}
