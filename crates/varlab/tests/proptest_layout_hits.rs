//! Property-based tests for layout and pointer handling.
//!
//! For any terminal size and any reachable session state:
//!
//! 1. Every hit region lies inside the terminal.
//! 2. Pool chips never overlap, and each chip's cells hit that chip's item.
//! 3. Rendering never panics.
//!
//! For any sequence of raw mouse events, the session keeps its structural
//! invariants and a drop only ever lands an item in its true bucket.

use proptest::prelude::*;
use varlab::app::GameModel;
use varlab::canvas::Canvas;
use varlab::layout::{Hit, Layout};
use varlab::simulator::ProgramSimulator;
use varlab::{Event, MouseButton, MouseEvent, MouseEventKind};
use varlab_core::{Placement, Session};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Put the first `placed` items of `level` into their true buckets.
fn session_with(level: usize, placed: usize) -> Session {
    let mut s = Session::builtin();
    s.go_to_level(level);
    for item in s.level().items.clone().into_iter().take(placed) {
        s.end_drag(&item.id, Some(Placement::Bucket(item.category)));
    }
    s
}

fn mouse_strategy() -> impl Strategy<Value = Event> {
    let kind = prop_oneof![
        3 => Just(MouseEventKind::Down(MouseButton::Left)),
        2 => Just(MouseEventKind::Drag(MouseButton::Left)),
        3 => Just(MouseEventKind::Up(MouseButton::Left)),
        1 => Just(MouseEventKind::Moved),
        1 => Just(MouseEventKind::Down(MouseButton::Right)),
    ];
    (kind, 0u16..100, 0u16..40).prop_map(|(k, x, y)| Event::Mouse(MouseEvent::new(k, x, y)))
}

// ═════════════════════════════════════════════════════════════════════════
// Layout
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn regions_stay_on_screen_and_chips_hit_their_items(
        width in 0u16..200,
        height in 0u16..70,
        level in 0usize..4,
        placed in 0usize..7,
    ) {
        let s = session_with(level, placed);
        let layout = Layout::compute(&s, width, height);

        for (rect, _) in layout.regions() {
            prop_assert!(rect.right() <= width && rect.bottom() <= height);
        }

        for (i, (id, a)) in layout.chips.iter().enumerate() {
            prop_assert_eq!(s.placement(id), Some(Placement::Unplaced));
            for (_, b) in layout.chips.iter().skip(i + 1) {
                let disjoint = a.right() <= b.x || b.right() <= a.x
                    || a.bottom() <= b.y || b.bottom() <= a.y;
                prop_assert!(disjoint, "chips overlap: {:?} {:?}", a, b);
            }
            if a.right() <= width && a.bottom() <= height && !a.is_empty() {
                let expected = Hit::Item(id.clone());
                prop_assert_eq!(layout.hit_test(a.x, a.y), Some(&expected));
            }
        }

        let mut canvas = Canvas::new(width, height);
        varlab::view::draw(&s, &layout, &Default::default(), &mut canvas);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Raw mouse input
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn random_mouse_input_only_places_items_correctly(
        events in prop::collection::vec(mouse_strategy(), 1..80),
    ) {
        let mut sim = ProgramSimulator::new(GameModel::new(Session::builtin()));
        sim.init();
        sim.resize(100, 40);

        for event in events {
            let level_before = sim.model().session().level_index();
            sim.inject_event(event);
            let s = sim.model().session();

            if s.level_index() == level_before {
                for item in &s.level().items {
                    let p = s.placement(&item.id);
                    prop_assert!(
                        p == Some(Placement::Unplaced)
                            || p == Some(Placement::Bucket(item.category)),
                        "{} misplaced as {:?}", item.id, p
                    );
                }
            }
            prop_assert_eq!(s.placements().len(), s.level().items.len());
            prop_assert_eq!(
                s.is_cleared(),
                s.correct_count() == s.level().items.len()
            );
        }
        // Rendering the end state never panics.
        sim.capture_frame(100, 40);
    }
}
