//! Headless play-throughs: real mouse and key events through the game model.

use std::time::Duration;

use varlab::app::{GameModel, TICK_INTERVAL};
use varlab::geometry::Rect;
use varlab::simulator::{CmdRecord, ProgramSimulator};
use varlab::{Event, KeyCode, KeyEvent};
use varlab_core::{Category, Placement, Session, Severity};

const W: u16 = 100;
const H: u16 = 40;

fn sim() -> ProgramSimulator<GameModel> {
    let mut sim = ProgramSimulator::new(GameModel::new(Session::builtin()));
    sim.init();
    sim.resize(W, H);
    sim
}

fn center(r: Rect) -> (u16, u16) {
    (r.x + r.width / 2, r.y + r.height / 2)
}

fn key(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c)))
}

fn chip(sim: &ProgramSimulator<GameModel>, id: &str) -> (u16, u16) {
    center(sim.model().layout().chip(id).expect("chip on screen"))
}

fn bucket(sim: &ProgramSimulator<GameModel>, category: Category) -> (u16, u16) {
    center(sim.model().layout().bucket(category).expect("bucket on screen"))
}

fn wrong_bucket(category: Category) -> Category {
    Category::ALL
        .into_iter()
        .find(|&c| c != category)
        .expect("another category")
}

// ═════════════════════════════════════════════════════════════════════════
// Mouse play
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn drag_every_item_home_clears_the_level() {
    let mut sim = sim();
    let items = sim.model().session().level().items.clone();

    for item in &items {
        let from = chip(&sim, &item.id);
        let to = bucket(&sim, item.category);
        sim.drag(from, to);
        assert_eq!(
            sim.model().session().placement(&item.id),
            Some(Placement::Bucket(item.category))
        );
    }

    assert!(sim.model().session().is_cleared());
    assert!(sim.logs().iter().any(|l| l == "level 1 cleared"));

    let messages = sim.model().session().catalog().messages().clone();
    let frame = sim.capture_frame(W, H);
    assert!(frame.to_text().contains(&messages.level_cleared));

    let next = sim.model().layout().next.expect("next button");
    let (x, y) = center(next);
    sim.click(x, y);
    assert_eq!(sim.model().session().level_index(), 1);
    assert!(!sim.model().session().is_cleared());
}

#[test]
fn wrong_drop_shakes_then_settles_with_ticks() {
    let mut sim = sim();
    let item = sim.model().session().level().items[0].clone();
    let from = chip(&sim, &item.id);
    let to = bucket(&sim, wrong_bucket(item.category));
    sim.drag(from, to);

    let session = sim.model().session();
    assert_eq!(session.placement(&item.id), Some(Placement::Unplaced));
    assert_eq!(session.shaking(), Some(item.id.as_str()));
    assert_eq!(session.feedback().severity, Severity::Error);
    assert_eq!(sim.tick_rate(), Some(TICK_INTERVAL));

    let hint = session.feedback().message.clone();
    assert!(sim.capture_frame(W, H).to_text().contains(&hint));

    sim.tick(Duration::from_millis(600));
    assert_eq!(sim.model().session().shaking(), None);
    assert!(sim.model().session().feedback().visible);
    assert!(sim.tick_rate().is_some());

    sim.tick(Duration::from_millis(1400));
    assert!(!sim.model().session().feedback().visible);
    assert_eq!(sim.tick_rate(), None);
}

#[test]
fn release_outside_every_target_changes_nothing() {
    let mut sim = sim();
    let item = sim.model().session().level().items[2].clone();
    let from = chip(&sim, &item.id);
    sim.drag(from, (0, 0));

    let session = sim.model().session();
    assert_eq!(session.placement(&item.id), Some(Placement::Unplaced));
    assert_eq!(session.active_drag(), None);
    assert_eq!(session.shaking(), None);
    assert!(!session.feedback().visible);
}

#[test]
fn release_over_the_pool_is_a_no_op() {
    let mut sim = sim();
    let item = sim.model().session().level().items[0].clone();
    let from = chip(&sim, &item.id);
    let pool = sim.model().layout().pool;
    sim.drag(from, (pool.x + 1, pool.y));
    assert_eq!(
        sim.model().session().placement(&item.id),
        Some(Placement::Unplaced)
    );
    assert!(!sim.model().session().feedback().visible);
}

#[test]
fn clicking_a_tab_mid_drag_switches_level_and_resets() {
    let mut sim = sim();
    let first = sim.model().session().level().items[0].clone();
    let (fx, fy) = chip(&sim, &first.id);
    let to = bucket(&sim, first.category);
    sim.drag((fx, fy), to);

    let second = sim.model().session().level().items[1].clone();
    let (x, y) = chip(&sim, &second.id);
    sim.inject_event(Event::Mouse(varlab::MouseEvent::new(
        varlab::MouseEventKind::Down(varlab::MouseButton::Left),
        x,
        y,
    )));
    assert_eq!(sim.model().session().active_drag(), Some(second.id.as_str()));

    let tab = sim.model().layout().tabs[2];
    let (tx, ty) = center(tab);
    sim.click(tx, ty);

    let session = sim.model().session();
    assert_eq!(session.level_index(), 2);
    assert_eq!(session.active_drag(), None);
    assert!(session.placements().values().all(|p| *p == Placement::Unplaced));
}

#[test]
fn reset_button_puts_everything_back() {
    let mut sim = sim();
    let item = sim.model().session().level().items[0].clone();
    let from = chip(&sim, &item.id);
    let to = bucket(&sim, item.category);
    sim.drag(from, to);
    assert_eq!(sim.model().session().correct_count(), 1);

    let (x, y) = center(sim.model().layout().reset);
    sim.click(x, y);
    assert!(sim.command_log().contains(&CmdRecord::Msg));
    let session = sim.model().session();
    assert_eq!(session.correct_count(), 0);
    assert_eq!(session.feedback().severity, Severity::Info);
    assert!(session.feedback().visible);
}

#[test]
fn reset_notice_is_vertically_centered() {
    let mut sim = sim();
    sim.inject_event(key('r'));
    let notice = sim.model().session().catalog().messages().reset.clone();
    let frame = sim.capture_frame(W, H);
    let (_, row) = frame.find(&notice).expect("reset notice on screen");
    assert_eq!(row, (H - 3) / 2 + 1);
    assert!(row < H - 4, "toast must not cover the bottom rows");
}

// ═════════════════════════════════════════════════════════════════════════
// Keyboard play
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_only_run_through_every_level() {
    let mut sim = sim();
    let level_count = sim.model().session().catalog().len();
    let keys = ['a', 's', 'd'];

    for level in 0..level_count {
        assert_eq!(sim.model().session().level_index(), level);
        while let Some(id) = sim.model().selected_item().map(str::to_string) {
            let session = sim.model().session();
            let category = session.level().item(&id).expect("item").category;
            let slot = session
                .catalog()
                .buckets()
                .iter()
                .position(|b| b.category == category)
                .expect("bucket");
            sim.inject_event(key(keys[slot]));
        }
        assert!(sim.model().session().is_cleared());
        sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Enter)));
    }

    let session = sim.model().session();
    assert!(session.is_finished());
    let all_complete = session.catalog().messages().all_complete.clone();
    assert!(sim.capture_frame(W, H).to_text().contains(&all_complete));
    assert!(sim.logs().iter().any(|l| l == "all levels complete"));
}

#[test]
fn q_quits_and_later_input_is_ignored() {
    let mut sim = sim();
    sim.inject_events(&[key('q'), key('3')]);
    assert!(!sim.is_running());
    assert_eq!(sim.model().session().level_index(), 0);
}

#[test]
fn frames_render_at_every_common_size() {
    let mut sim = sim();
    for (w, h) in [(80, 24), (120, 40), (60, 20), (40, 12)] {
        sim.resize(w, h);
        let text = sim.capture_frame(w, h).to_text();
        assert!(!text.trim().is_empty());
    }
}
