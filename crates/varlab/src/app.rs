#![forbid(unsafe_code)]

//! The game model: input handling on top of a [`Session`].
//!
//! Mouse gestures and keys are translated into session operations. The
//! session stays the single source of truth; the model only adds the pointer
//! position, the keyboard selection and the terminal size.
//!
//! Level navigation has two triggers (a key and a button), so both decode to
//! the same intent message, which the runtime feeds back through `update`.
//!
//! # Input
//!
//! | Input | Action |
//! |-------|--------|
//! | Press on a pool chip | Begin dragging it |
//! | Release over a bucket / the pool / elsewhere | Drop there / cancel / cancel |
//! | Click a level tab, reset, or next | Switch level, reset, advance |
//! | `q`, Ctrl+C | Quit |
//! | `r` | Reset the level |
//! | `1`-`9` | Select a level |
//! | `n`, Enter | Advance after clearing |
//! | Esc | Cancel the drag, else dismiss the toast |
//! | Left / Right | Choose a pool item |
//! | `a` / `s` / `d` | Drop the chosen item on bucket 1 / 2 / 3 |

use std::time::Duration;

use tracing::debug;
use varlab_core::{Advance, DropOutcome, Placement, Session};

use crate::canvas::Canvas;
use crate::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use crate::layout::{Hit, Layout};
use crate::program::{Cmd, Model};
use crate::view::{self, Overlay};

/// Longest gap between ticks while a timer is pending.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Messages handled by [`GameModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
    FocusLost,
    Tick(Duration),
    /// Put every item back in the pool.
    Reset,
    /// Switch to a zero-based level.
    SelectLevel(usize),
    /// Move past a cleared level.
    Advance,
    Noop,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Self::Key(key),
            Event::Mouse(mouse) => Self::Mouse(mouse),
            Event::Resize { width, height } => Self::Resize { width, height },
            Event::Focus(false) => Self::FocusLost,
            Event::Focus(true) => Self::Noop,
            Event::Tick(elapsed) => Self::Tick(elapsed),
        }
    }
}

/// Application state for the terminal game.
#[derive(Debug)]
pub struct GameModel {
    session: Session,
    width: u16,
    height: u16,
    pointer: Option<(u16, u16)>,
    selected: usize,
    ascii: bool,
}

impl GameModel {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            width: 0,
            height: 0,
            pointer: None,
            selected: 0,
            ascii: false,
        }
    }

    /// Draw status icons with ASCII stand-ins.
    #[must_use]
    pub fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Pool item currently chosen with the keyboard.
    #[must_use]
    pub fn selected_item(&self) -> Option<&str> {
        let count = self.session.pool_items().count();
        if count == 0 {
            return None;
        }
        self.session
            .pool_items()
            .nth(self.selected.min(count - 1))
            .map(|it| it.id.as_str())
    }

    /// Layout at the last known terminal size.
    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout::compute(&self.session, self.width, self.height)
    }

    /// Follow-up tick while any session timer is pending.
    fn schedule(&self) -> Cmd<Msg> {
        match self.session.next_deadline() {
            Some(deadline) => Cmd::tick(deadline.min(TICK_INTERVAL)),
            None => Cmd::none(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if key.ctrl() && key.is_char('c') {
            return Cmd::quit();
        }
        match key.code {
            KeyCode::Char('q') => return Cmd::quit(),
            KeyCode::Char('r') => return Cmd::msg(Msg::Reset),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                return Cmd::msg(Msg::SelectLevel(index));
            }
            KeyCode::Char('n') | KeyCode::Enter => return Cmd::msg(Msg::Advance),
            KeyCode::Escape => {
                if self.session.active_drag().is_some() {
                    self.session.cancel_drag();
                    self.pointer = None;
                } else {
                    self.session.dismiss_feedback();
                }
            }
            KeyCode::Left => self.move_selection(false),
            KeyCode::Right | KeyCode::Tab => self.move_selection(true),
            KeyCode::Char(c @ ('a' | 's' | 'd')) => {
                let slot = match c {
                    'a' => 0,
                    's' => 1,
                    _ => 2,
                };
                return self.drop_selected(slot);
            }
            _ => {}
        }
        Cmd::none()
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Cmd<Msg> {
        let (x, y) = mouse.position();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = self.layout().hit_test(x, y).cloned();
                match hit {
                    Some(Hit::Item(id)) => {
                        if self.session.begin_drag(&id) {
                            self.pointer = Some((x, y));
                        }
                    }
                    Some(Hit::LevelTab(index)) => return Cmd::msg(Msg::SelectLevel(index)),
                    Some(Hit::Reset) => return Cmd::msg(Msg::Reset),
                    Some(Hit::Next) => return Cmd::msg(Msg::Advance),
                    Some(Hit::Bucket(_) | Hit::Pool) | None => {}
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                if self.session.active_drag().is_some() {
                    self.pointer = Some((x, y));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(id) = self.session.active_drag().map(str::to_string) else {
                    return Cmd::none();
                };
                self.pointer = None;
                let target = match self.layout().hit_test(x, y) {
                    Some(Hit::Bucket(category)) => Some(Placement::Bucket(*category)),
                    Some(Hit::Pool | Hit::Item(_)) => Some(Placement::Unplaced),
                    _ => None,
                };
                return self.release(&id, target);
            }
            _ => {}
        }
        Cmd::none()
    }

    fn release(&mut self, id: &str, target: Option<Placement>) -> Cmd<Msg> {
        let outcome = self.session.end_drag(id, target);
        debug!(item = id, ?target, ?outcome, "drop");
        self.clamp_selection();
        match outcome {
            DropOutcome::Accepted { cleared: true } => Cmd::log(format!(
                "level {} cleared",
                self.session.level_index() + 1
            )),
            _ => Cmd::none(),
        }
    }

    fn drop_selected(&mut self, slot: usize) -> Cmd<Msg> {
        let Some(id) = self.selected_item().map(str::to_string) else {
            return Cmd::none();
        };
        let Some(category) = self.session.catalog().buckets().get(slot).map(|b| b.category)
        else {
            return Cmd::none();
        };
        if !self.session.begin_drag(&id) {
            return Cmd::none();
        }
        self.release(&id, Some(Placement::Bucket(category)))
    }

    fn go_to(&mut self, index: usize) -> Cmd<Msg> {
        if self.session.go_to_level(index) {
            self.pointer = None;
            self.selected = 0;
        }
        Cmd::none()
    }

    fn advance(&mut self) -> Cmd<Msg> {
        match self.session.advance_level() {
            Advance::NotCleared => Cmd::none(),
            Advance::Moved(index) => {
                self.pointer = None;
                self.selected = 0;
                Cmd::log(format!("entered level {}", index + 1))
            }
            Advance::Finished => Cmd::log("all levels complete"),
        }
    }

    fn move_selection(&mut self, forward: bool) {
        let count = self.session.pool_items().count();
        if count == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected.min(count - 1);
        self.selected = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
    }

    fn clamp_selection(&mut self) {
        let count = self.session.pool_items().count();
        self.selected = self.selected.min(count.saturating_sub(1));
    }
}

impl Model for GameModel {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        self.schedule()
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        let cmd = match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Resize { width, height } => {
                self.width = width;
                self.height = height;
                Cmd::none()
            }
            Msg::FocusLost => {
                self.session.cancel_drag();
                self.pointer = None;
                Cmd::none()
            }
            Msg::Tick(elapsed) => {
                self.session.tick(elapsed);
                Cmd::none()
            }
            Msg::Reset => {
                self.session.reset_level();
                self.pointer = None;
                self.clamp_selection();
                Cmd::none()
            }
            Msg::SelectLevel(index) => self.go_to(index),
            Msg::Advance => self.advance(),
            Msg::Noop => Cmd::none(),
        };
        // A follow-up message schedules from the state it produces.
        if matches!(cmd, Cmd::Quit | Cmd::Msg(_)) {
            return cmd;
        }
        Cmd::batch(vec![cmd, self.schedule()])
    }

    fn view(&self, canvas: &mut Canvas) {
        let layout = Layout::compute(&self.session, canvas.width(), canvas.height());
        let overlay = Overlay {
            pointer: self.pointer,
            selected: self.selected_item(),
            ascii: self.ascii,
        };
        view::draw(&self.session, &layout, &overlay, canvas);
    }
}
