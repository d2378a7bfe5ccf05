#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a real terminal: events are
//! injected by hand, ticks carry whatever elapsed time the test chooses, and
//! frames are captured into [`Canvas`]es for assertions.
//!
//! # Example
//!
//! ```ignore
//! let mut sim = ProgramSimulator::new(GameModel::new(Session::builtin()));
//! sim.init();
//! sim.resize(80, 30);
//! sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Char('r'))));
//! let frame = sim.capture_frame(80, 30);
//! assert!(frame.to_text().contains("本關已重置"));
//! ```

use std::time::Duration;

use crate::canvas::Canvas;
use crate::event::{Event, MouseButton, MouseEvent, MouseEventKind};
use crate::program::{Cmd, Model};

/// Record of a command executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    Tick(Duration),
    Log(String),
}

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    frames: Vec<Canvas>,
    command_log: Vec<CmdRecord>,
    running: bool,
    tick_rate: Option<Duration>,
    logs: Vec<String>,
}

impl<M: Model> ProgramSimulator<M> {
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            tick_rate: None,
            logs: Vec::new(),
        }
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Convert each event to a message and run it through `update`.
    /// Stops early once the model quits.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a message directly, bypassing event conversion.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Deliver a resize event.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.inject_event(Event::Resize { width, height });
    }

    /// Deliver a tick carrying `elapsed`, consuming any pending tick request
    /// the way the real runtime does.
    pub fn tick(&mut self, elapsed: Duration) {
        self.tick_rate = None;
        self.inject_event(Event::Tick(elapsed));
    }

    /// Left-button press, release, and the drag in between, as a real
    /// terminal reports a drag-and-drop gesture.
    pub fn drag(&mut self, from: (u16, u16), to: (u16, u16)) {
        let button = MouseButton::Left;
        self.inject_events(&[
            Event::Mouse(MouseEvent::new(MouseEventKind::Down(button), from.0, from.1)),
            Event::Mouse(MouseEvent::new(MouseEventKind::Drag(button), to.0, to.1)),
            Event::Mouse(MouseEvent::new(MouseEventKind::Up(button), to.0, to.1)),
        ]);
    }

    /// Left-button click at a cell.
    pub fn click(&mut self, x: u16, y: u16) {
        self.drag((x, y), (x, y));
    }

    /// Render the model into a fresh canvas and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Canvas {
        let mut canvas = Canvas::new(width, height);
        self.model.view(&mut canvas);
        self.frames.push(canvas);
        let last = self.frames.len() - 1;
        &self.frames[last]
    }

    pub fn frames(&self) -> &[Canvas] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Canvas> {
        self.frames.last()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pending tick request, if any.
    pub fn tick_rate(&self) -> Option<Duration> {
        self.tick_rate
    }

    /// Lines emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(after) => {
                self.tick_rate = Some(after);
                self.command_log.push(CmdRecord::Tick(after));
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
        }
    }
}
