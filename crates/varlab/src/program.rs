#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! A [`Model`] owns all application state. The [`Program`] feeds it
//! [`Event`]s converted to messages, runs the [`Cmd`]s it returns, and
//! redraws the screen when something changed.
//!
//! ```text
//!   terminal ──▶ Event ──▶ Message ──▶ Model::update ──▶ Cmd
//!                                          │               │
//!                                          ▼               ▼
//!                                   Model::view      quit / tick / log
//!                                          │
//!                                          ▼
//!                                  Canvas ──▶ stdout
//! ```
//!
//! # Ticks
//!
//! `Cmd::Tick(d)` requests one [`Event::Tick`] roughly `d` from now. The
//! tick carries the wall time since the previous tick (or since ticking
//! started), so timers driven by it never lose time to input arriving in
//! between. Ticking stops after delivery unless the update that handles the
//! tick asks again.

use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, info, info_span};

use crate::canvas::Canvas;
use crate::event::Event;
use crate::terminal::{SessionOptions, TerminalSession};

/// The application: state plus its update and view functions.
pub trait Model: Sized {
    /// Messages the model reacts to. Terminal events convert into it.
    type Message: From<Event>;

    /// Called once before the first frame.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Apply a message and return follow-up commands.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Draw the current state. Must not mutate anything.
    fn view(&self, canvas: &mut Canvas);
}

/// Side effects requested by [`Model::update`].
#[derive(Default)]
pub enum Cmd<M> {
    #[default]
    None,
    /// Stop the program after this update.
    Quit,
    /// Run several commands in order.
    Batch(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Request one tick after the duration.
    Tick(Duration),
    /// Record a line in the log.
    Log(String),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn tick(after: Duration) -> Self {
        Self::Tick(after)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Combine commands, dropping `None`s. Collapses to a single command
    /// when only one remains.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
            Self::Log(_) => "Log",
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Runtime settings.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Draw on the alternate screen (default: true).
    pub alternate_screen: bool,
    /// Capture mouse input (default: true).
    pub mouse: bool,
    /// Longest time to block waiting for input when no tick is due
    /// (default: 250ms).
    pub poll_timeout: Duration,
    /// Quit automatically after this long (default: never).
    pub exit_after: Option<Duration>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            poll_timeout: Duration::from_millis(250),
            exit_after: None,
        }
    }
}

impl ProgramConfig {
    #[must_use]
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse = enabled;
        self
    }

    #[must_use]
    pub fn with_exit_after(mut self, after: Option<Duration>) -> Self {
        self.exit_after = after;
        self
    }
}

// ---------------------------------------------------------------------------
// Tick scheduling
// ---------------------------------------------------------------------------

/// Pending tick request plus the instant elapsed time is measured from.
#[derive(Debug, Clone, Copy)]
pub struct TickSchedule {
    rate: Option<Duration>,
    anchor: Instant,
}

impl TickSchedule {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            rate: None,
            anchor: now,
        }
    }

    /// Request a tick `after` from the anchor. Starting from idle re-anchors
    /// at `now`; an already pending request keeps its anchor.
    pub fn schedule(&mut self, after: Duration, now: Instant) {
        if self.rate.is_none() {
            self.anchor = now;
        }
        self.rate = Some(after);
    }

    /// Time left until the pending tick is due.
    #[must_use]
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.rate
            .map(|rate| rate.saturating_sub(now.saturating_duration_since(self.anchor)))
    }

    /// If a tick is due, consume it and return the elapsed time it carries.
    pub fn take_due(&mut self, now: Instant) -> Option<Duration> {
        let rate = self.rate?;
        let elapsed = now.saturating_duration_since(self.anchor);
        if elapsed < rate {
            return None;
        }
        self.rate = None;
        self.anchor = now;
        Some(elapsed)
    }
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

/// Runs a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
    terminal: TerminalSession,
    width: u16,
    height: u16,
    running: bool,
    dirty: bool,
    ticks: TickSchedule,
    started: Instant,
}

impl<M: Model> Program<M> {
    /// Take over the terminal.
    ///
    /// # Errors
    ///
    /// Fails if the terminal cannot enter raw mode or report its size.
    pub fn new(model: M, config: ProgramConfig) -> io::Result<Self> {
        let terminal = TerminalSession::new(&SessionOptions {
            alternate_screen: config.alternate_screen,
            mouse_capture: config.mouse,
        })?;
        let (width, height) = terminal.size()?;
        let now = Instant::now();
        Ok(Self {
            model,
            config,
            terminal,
            width,
            height,
            running: true,
            dirty: true,
            ticks: TickSchedule::new(now),
            started: now,
        })
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run until the model quits or the exit timer expires.
    pub fn run(&mut self) -> io::Result<()> {
        let cmd = {
            let _span = info_span!("varlab.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;
        self.dispatch(Event::Resize {
            width: self.width,
            height: self.height,
        })?;
        self.render_frame()?;

        while self.running {
            let timeout = self.effective_timeout();
            if self.terminal.poll_event(timeout)? {
                // Drain everything already queued before redrawing
                loop {
                    if let Some(event) = self.terminal.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.terminal.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if let Some(elapsed) = self.ticks.take_due(Instant::now()) {
                self.dispatch(Event::Tick(elapsed))?;
            }

            if let Some(limit) = self.config.exit_after
                && self.started.elapsed() >= limit
            {
                info!(?limit, "exit timer expired");
                self.running = false;
            }

            if self.running && self.dirty {
                self.render_frame()?;
            }
        }
        Ok(())
    }

    fn effective_timeout(&self) -> Duration {
        let now = Instant::now();
        let mut timeout = self.config.poll_timeout;
        if let Some(tick) = self.ticks.timeout(now) {
            timeout = timeout.min(tick);
        }
        if let Some(limit) = self.config.exit_after {
            timeout = timeout.min(limit.saturating_sub(self.started.elapsed()));
        }
        timeout
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            self.width = width;
            self.height = height;
        }
        self.dispatch(event)
    }

    fn dispatch(&mut self, event: Event) -> io::Result<()> {
        let kind = event_kind(&event);
        let cmd = {
            let _span = debug_span!("varlab.program.update", msg_type = kind).entered();
            let cmd = self.model.update(M::Message::from(event));
            debug!(cmd_type = cmd.type_name(), "update complete");
            cmd
        };
        self.dirty = true;
        self.execute_cmd(cmd)
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.dirty = true;
                self.execute_cmd(cmd)?;
            }
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(after) => self.ticks.schedule(after, Instant::now()),
            Cmd::Log(text) => info!(target: "varlab::app", "{text}"),
        }
        Ok(())
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let mut canvas = Canvas::new(self.width, self.height);
        self.model.view(&mut canvas);
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        canvas.flush(&mut out)?;
        out.flush()?;
        self.dirty = false;
        Ok(())
    }
}

fn event_kind(event: &Event) -> &'static str {
    match event {
        Event::Key(_) => "Key",
        Event::Mouse(_) => "Mouse",
        Event::Resize { .. } => "Resize",
        Event::Focus(_) => "Focus",
        Event::Tick(_) => "Tick",
    }
}
