#![forbid(unsafe_code)]

//! Terminal front end for the varlab variable-sorting game.
//!
//! - [`program`]: Elm-style runtime (model, commands, event loop)
//! - [`simulator`]: headless runtime for tests
//! - [`app`]: the game model on top of [`varlab_core::Session`]
//! - [`layout`] / [`view`]: screen placement, hit testing and drawing
//! - [`cli`] / [`logging`]: process configuration

use std::time::Duration;

use varlab_core::{Catalog, CatalogError, Session, SessionConfig};

pub mod app;
pub mod canvas;
pub mod cli;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod program;
pub mod simulator;
pub mod terminal;
pub mod view;

pub use app::{GameModel, Msg};
pub use event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::ProgramSimulator;

/// Session tuning implied by the command line.
#[must_use]
pub fn session_config(opts: &cli::Opts) -> SessionConfig {
    let config = SessionConfig::default()
        .start_level(opts.start_index())
        .announce_levels(true);
    if opts.wrap { config.wrap_at_end() } else { config }
}

/// Load the configured catalog (or the built-in one) and start a session.
///
/// # Errors
///
/// Propagates catalog file and validation errors.
pub fn build_session(opts: &cli::Opts) -> Result<Session, CatalogError> {
    let catalog = match &opts.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    if opts.start_index() >= catalog.len() {
        tracing::warn!(
            level = opts.level,
            levels = catalog.len(),
            "start level out of range, starting at level 1"
        );
    }
    Ok(Session::new(catalog, session_config(opts)))
}

/// Runtime settings implied by the command line.
#[must_use]
pub fn program_config(opts: &cli::Opts) -> ProgramConfig {
    let exit_after = (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms));
    ProgramConfig::default()
        .with_mouse(opts.mouse)
        .with_exit_after(exit_after)
}
