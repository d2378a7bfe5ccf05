#![forbid(unsafe_code)]

//! Log file setup.
//!
//! The game owns the terminal, so logs never go to stdout or stderr. When a
//! log file is configured, a JSON `tracing-subscriber` formatter writes one
//! event per line to it, filtered by `EnvFilter` directives.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Why logging could not be set up.
#[derive(Debug)]
pub enum LogInitError {
    /// The log file could not be opened.
    Io(io::Error),
    /// The filter directives did not parse.
    Filter(String),
    /// A global subscriber is already installed.
    AlreadyInitialized,
}

impl fmt::Display for LogInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot open log file: {e}"),
            Self::Filter(msg) => write!(f, "invalid log filter: {msg}"),
            Self::AlreadyInitialized => write!(f, "logging already initialized"),
        }
    }
}

impl std::error::Error for LogInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LogInitError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Parse `EnvFilter` directives such as `info` or `varlab_core=debug`.
pub fn build_filter(directives: &str) -> Result<EnvFilter, LogInitError> {
    EnvFilter::try_new(directives).map_err(|e| LogInitError::Filter(e.to_string()))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global JSON subscriber writing to `path`.
///
/// # Errors
///
/// Fails on a bad filter, an unopenable file, or a second call.
pub fn init(path: &Path, directives: &str) -> Result<(), LogInitError> {
    let filter = build_filter(directives)?;
    let file = open_append(path)?;
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|_| LogInitError::AlreadyInitialized)?;
    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_is_reported() {
        let err = build_filter("varlab=notalevel").expect_err("invalid level");
        assert!(matches!(err, LogInitError::Filter(_)));
        assert!(err.to_string().starts_with("invalid log filter"));
    }

    #[test]
    fn good_filters_parse() {
        assert!(build_filter("info").is_ok());
        assert!(build_filter("varlab_core=debug,varlab=trace").is_ok());
    }

    #[test]
    fn unopenable_path_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory cannot be opened for appending.
        let err = open_append(dir.path()).expect_err("directory");
        let err = LogInitError::from(err);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn init_writes_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("varlab.log");
        init(&path, "info").expect("first init");
        tracing::info!(answer = 42, "hello from test");
        let text = std::fs::read_to_string(&path).expect("read log");
        assert!(text.lines().any(|l| l.starts_with('{') && l.contains("logging started")));
        assert!(text.contains("hello from test"));
        assert!(matches!(
            init(&path, "info"),
            Err(LogInitError::AlreadyInitialized)
        ));
    }
}
