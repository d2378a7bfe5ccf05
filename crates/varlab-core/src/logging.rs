#![forbid(unsafe_code)]

//! Logging shims.
//!
//! With the `tracing` feature the `tracing` event macros are re-exported at
//! the crate root, so session code writes `crate::debug!(...)` either way.
//! Without the feature the same names expand to nothing.
//!
//! All session events are emitted under the [`TARGET`] target so a
//! subscriber can filter them with `varlab_core=debug`.

/// Log target used by the session and catalog.
pub const TARGET: &str = "varlab_core";

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op `debug!` when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op `info!` when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op `trace!` when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op `warn!` when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}
