#![forbid(unsafe_code)]

//! Core of the varlab variable-sorting game.
//!
//! Players sort the variables of a science experiment into three buckets:
//! manipulated, controlled, and responding. This crate holds everything that
//! is not presentation:
//!
//! - [`Category`] / [`Placement`]: ground truth and current location
//! - [`Catalog`]: validated, read-only levels, buckets and copy
//! - [`Session`]: the drag/classification/completion state machine
//! - [`FeedbackChannel`]: the single auto-hiding toast
//! - [`OneShot`]: generation-tagged countdowns behind the toast and shake
//!
//! Nothing here touches a terminal or a clock. Time only moves when the
//! caller passes elapsed durations to [`Session::tick`].

pub mod catalog;
pub mod category;
pub mod feedback;
pub mod logging;
pub mod session;
pub mod timer;

pub use catalog::{Bucket, Catalog, CatalogError, Hints, Item, Level, Messages};
pub use category::{Category, Placement};
pub use feedback::{Feedback, FeedbackChannel, Severity};
pub use session::{Advance, DropOutcome, LastLevel, Session, SessionConfig, SessionView};
pub use timer::OneShot;

// Re-export tracing macros at crate root so `crate::debug!` resolves either way.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};
