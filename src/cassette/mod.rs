//! Cassettes: recorded tracker interactions replayed in place of a live
//! tracker.

pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;

/// Port name under which tracker calls are recorded.
pub const TRACKER_PORT: &str = "tracker";
