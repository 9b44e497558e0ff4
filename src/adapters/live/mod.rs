//! Live adapters for real external interactions.

pub mod measures;
pub mod tracker;

pub use measures::StdoutMeasureSink;
pub use tracker::LiveTrackerService;
