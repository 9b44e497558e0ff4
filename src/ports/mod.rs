//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the core and an external system
//! (the remote tracker, the host measure store). Implementations live in
//! `src/adapters/`.

pub mod measures;
pub mod tracker;

pub use measures::{Measure, MeasureSink};
pub use tracker::{
    RemoteFault, RemoteFilter, RemoteIssue, RemotePriority, RemoteResult, TrackerService,
};
