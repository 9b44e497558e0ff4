//! Recording adapters that capture interactions to cassettes.

pub mod tracker;

pub use tracker::RecordingTrackerService;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;
use crate::ports::tracker::RemoteResult;

/// Records one call and its result.
///
/// The result is stored in serde's externally tagged form, `{"Ok": value}` or
/// `{"Err": fault}`, which is what the replaying adapter reads back.
pub(crate) fn record_result<I, T>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &RemoteResult<T>,
) where
    I: Serialize,
    T: Serialize,
{
    let input_json = serde_json::to_value(input).expect("failed to serialize recording input");
    let output_json = serde_json::to_value(result).expect("failed to serialize recording output");

    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, method, input_json, output_json);
}
