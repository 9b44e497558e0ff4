//! Replaying adapters that serve recorded interactions.

pub mod tracker;

pub use tracker::ReplayingTrackerService;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::tracker::RemoteResult;

/// Takes the recorded output of the next `port`/`method` interaction.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output
}

/// Decodes a recorded `{"Ok": value}` / `{"Err": fault}` output.
///
/// # Panics
///
/// Panics if the recorded output does not have the shape the caller expects,
/// which means the cassette does not match the code replaying it.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
    method: &str,
) -> RemoteResult<T> {
    serde_json::from_value(output).unwrap_or_else(|e| {
        panic!("Cassette output for {method} does not match its result type: {e}")
    })
}
