//! Service context bundling the port trait objects.

use std::path::Path;

use crate::adapters::live::{LiveTrackerService, StdoutMeasureSink};
use crate::adapters::recording::RecordingTrackerService;
use crate::adapters::replaying::ReplayingTrackerService;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::measures::MeasureSink;
use crate::ports::tracker::TrackerService;

/// Bundles the port trait objects an operation runs against.
///
/// Constructors wire up different adapter implementations (live, recording,
/// replaying).
pub struct ServiceContext {
    /// Remote tracker service.
    pub tracker: Box<dyn TrackerService>,
    /// Host measure store.
    pub measures: Box<dyn MeasureSink>,
}

impl ServiceContext {
    /// A context talking to the real tracker.
    #[must_use]
    pub fn live() -> Self {
        Self { tracker: Box::new(LiveTrackerService::new()), measures: Box::new(StdoutMeasureSink) }
    }

    /// A live context whose tracker traffic is recorded below `root`.
    ///
    /// The context must be dropped before the returned session is finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette directory cannot be created.
    pub fn recording_at(root: &Path) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(root)?;
        let tracker = RecordingTrackerService::new(
            Box::new(LiveTrackerService::new()),
            std::sync::Arc::clone(&session.tracker),
        );
        Ok((Self { tracker: Box::new(tracker), measures: Box::new(StdoutMeasureSink) }, session))
    }

    /// A context whose tracker answers come from the cassette at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self {
            tracker: Box::new(ReplayingTrackerService::new(CassetteReplayer::new(&cassette))),
            measures: Box::new(StdoutMeasureSink),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::recorder::CassetteRecorder;
    use reqwest::Url;
    use serde_json::json;

    #[test]
    fn replaying_context_serves_cassette() {
        let dir = std::env::temp_dir().join("trackbridge_ctx_replay");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tracker.cassette.yaml");
        let mut recorder = CassetteRecorder::new(&path, "ctx");
        recorder.record("tracker", "login", json!({}), json!({"Ok": "tok"}));
        recorder.finish().unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();
        let token = ctx.tracker.login(&Url::parse("http://t/rpc").unwrap(), "u", "p").unwrap();
        assert_eq!(token, "tok");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replaying_missing_cassette_is_an_error() {
        let result = ServiceContext::replaying(Path::new("/nonexistent/trackbridge.cassette.yaml"));
        assert!(result.err().unwrap().starts_with("Failed to read cassette file"));
    }

    #[test]
    fn recording_context_finishes_after_drop() {
        let root = std::env::temp_dir().join("trackbridge_ctx_record");
        let (ctx, session) = ServiceContext::recording_at(&root).unwrap();
        drop(ctx);
        let dir = session.finish().unwrap();
        assert!(dir.join("tracker.cassette.yaml").exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
