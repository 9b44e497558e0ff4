//! Recording session: one tracker cassette per command run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;
use super::TRACKER_PORT;

/// Owns the recorder shared with the recording tracker adapter.
pub struct RecordingSession {
    /// Recorder for tracker interactions.
    pub tracker: Arc<Mutex<CassetteRecorder>>,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Starts a session writing into a new timestamped directory below `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already exists or cannot be created.
    pub fn new(root: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let output_dir = root.join(&timestamp);
        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            format!("Failed to create cassette directory {}: {e}", output_dir.display())
        })?;

        let path = output_dir.join(format!("{TRACKER_PORT}.cassette.yaml"));
        let recorder = CassetteRecorder::new(path, format!("{timestamp}-{TRACKER_PORT}"));
        Ok(Self { tracker: Arc::new(Mutex::new(recorder)), output_dir })
    }

    /// Directory the cassette is written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the cassette. Every adapter holding the recorder must have
    /// been dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorder is still shared or the write fails.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.tracker)
            .map_err(|_| "Recording tracker adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write {TRACKER_PORT} cassette: {e}"))?;
        Ok(self.output_dir)
    }
}
