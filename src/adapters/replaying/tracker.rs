//! Replaying adapter for the `TrackerService` port.

use std::sync::Mutex;

use reqwest::Url;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::TRACKER_PORT;
use crate::ports::tracker::{
    RemoteFilter, RemoteIssue, RemotePriority, RemoteResult, TrackerService,
};

/// Serves recorded tracker results, faults included.
pub struct ReplayingTrackerService {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTrackerService {
    /// Creates a tracker backed by `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    /// Number of recorded interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replayer.lock().expect("replayer lock poisoned").remaining()
    }

    fn replay<T: serde::de::DeserializeOwned>(&self, method: &str) -> RemoteResult<T> {
        replay_result(next_output(&self.replayer, TRACKER_PORT, method), method)
    }
}

impl TrackerService for ReplayingTrackerService {
    fn login(&self, _endpoint: &Url, _username: &str, _password: &str) -> RemoteResult<String> {
        self.replay("login")
    }

    fn logout(&self, _endpoint: &Url, _token: &str) -> RemoteResult<()> {
        self.replay("logout")
    }

    fn create_issue(
        &self,
        _endpoint: &Url,
        _token: &str,
        _issue: &RemoteIssue,
    ) -> RemoteResult<RemoteIssue> {
        self.replay("create_issue")
    }

    fn favourite_filters(&self, _endpoint: &Url, _token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        self.replay("favourite_filters")
    }

    fn saved_filters(&self, _endpoint: &Url, _token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        self.replay("saved_filters")
    }

    fn priorities(&self, _endpoint: &Url, _token: &str) -> RemoteResult<Vec<RemotePriority>> {
        self.replay("priorities")
    }

    fn issues_from_filter(
        &self,
        _endpoint: &Url,
        _token: &str,
        _filter_id: &str,
    ) -> RemoteResult<Vec<RemoteIssue>> {
        self.replay("issues_from_filter")
    }
}
