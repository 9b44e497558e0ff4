//! Recording adapter for the `TrackerService` port.
//!
//! Passwords are never recorded and the login token is replaced by a
//! placeholder.

use std::sync::{Arc, Mutex};

use reqwest::Url;
use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::TRACKER_PORT;
use crate::ports::tracker::{
    RemoteFilter, RemoteIssue, RemotePriority, RemoteResult, TrackerService,
};

/// Token written to cassettes in place of the real one.
pub const RECORDED_TOKEN: &str = "<recorded-token>";

/// Records tracker calls while delegating to an inner implementation.
pub struct RecordingTrackerService {
    inner: Box<dyn TrackerService>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTrackerService {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn TrackerService>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record<I: Serialize, T: Serialize>(
        &self,
        method: &str,
        input: &I,
        result: &RemoteResult<T>,
    ) {
        record_result(&self.recorder, TRACKER_PORT, method, input, result);
    }
}

#[derive(Serialize)]
struct EndpointInput<'a> {
    endpoint: &'a str,
}

#[derive(Serialize)]
struct LoginInput<'a> {
    endpoint: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
struct CreateIssueInput<'a> {
    endpoint: &'a str,
    issue: &'a RemoteIssue,
}

#[derive(Serialize)]
struct FilterInput<'a> {
    endpoint: &'a str,
    filter_id: &'a str,
}

impl TrackerService for RecordingTrackerService {
    fn login(&self, endpoint: &Url, username: &str, password: &str) -> RemoteResult<String> {
        let result = self.inner.login(endpoint, username, password);
        let redacted = result.as_ref().map(|_| RECORDED_TOKEN.to_string()).map_err(Clone::clone);
        self.record("login", &LoginInput { endpoint: endpoint.as_str(), username }, &redacted);
        result
    }

    fn logout(&self, endpoint: &Url, token: &str) -> RemoteResult<()> {
        let result = self.inner.logout(endpoint, token);
        self.record("logout", &EndpointInput { endpoint: endpoint.as_str() }, &result);
        result
    }

    fn create_issue(
        &self,
        endpoint: &Url,
        token: &str,
        issue: &RemoteIssue,
    ) -> RemoteResult<RemoteIssue> {
        let result = self.inner.create_issue(endpoint, token, issue);
        let input = CreateIssueInput { endpoint: endpoint.as_str(), issue };
        self.record("create_issue", &input, &result);
        result
    }

    fn favourite_filters(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        let result = self.inner.favourite_filters(endpoint, token);
        self.record("favourite_filters", &EndpointInput { endpoint: endpoint.as_str() }, &result);
        result
    }

    fn saved_filters(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        let result = self.inner.saved_filters(endpoint, token);
        self.record("saved_filters", &EndpointInput { endpoint: endpoint.as_str() }, &result);
        result
    }

    fn priorities(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemotePriority>> {
        let result = self.inner.priorities(endpoint, token);
        self.record("priorities", &EndpointInput { endpoint: endpoint.as_str() }, &result);
        result
    }

    fn issues_from_filter(
        &self,
        endpoint: &Url,
        token: &str,
        filter_id: &str,
    ) -> RemoteResult<Vec<RemoteIssue>> {
        let result = self.inner.issues_from_filter(endpoint, token, filter_id);
        let input = FilterInput { endpoint: endpoint.as_str(), filter_id };
        self.record("issues_from_filter", &input, &result);
        result
    }
}
