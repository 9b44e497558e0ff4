//! Remote tracker port: the named operations the tracker exposes.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure reported by the remote tracker or the transport to it.
///
/// Serializable so recorded cassettes replay the same failure kind.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RemoteFault {
    /// The tracker rejected the credentials or token.
    #[error("authentication rejected: {0}")]
    Authentication(String),
    /// The authenticated user may not perform the operation.
    #[error("permission denied: {0}")]
    Permission(String),
    /// The tracker reported a failure, including unknown operations.
    #[error("remote failure: {0}")]
    Remote(String),
    /// The request never produced a tracker answer.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// An issue as sent to, and returned by, the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteIssue {
    /// Tracker-assigned key; only present on responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Project key the issue belongs to.
    #[serde(default)]
    pub project: String,
    /// Issue type code.
    #[serde(default, rename = "type")]
    pub issue_type: String,
    /// Priority id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// One-line summary.
    #[serde(default)]
    pub summary: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
}

/// A saved, named tracker query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFilter {
    /// Tracker id of the filter.
    pub id: String,
    /// Display name, used for lookup.
    pub name: String,
}

/// One entry of the tracker's priority vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePriority {
    /// Tracker id of the priority.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Result alias for tracker port calls.
pub type RemoteResult<T> = Result<T, RemoteFault>;

/// Invokes named operations on a remote tracker service.
///
/// Every call names the service endpoint it targets, so a single adapter can
/// serve sessions against different trackers.
pub trait TrackerService: Send + Sync {
    /// Logs in and returns an authentication token.
    ///
    /// # Errors
    ///
    /// Returns a fault if the tracker cannot be reached or rejects the login.
    fn login(&self, endpoint: &Url, username: &str, password: &str) -> RemoteResult<String>;

    /// Invalidates a token.
    ///
    /// # Errors
    ///
    /// Returns a fault if the logout call fails.
    fn logout(&self, endpoint: &Url, token: &str) -> RemoteResult<()>;

    /// Creates an issue and returns it with its assigned key.
    ///
    /// # Errors
    ///
    /// Returns a fault if the issue cannot be created.
    fn create_issue(&self, endpoint: &Url, token: &str, issue: &RemoteIssue)
        -> RemoteResult<RemoteIssue>;

    /// Lists the user's favourite filters.
    ///
    /// # Errors
    ///
    /// Older trackers do not know this operation and return a fault.
    fn favourite_filters(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemoteFilter>>;

    /// Lists the user's saved filters.
    ///
    /// # Errors
    ///
    /// Returns a fault if the listing fails.
    fn saved_filters(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemoteFilter>>;

    /// Lists all priorities known to the tracker.
    ///
    /// # Errors
    ///
    /// Returns a fault if the listing fails.
    fn priorities(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemotePriority>>;

    /// Lists all issues matching a filter.
    ///
    /// # Errors
    ///
    /// Returns a fault if the filter cannot be run.
    fn issues_from_filter(
        &self,
        endpoint: &Url,
        token: &str,
        filter_id: &str,
    ) -> RemoteResult<Vec<RemoteIssue>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_serializes_type_field_and_skips_missing_key() {
        let issue = RemoteIssue {
            project: "TEST".into(),
            issue_type: "3".into(),
            priority: Some("4".into()),
            ..RemoteIssue::default()
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "3");
        assert!(json.get("key").is_none());
    }

    #[test]
    fn fault_keeps_its_kind_through_json() {
        let fault = RemoteFault::Permission("nope".into());
        let json = serde_json::to_value(&fault).unwrap();
        let back: RemoteFault = serde_json::from_value(json).unwrap();
        assert_eq!(back, fault);
    }
}
