//! Live adapter for the `TrackerService` port over JSON-RPC 2.0.
//!
//! Each operation is one HTTP POST of a JSON-RPC request to the session's
//! service endpoint. The first parameter is the token for every operation
//! except `login`.

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::ports::tracker::{
    RemoteFault, RemoteFilter, RemoteIssue, RemotePriority, RemoteResult, TrackerService,
};

/// JSON-RPC error code the tracker uses for rejected credentials or tokens.
pub const AUTHENTICATION_FAULT: i64 = -32001;
/// JSON-RPC error code the tracker uses for missing permissions.
pub const PERMISSION_FAULT: i64 = -32002;

/// Tracker service reached over HTTP.
pub struct LiveTrackerService {
    client: Client,
}

impl LiveTrackerService {
    /// Creates a service with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for LiveTrackerService {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

fn classify(code: i64, message: String) -> RemoteFault {
    match code {
        AUTHENTICATION_FAULT => RemoteFault::Authentication(message),
        PERMISSION_FAULT => RemoteFault::Permission(message),
        _ => RemoteFault::Remote(format!("{message} (code {code})")),
    }
}

impl LiveTrackerService {
    fn invoke(&self, endpoint: &Url, method: &str, params: Value) -> RemoteResult<Option<Value>> {
        let request = RpcRequest { jsonrpc: "2.0", id: Uuid::new_v4().to_string(), method, params };
        let response = self
            .client
            .post(endpoint.clone())
            .json(&request)
            .send()
            .map_err(|e| RemoteFault::Transport(format!("{method} request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RemoteFault::Transport(format!("Failed to read {method} response: {e}")))?;

        match status {
            StatusCode::UNAUTHORIZED => return Err(RemoteFault::Authentication(body)),
            StatusCode::FORBIDDEN => return Err(RemoteFault::Permission(body)),
            _ => {}
        }

        match (serde_json::from_str::<RpcResponse>(&body), status.is_success()) {
            (Ok(RpcResponse { error: Some(error), .. }), _) => {
                Err(classify(error.code, error.message))
            }
            (Ok(RpcResponse { result, .. }), true) => Ok(result),
            (Err(e), true) => {
                Err(RemoteFault::Remote(format!("Failed to parse {method} response: {e}")))
            }
            (_, false) => {
                let code = status.as_u16();
                Err(RemoteFault::Remote(format!("{method} failed with HTTP {code}: {body}")))
            }
        }
    }

    fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        method: &str,
        params: Value,
    ) -> RemoteResult<T> {
        let result = self
            .invoke(endpoint, method, params)?
            .ok_or_else(|| RemoteFault::Remote(format!("{method} response carries no result")))?;
        serde_json::from_value(result)
            .map_err(|e| RemoteFault::Remote(format!("Unexpected {method} result: {e}")))
    }
}

impl TrackerService for LiveTrackerService {
    fn login(&self, endpoint: &Url, username: &str, password: &str) -> RemoteResult<String> {
        self.call(endpoint, "login", json!([username, password]))
    }

    fn logout(&self, endpoint: &Url, token: &str) -> RemoteResult<()> {
        self.invoke(endpoint, "logout", json!([token])).map(|_| ())
    }

    fn create_issue(
        &self,
        endpoint: &Url,
        token: &str,
        issue: &RemoteIssue,
    ) -> RemoteResult<RemoteIssue> {
        self.call(endpoint, "createIssue", json!([token, issue]))
    }

    fn favourite_filters(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        self.call(endpoint, "getFavouriteFilters", json!([token]))
    }

    fn saved_filters(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        self.call(endpoint, "getSavedFilters", json!([token]))
    }

    fn priorities(&self, endpoint: &Url, token: &str) -> RemoteResult<Vec<RemotePriority>> {
        self.call(endpoint, "getPriorities", json!([token]))
    }

    fn issues_from_filter(
        &self,
        endpoint: &Url,
        token: &str,
        filter_id: &str,
    ) -> RemoteResult<Vec<RemoteIssue>> {
        self.call(endpoint, "getIssuesFromFilter", json!([token, filter_id]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn endpoint(server: &mockito::Server) -> Url {
        Url::parse(&format!("{}/rpc/json-rpc/trackerservice-v2", server.url())).unwrap()
    }

    #[test]
    fn login_returns_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/rpc/json-rpc/trackerservice-v2")
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "login",
                "params": ["foo", "bar"],
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":"1","result":"tok-1"}"#)
            .create();

        let token = LiveTrackerService::new().login(&endpoint(&server), "foo", "bar").unwrap();

        assert_eq!(token, "tok-1");
        mock.assert();
    }

    #[test]
    fn error_codes_map_to_fault_kinds() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rpc/json-rpc/trackerservice-v2")
            .match_body(Matcher::PartialJson(json!({"method": "createIssue"})))
            .with_body(
                r#"{"jsonrpc":"2.0","id":"1","error":{"code":-32002,"message":"no rights"}}"#,
            )
            .create();
        server
            .mock("POST", "/rpc/json-rpc/trackerservice-v2")
            .match_body(Matcher::PartialJson(json!({"method": "getFavouriteFilters"})))
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": "1",
                    "error": {"code": -32601, "message": "Method not found"},
                })
                .to_string(),
            )
            .create();

        let service = LiveTrackerService::new();
        let url = endpoint(&server);
        assert_eq!(
            service.create_issue(&url, "t", &RemoteIssue::default()).unwrap_err(),
            RemoteFault::Permission("no rights".into())
        );
        assert_eq!(
            service.favourite_filters(&url, "t").unwrap_err(),
            RemoteFault::Remote("Method not found (code -32601)".into())
        );
    }

    #[test]
    fn http_unauthorized_is_an_authentication_fault() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rpc/json-rpc/trackerservice-v2")
            .with_status(401)
            .with_body("denied")
            .create();

        let fault = LiveTrackerService::new().priorities(&endpoint(&server), "t").unwrap_err();
        assert_eq!(fault, RemoteFault::Authentication("denied".into()));
    }

    #[test]
    fn parses_issue_listings() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rpc/json-rpc/trackerservice-v2")
            .match_body(Matcher::PartialJson(json!({
                "method": "getIssuesFromFilter",
                "params": ["t", "10"],
            })))
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": "1",
                    "result": [{"key": "P-1", "priority": "2", "summary": "s"}],
                })
                .to_string(),
            )
            .create();

        let issues =
            LiveTrackerService::new().issues_from_filter(&endpoint(&server), "t", "10").unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key.as_deref(), Some("P-1"));
        assert_eq!(issues[0].priority.as_deref(), Some("2"));
    }

    #[test]
    fn server_error_without_rpc_body_is_a_remote_fault() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rpc/json-rpc/trackerservice-v2")
            .with_status(500)
            .with_body("oops")
            .create();

        let fault = LiveTrackerService::new().saved_filters(&endpoint(&server), "t").unwrap_err();
        assert_eq!(fault, RemoteFault::Remote("getSavedFilters failed with HTTP 500: oops".into()));
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_fault() {
        let url = Url::parse("http://127.0.0.1:9/rpc").unwrap();
        let fault = LiveTrackerService::new().logout(&url, "t").unwrap_err();
        assert!(matches!(fault, RemoteFault::Transport(_)));
    }
}
