//! Authenticated sessions against the tracker's remote service.
//!
//! A session is built per operation, authenticated once and discarded. It
//! owns the only token it logs in with; dropping the session logs out.

use reqwest::Url;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::ports::tracker::{
    RemoteFault, RemoteFilter, RemoteIssue, RemotePriority, RemoteResult, TrackerService,
};

/// Joins the tracker base URL and the service path into the service endpoint.
///
/// # Errors
///
/// Returns [`TrackerError::Configuration`] naming the attempted URL when the
/// result is not an absolute `http`/`https` URL.
pub fn service_endpoint(config: &TrackerConfig) -> Result<Url, TrackerError> {
    let complete = format!("{}{}", config.server_url_or_empty(), config.rpc_path);
    let invalid = || {
        TrackerError::configuration(format!(
            "The tracker server URL is not a valid one: {complete}"
        ))
    };
    let url = Url::parse(&complete).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

/// A per-operation handle to the tracker service.
pub struct TrackerSession<'a> {
    endpoint: Url,
    token: Option<String>,
    service: &'a dyn TrackerService,
}

impl<'a> TrackerSession<'a> {
    /// Resolves the service endpoint and binds it to `service`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Configuration`] if the endpoint is malformed.
    pub fn open(
        config: &TrackerConfig,
        service: &'a dyn TrackerService,
    ) -> Result<Self, TrackerError> {
        let endpoint = service_endpoint(config)?;
        debug!(endpoint = %endpoint, "tracker session service endpoint");
        Ok(Self { endpoint, token: None, service })
    }

    /// The resolved service endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether [`authenticate`](Self::authenticate) has succeeded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Logs in and keeps the token for later calls.
    ///
    /// A token held from an earlier login is logged out first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Connection`] naming the endpoint on any
    /// failure. The password never appears in the error.
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<(), TrackerError> {
        self.logout_quietly();
        debug!(user = username, endpoint = %self.endpoint, "connecting to tracker");
        let token = self
            .service
            .login(&self.endpoint, username, password)
            .map_err(|fault| TrackerError::connection(self.endpoint.as_str(), Some(fault)))?;
        self.token = Some(token);
        debug!("connected");
        Ok(())
    }

    /// Logs out. Failures are logged and otherwise ignored.
    pub fn close(mut self) {
        self.logout_quietly();
    }

    fn logout_quietly(&mut self) {
        if let Some(token) = self.token.take() {
            if let Err(fault) = self.service.logout(&self.endpoint, &token) {
                warn!(endpoint = %self.endpoint, error = %fault, "tracker logout failed");
            }
        }
    }

    fn token(&self) -> RemoteResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| RemoteFault::Authentication("session is not authenticated".into()))
    }

    /// Submits a new issue.
    ///
    /// # Errors
    ///
    /// Returns the tracker's fault unchanged.
    pub fn create_issue(&self, issue: &RemoteIssue) -> RemoteResult<RemoteIssue> {
        self.service.create_issue(&self.endpoint, self.token()?, issue)
    }

    /// Lists favourite filters.
    ///
    /// # Errors
    ///
    /// Returns the tracker's fault unchanged.
    pub fn favourite_filters(&self) -> RemoteResult<Vec<RemoteFilter>> {
        self.service.favourite_filters(&self.endpoint, self.token()?)
    }

    /// Lists saved filters.
    ///
    /// # Errors
    ///
    /// Returns the tracker's fault unchanged.
    pub fn saved_filters(&self) -> RemoteResult<Vec<RemoteFilter>> {
        self.service.saved_filters(&self.endpoint, self.token()?)
    }

    /// Lists the priority vocabulary.
    ///
    /// # Errors
    ///
    /// Returns the tracker's fault unchanged.
    pub fn priorities(&self) -> RemoteResult<Vec<RemotePriority>> {
        self.service.priorities(&self.endpoint, self.token()?)
    }

    /// Lists the issues matching a filter.
    ///
    /// # Errors
    ///
    /// Returns the tracker's fault unchanged.
    pub fn issues_from_filter(&self, filter: &RemoteFilter) -> RemoteResult<Vec<RemoteIssue>> {
        self.service.issues_from_filter(&self.endpoint, self.token()?, &filter.id)
    }
}

impl Drop for TrackerSession<'_> {
    fn drop(&mut self) {
        self.logout_quietly();
    }
}
