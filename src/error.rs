//! Domain error taxonomy for tracker operations.
//!
//! Every variant is terminal for the operation that produced it. Messages
//! carry the endpoint, user or object name needed to act on them, and never
//! a password.

use thiserror::Error;

use crate::ports::tracker::RemoteFault;

/// Errors surfaced by the session, issue creator and metrics collector.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The configured endpoint is malformed or a required key is missing.
    #[error("{message}")]
    Configuration {
        /// Human-readable description, including the attempted value.
        message: String,
    },

    /// Login failed, or the tracker rejected the credentials.
    #[error("Impossible to connect to the tracker server ({endpoint}){reason}")]
    Connection {
        /// The tracker endpoint that was contacted.
        endpoint: String,
        /// Optional suffix explaining the rejection.
        reason: String,
        /// Underlying remote failure, when there is one.
        #[source]
        source: Option<RemoteFault>,
    },

    /// The user is authenticated but may not perform the operation.
    #[error(
        "Impossible to create the issue on the tracker server ({endpoint}) \
         because user {user} does not have enough rights."
    )]
    Permission {
        /// The tracker endpoint that was contacted.
        endpoint: String,
        /// The user that lacked rights.
        user: String,
    },

    /// Any other remote failure.
    #[error("Impossible to {operation} on the tracker server ({endpoint})")]
    RemoteOperation {
        /// What was being attempted, e.g. `"create the issue"`.
        operation: String,
        /// The tracker endpoint that was contacted.
        endpoint: String,
        /// Underlying remote failure.
        #[source]
        source: RemoteFault,
    },

    /// The named filter is absent from the listing that was consulted.
    #[error("Unable to find filter '{filter}' in the tracker")]
    NotFound {
        /// The configured filter name.
        filter: String,
    },

    /// Tracker data contradicts itself, e.g. an issue priority that is not in
    /// the priority vocabulary.
    #[error("Inconsistent tracker data: {message}")]
    DataConsistency {
        /// Description of the inconsistency.
        message: String,
    },

    /// The finding may not be linked to a new tracker issue.
    #[error("Finding #{finding_id} cannot be linked to a tracker issue: {reason}")]
    NotEligible {
        /// The finding identifier.
        finding_id: u64,
        /// Why the link is refused.
        reason: String,
    },

    /// Writing the aggregated measure to the host failed.
    #[error("Failed to save measure '{metric}': {message}")]
    MeasureSink {
        /// Metric id being written.
        metric: String,
        /// Sink-provided failure description.
        message: String,
    },
}

impl TrackerError {
    /// Shorthand for a [`TrackerError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// A connection failure with no extra reason text.
    pub fn connection(endpoint: impl Into<String>, source: Option<RemoteFault>) -> Self {
        Self::Connection { endpoint: endpoint.into(), reason: String::new(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_message_names_endpoint() {
        let err = TrackerError::connection("http://my.tracker", None);
        assert_eq!(
            err.to_string(),
            "Impossible to connect to the tracker server (http://my.tracker)"
        );
    }

    #[test]
    fn connection_message_with_reason() {
        let err = TrackerError::Connection {
            endpoint: "my.tracker".into(),
            reason: " because of invalid credentials for user foo".into(),
            source: Some(RemoteFault::Authentication("bad".into())),
        };
        assert_eq!(
            err.to_string(),
            "Impossible to connect to the tracker server (my.tracker) \
             because of invalid credentials for user foo"
        );
    }

    #[test]
    fn not_found_names_filter() {
        let err = TrackerError::NotFound { filter: "myFilter".into() };
        assert_eq!(err.to_string(), "Unable to find filter 'myFilter' in the tracker");
    }
}
