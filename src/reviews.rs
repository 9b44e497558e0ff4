//! Creating tracker issues from quality findings.

use std::fmt::Write;

use tracing::{debug, info};

use crate::config::{self, TrackerConfig};
use crate::error::TrackerError;
use crate::ports::tracker::{RemoteFault, RemoteIssue, TrackerService};
use crate::session::TrackerSession;

/// Delimiter placed before and after quoted text in descriptions.
const QUOTE: &str = "\n{quote}\n";

/// Priority used when a severity is unknown or absent (MAJOR).
pub const DEFAULT_PRIORITY: &str = "3";

/// Finding statuses from which a tracker issue may be created. `IDLE` is the
/// status of a finding nobody has reviewed yet.
pub const LINKABLE_STATUSES: [&str; 3] = ["IDLE", "OPEN", "REOPENED"];

/// Severity of a quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be fixed before anything else.
    Blocker,
    /// Severe defect.
    Critical,
    /// Default severity.
    Major,
    /// Low impact.
    Minor,
    /// Informational only.
    Info,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 5] =
        [Severity::Blocker, Severity::Critical, Severity::Major, Severity::Minor, Severity::Info];

    /// Parses an upper-case severity name. Any other spelling is unknown.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    /// The canonical upper-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Blocker => "BLOCKER",
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
        }
    }

    /// The tracker priority code for this severity.
    #[must_use]
    pub fn priority_code(self) -> &'static str {
        match self {
            Severity::Blocker => "1",
            Severity::Critical => "2",
            Severity::Major => "3",
            Severity::Minor => "4",
            Severity::Info => "5",
        }
    }
}

/// Maps a raw severity to a tracker priority, defaulting to MAJOR.
#[must_use]
pub fn priority_for_severity(severity: Option<&str>) -> &'static str {
    severity.and_then(Severity::parse).map_or(DEFAULT_PRIORITY, Severity::priority_code)
}

/// A quality finding as exposed by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Finding {
    /// Finding identifier on the quality server.
    pub id: u64,
    /// Raw severity name.
    pub severity: Option<String>,
    /// Name of the violated rule.
    pub rule_name: String,
    /// Violation message.
    pub message: String,
    /// Review status; `None` when the finding has no review yet.
    pub status: Option<String>,
    /// Key of a tracker issue already linked to this finding.
    pub linked_issue: Option<String>,
}

/// Summary line of the issue created for `finding`.
#[must_use]
pub fn issue_summary(finding: &Finding, label: &str) -> String {
    format!("{label} Review #{} - {}", finding.id, finding.rule_name)
}

/// Description of the issue created for `finding`.
///
/// The reviewer block is left out when `comment` is absent or blank.
#[must_use]
pub fn issue_description(
    finding: &Finding,
    comment: Option<&str>,
    config: &TrackerConfig,
) -> String {
    let mut description = String::from("Violation detail:");
    description.push_str(QUOTE);
    description.push_str(&finding.message);
    description.push_str(QUOTE);
    if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
        description.push_str("\nMessage from reviewer:");
        description.push_str(QUOTE);
        description.push_str(comment);
        description.push_str(QUOTE);
    }
    let server = config.quality_server_url.as_deref().unwrap_or_default().trim_end_matches('/');
    let _ = write!(
        description,
        "\n\nCheck it on {}: {server}/project_reviews/view/{}",
        config.label, finding.id
    );
    description
}

/// Builds the issue request for `finding`.
#[must_use]
pub fn build_issue(
    finding: &Finding,
    config: &TrackerConfig,
    comment: Option<&str>,
) -> RemoteIssue {
    RemoteIssue {
        key: None,
        project: config.project_key.clone().unwrap_or_default(),
        issue_type: config.issue_type.clone(),
        priority: Some(priority_for_severity(finding.severity.as_deref()).to_string()),
        summary: issue_summary(finding, &config.label),
        description: issue_description(finding, comment, config),
    }
}

/// Keys that must be set before any issue can be created.
#[must_use]
pub fn missing_issue_parameters(config: &TrackerConfig) -> Vec<&'static str> {
    [
        (config::SERVER_URL, config.server_url.is_none()),
        (config::USERNAME, config.username.is_none()),
        (config::PASSWORD, config.password().is_none()),
        (config::PROJECT_KEY, config.project_key.is_none()),
    ]
    .into_iter()
    .filter_map(|(key, missing)| missing.then_some(key))
    .collect()
}

/// Checks that `finding` may be linked to a new tracker issue.
///
/// # Errors
///
/// Returns [`TrackerError::Configuration`] listing missing keys, or
/// [`TrackerError::NotEligible`] when the finding is already linked or in a
/// closed status.
pub fn check_link_eligibility(
    finding: &Finding,
    config: &TrackerConfig,
) -> Result<(), TrackerError> {
    let missing = missing_issue_parameters(config);
    if !missing.is_empty() {
        return Err(TrackerError::configuration(format!(
            "Missing tracker settings: {}",
            missing.join(", ")
        )));
    }
    if let Some(key) = &finding.linked_issue {
        return Err(TrackerError::NotEligible {
            finding_id: finding.id,
            reason: format!("already linked to {key}"),
        });
    }
    let status = finding.status.as_deref().unwrap_or("IDLE");
    if !LINKABLE_STATUSES.iter().any(|s| s.eq_ignore_ascii_case(status)) {
        return Err(TrackerError::NotEligible {
            finding_id: finding.id,
            reason: format!("status {status} is not one of {}", LINKABLE_STATUSES.join(", ")),
        });
    }
    Ok(())
}

/// Creates tracker issues through a [`TrackerService`].
pub struct IssueCreator<'a> {
    service: &'a dyn TrackerService,
}

impl<'a> IssueCreator<'a> {
    /// Creates an issue creator calling `service`.
    #[must_use]
    pub fn new(service: &'a dyn TrackerService) -> Self {
        Self { service }
    }

    /// Opens a session, logs in and submits the issue for `finding`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed endpoint or missing
    /// credentials, a connection error if login fails, and the mapped submit
    /// error otherwise.
    pub fn create_issue(
        &self,
        finding: &Finding,
        config: &TrackerConfig,
        comment: Option<&str>,
    ) -> Result<RemoteIssue, TrackerError> {
        let missing = |key: &str| {
            TrackerError::configuration(format!("Missing tracker setting: {key}"))
        };
        let username = config.username.as_deref().ok_or_else(|| missing(config::USERNAME))?;
        let password = config.password().ok_or_else(|| missing(config::PASSWORD))?;

        let mut session = TrackerSession::open(config, self.service)?;
        session.authenticate(username, password)?;

        let issue = build_issue(finding, config, comment);
        debug!(finding = finding.id, priority = ?issue.priority, "submitting tracker issue");
        let created = send_request(&session, &issue, username)?;
        session.close();

        info!(finding = finding.id, key = ?created.key, "created tracker issue");
        Ok(created)
    }
}

/// Submits `issue` and maps tracker faults to domain errors.
fn send_request(
    session: &TrackerSession<'_>,
    issue: &RemoteIssue,
    username: &str,
) -> Result<RemoteIssue, TrackerError> {
    let endpoint = session.endpoint().to_string();
    session.create_issue(issue).map_err(|fault| match fault {
        RemoteFault::Authentication(_) => TrackerError::Connection {
            endpoint,
            reason: format!(" because of invalid credentials for user {username}"),
            source: Some(fault),
        },
        RemoteFault::Permission(_) => {
            TrackerError::Permission { endpoint, user: username.to_string() }
        }
        other => TrackerError::RemoteOperation {
            operation: "create the issue".to_string(),
            endpoint,
            source: other,
        },
    })
}
