//! Collecting tracker issue counts by priority into a quality measure.
//!
//! One run resolves the configured saved filter, fetches the priority
//! vocabulary and the filter's issues, and writes a single composite
//! measure: the issue total plus a `"<priority>=<count>;..."` distribution.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::{self, TrackerConfig};
use crate::error::TrackerError;
use crate::ports::measures::{Measure, MeasureSink};
use crate::ports::tracker::{RemoteFault, RemoteFilter, RemoteIssue, TrackerService};
use crate::session::TrackerSession;

/// Metric id of the composite issues measure.
pub const ISSUES_METRIC: &str = "tracker_issues";

/// Settings without which collection is skipped.
pub const MANDATORY_PARAMETERS: [&str; 4] =
    [config::SERVER_URL, config::USERNAME, config::PASSWORD, config::FILTER];

/// Result of one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedMetrics {
    /// Number of issues matched by the filter.
    pub total: u64,
    /// `"<priority name>=<count>"` pairs joined by `;`.
    pub distribution: String,
}

/// Issue counts keyed by priority id, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityCounts {
    counts: Vec<(String, u64)>,
}

impl PriorityCounts {
    fn increment(&mut self, priority_id: &str) {
        match self.counts.iter_mut().find(|(id, _)| id == priority_id) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((priority_id.to_string(), 1)),
        }
    }

    /// Count for one priority id.
    #[must_use]
    pub fn get(&self, priority_id: &str) -> Option<u64> {
        self.counts.iter().find(|(id, _)| id == priority_id).map(|(_, count)| *count)
    }

    /// Number of distinct priorities seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no issue was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Renders the distribution string, naming each priority through
    /// `vocabulary`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DataConsistency`] if a counted priority id is
    /// missing from `vocabulary`.
    pub fn distribution(
        &self,
        vocabulary: &HashMap<String, String>,
    ) -> Result<String, TrackerError> {
        let pairs = self
            .counts
            .iter()
            .map(|(id, count)| {
                let name = vocabulary.get(id).ok_or_else(|| TrackerError::DataConsistency {
                    message: format!(
                        "priority id '{id}' is not in the tracker's priority vocabulary"
                    ),
                })?;
                Ok(format!("{name}={count}"))
            })
            .collect::<Result<Vec<_>, TrackerError>>()?;
        Ok(pairs.join(";"))
    }
}

/// Groups `issues` by priority id.
///
/// # Errors
///
/// Returns [`TrackerError::DataConsistency`] for an issue without priority.
pub fn count_issues_by_priority(issues: &[RemoteIssue]) -> Result<PriorityCounts, TrackerError> {
    let mut counts = PriorityCounts::default();
    for issue in issues {
        let priority = issue.priority.as_deref().ok_or_else(|| {
            let key = issue.key.as_deref().unwrap_or("<unknown>");
            TrackerError::DataConsistency { message: format!("issue {key} has no priority") }
        })?;
        counts.increment(priority);
    }
    Ok(counts)
}

fn remote_error(session: &TrackerSession<'_>, operation: &str, fault: RemoteFault) -> TrackerError {
    match fault {
        RemoteFault::Authentication(_) => {
            TrackerError::connection(session.endpoint().as_str(), Some(fault))
        }
        other => TrackerError::RemoteOperation {
            operation: operation.to_string(),
            endpoint: session.endpoint().to_string(),
            source: other,
        },
    }
}

/// Finds the saved filter called `name`.
///
/// Favourite filters are searched first. Trackers that do not know that
/// listing answer with a remote fault; the saved-filters listing is searched
/// instead.
///
/// # Errors
///
/// Returns [`TrackerError::NotFound`] if the consulted listing has no filter
/// called `name`, or a remote error if no listing could be fetched.
pub fn find_filter(session: &TrackerSession<'_>, name: &str) -> Result<RemoteFilter, TrackerError> {
    let filters = match session.favourite_filters() {
        Ok(filters) => filters,
        Err(RemoteFault::Remote(reason)) => {
            warn!(%reason, "favourite filters unavailable, falling back to saved filters");
            session
                .saved_filters()
                .map_err(|fault| remote_error(session, "list saved filters", fault))?
        }
        Err(fault) => return Err(remote_error(session, "list favourite filters", fault)),
    };
    filters
        .into_iter()
        .find(|filter| filter.name == name)
        .ok_or_else(|| TrackerError::NotFound { filter: name.to_string() })
}

/// Fetches the priority vocabulary as an id to name map.
///
/// # Errors
///
/// Returns a remote error if the listing fails.
pub fn collect_priorities(
    session: &TrackerSession<'_>,
) -> Result<HashMap<String, String>, TrackerError> {
    let priorities = session
        .priorities()
        .map_err(|fault| remote_error(session, "list priorities", fault))?;
    Ok(priorities.into_iter().map(|p| (p.id, p.name)).collect())
}

/// Fetches the filter's issues and counts them by priority id.
///
/// # Errors
///
/// Returns a remote error if the issues cannot be fetched, or a
/// data-consistency error for an issue without priority.
pub fn collect_issues_by_priority(
    session: &TrackerSession<'_>,
    filter: &RemoteFilter,
) -> Result<PriorityCounts, TrackerError> {
    let issues = session
        .issues_from_filter(filter)
        .map_err(|fault| remote_error(session, &format!("run filter '{}'", filter.name), fault))?;
    debug!(filter = %filter.name, issues = issues.len(), "fetched filter issues");
    count_issues_by_priority(&issues)
}

/// Writes `metrics` as the single composite issues measure.
///
/// # Errors
///
/// Returns [`TrackerError::MeasureSink`] if the sink refuses the measure.
pub fn save_measures(
    sink: &dyn MeasureSink,
    metrics: &AggregatedMetrics,
) -> Result<(), TrackerError> {
    #[allow(clippy::cast_precision_loss)]
    let measure = Measure {
        metric: ISSUES_METRIC.to_string(),
        value: metrics.total as f64,
        data: Some(metrics.distribution.clone()),
    };
    sink.save_measure(&measure).map_err(|e| TrackerError::MeasureSink {
        metric: ISSUES_METRIC.to_string(),
        message: e.to_string(),
    })
}

/// Pulls issue counts from the tracker on each analysis run.
pub struct MetricsCollector<'a> {
    config: TrackerConfig,
    service: &'a dyn TrackerService,
}

impl<'a> MetricsCollector<'a> {
    /// Creates a collector for `config`, calling `service`.
    #[must_use]
    pub fn new(config: TrackerConfig, service: &'a dyn TrackerService) -> Self {
        Self { config, service }
    }

    /// Mandatory keys that have no value.
    #[must_use]
    pub fn missing_parameters(&self) -> Vec<&'static str> {
        let c = &self.config;
        [c.server_url.as_deref(), c.username.as_deref(), c.password(), c.filter.as_deref()]
            .into_iter()
            .zip(MANDATORY_PARAMETERS)
            .filter_map(|(value, key)| value.is_none().then_some(key))
            .collect()
    }

    /// Whether any mandatory key has no value.
    #[must_use]
    pub fn missing_mandatory_parameters(&self) -> bool {
        !self.missing_parameters().is_empty()
    }

    /// Whether collection should run for an analysis scope.
    ///
    /// Only the root scope collects, and only with complete settings.
    #[must_use]
    pub fn should_run(&self, is_root_scope: bool) -> bool {
        is_root_scope && !self.missing_mandatory_parameters()
    }

    /// Logs in, resolves the filter and aggregates its issues.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any step.
    pub fn collect(&self) -> Result<AggregatedMetrics, TrackerError> {
        let (Some(username), Some(password), Some(filter_name)) =
            (self.config.username.as_deref(), self.config.password(), self.config.filter.as_deref())
        else {
            return Err(TrackerError::configuration(format!(
                "Missing tracker settings: {}",
                self.missing_parameters().join(", ")
            )));
        };

        let mut session = TrackerSession::open(&self.config, self.service)?;
        session.authenticate(username, password)?;

        let filter = find_filter(&session, filter_name)?;
        debug!(filter = %filter.name, id = %filter.id, "resolved tracker filter");
        let vocabulary = collect_priorities(&session)?;
        let counts = collect_issues_by_priority(&session, &filter)?;
        session.close();

        Ok(AggregatedMetrics {
            total: counts.total(),
            distribution: counts.distribution(&vocabulary)?,
        })
    }

    /// Collects and writes the measure. Nothing is written on failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure of collection or of the measure write.
    pub fn analyse(&self, sink: &dyn MeasureSink) -> Result<AggregatedMetrics, TrackerError> {
        let metrics = self.collect()?;
        save_measures(sink, &metrics)?;
        info!(
            total = metrics.total,
            distribution = %metrics.distribution,
            "saved tracker issues measure"
        );
        Ok(metrics)
    }
}

impl fmt::Display for MetricsCollector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("tracker issues collector")
    }
}
