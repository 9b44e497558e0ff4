//! `trackbridge collect` command.

use crate::cli::Scope;
use crate::config::{Settings, TrackerConfig};
use crate::context::ServiceContext;
use crate::metrics::{AggregatedMetrics, MetricsCollector};

/// Outcome of a collection request.
#[derive(Debug, PartialEq, Eq)]
pub enum CollectOutcome {
    /// The collector ran and saved its measure.
    Collected(AggregatedMetrics),
    /// The collector did not run.
    Skipped(String),
}

/// Execute the `collect` command.
///
/// # Errors
///
/// Returns an error string if collection was attempted and failed.
pub fn run(ctx: &ServiceContext, settings: &Settings, scope: Scope) -> Result<(), String> {
    match collect(ctx, settings, scope)? {
        CollectOutcome::Collected(metrics) => {
            println!("Tracker issues: {} ({})", metrics.total, metrics.distribution);
        }
        CollectOutcome::Skipped(reason) => println!("Skipped: {reason}"),
    }
    Ok(())
}

/// Runs the collector if it should run for `scope`.
///
/// # Errors
///
/// Returns an error string if collection was attempted and failed.
pub fn collect(
    ctx: &ServiceContext,
    settings: &Settings,
    scope: Scope,
) -> Result<CollectOutcome, String> {
    let config = TrackerConfig::from_settings(settings);
    let collector = MetricsCollector::new(config, ctx.tracker.as_ref());
    if !collector.should_run(scope == Scope::Root) {
        let reason = if collector.missing_mandatory_parameters() {
            format!("{collector} is missing {}", collector.missing_parameters().join(", "))
        } else {
            format!("{collector} only runs on the root scope")
        };
        return Ok(CollectOutcome::Skipped(reason));
    }
    collector
        .analyse(ctx.measures.as_ref())
        .map(CollectOutcome::Collected)
        .map_err(|e| e.to_string())
}
