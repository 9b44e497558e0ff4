//! `trackbridge create-issue` command.

use crate::config::{Settings, TrackerConfig};
use crate::context::ServiceContext;
use crate::error::TrackerError;
use crate::reviews::{check_link_eligibility, Finding, IssueCreator};

/// Execute the `create-issue` command.
///
/// # Errors
///
/// Returns an error string if the finding may not be linked or the tracker
/// refuses the issue.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    finding: &Finding,
    comment: Option<&str>,
) -> Result<(), String> {
    let key = create(ctx, settings, finding, comment).map_err(|e| e.to_string())?;
    println!("Created issue {key}");
    Ok(())
}

fn create(
    ctx: &ServiceContext,
    settings: &Settings,
    finding: &Finding,
    comment: Option<&str>,
) -> Result<String, TrackerError> {
    let config = TrackerConfig::from_settings(settings);
    check_link_eligibility(finding, &config)?;
    let issue = IssueCreator::new(ctx.tracker.as_ref()).create_issue(finding, &config, comment)?;
    Ok(issue.key.unwrap_or_else(|| "<no key>".to_string()))
}
