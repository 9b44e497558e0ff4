//! `trackbridge check` command.

use crate::config::{Settings, TrackerConfig};
use crate::metrics::MANDATORY_PARAMETERS;
use crate::reviews::missing_issue_parameters;

/// Execute the `check` command.
///
/// # Errors
///
/// Never fails; missing settings are reported, not treated as errors.
pub fn run(settings: &Settings) -> Result<(), String> {
    print!("{}", report(settings));
    Ok(())
}

fn line(feature: &str, missing: &[&str]) -> String {
    if missing.is_empty() {
        format!("{feature}: ready\n")
    } else {
        format!("{feature}: missing {}\n", missing.join(", "))
    }
}

/// Renders one readiness line per feature.
#[must_use]
pub fn report(settings: &Settings) -> String {
    let config = TrackerConfig::from_settings(settings);
    let mut out = line("Issue creation", &missing_issue_parameters(&config));
    out.push_str(&line("Metrics collection", &settings.missing(&MANDATORY_PARAMETERS)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FILTER, PASSWORD, PROJECT_KEY, SERVER_URL, USERNAME};

    #[test]
    fn empty_settings_report_every_key() {
        assert_eq!(
            report(&Settings::new()),
            "Issue creation: missing tracker.url, tracker.username, tracker.password, \
             tracker.project.key\n\
             Metrics collection: missing tracker.url, tracker.username, tracker.password, \
             tracker.filter\n"
        );
    }

    #[test]
    fn complete_settings_are_ready() {
        let mut settings = Settings::new();
        let values = [
            (SERVER_URL, "http://t"),
            (USERNAME, "u"),
            (PASSWORD, "p"),
            (PROJECT_KEY, "P"),
            (FILTER, "f"),
        ];
        for (key, value) in values {
            settings.set(key, value);
        }
        assert_eq!(report(&settings), "Issue creation: ready\nMetrics collection: ready\n");
    }
}
