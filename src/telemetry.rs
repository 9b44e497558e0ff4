//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "TRACKBRIDGE_LOG";

/// Filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_DIRECTIVES: &str = "warn";

/// Builds the filter from `directives`, falling back to [`DEFAULT_DIRECTIVES`].
#[must_use]
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Installs a compact stderr subscriber. Stdout stays reserved for command output.
pub fn init() {
    let directives = std::env::var(LOG_ENV).ok();
    // A subscriber installed earlier (tests, embedding hosts) wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_filter_defaults_to_warn() {
        assert_eq!(env_filter(None).to_string(), "warn");
    }

    #[test]
    fn explicit_directives_are_used() {
        assert_eq!(env_filter(Some("trackbridge=debug")).to_string(), "trackbridge=debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
    }
}
