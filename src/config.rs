//! Flat key/value settings and the tracker configuration derived from them.
//!
//! Settings are layered: process environment first, then an optional YAML
//! file, then explicit `key=value` overrides. Blank values count as absent.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::TrackerError;

/// Base URL of the tracker, e.g. `http://tracker.example.com`.
pub const SERVER_URL: &str = "tracker.url";
/// Path of the remote service below the base URL.
pub const RPC_PATH: &str = "tracker.rpc.path";
/// Tracker user name.
pub const USERNAME: &str = "tracker.username";
/// Tracker password.
pub const PASSWORD: &str = "tracker.password";
/// Key of the project new issues are created in.
pub const PROJECT_KEY: &str = "tracker.project.key";
/// Name of the saved filter the collector counts issues from.
pub const FILTER: &str = "tracker.filter";
/// Issue type code for created issues.
pub const ISSUE_TYPE: &str = "tracker.issue.type";
/// Base URL of the quality server, used for back-links.
pub const QUALITY_SERVER_URL: &str = "quality.server.url";
/// Label naming the quality platform in summaries and back-links.
pub const QUALITY_LABEL: &str = "quality.label";

/// Default value of [`RPC_PATH`].
pub const RPC_PATH_DEFAULT: &str = "/rpc/json-rpc/trackerservice-v2";
/// Default value of [`ISSUE_TYPE`] (task).
pub const ISSUE_TYPE_DEFAULT: &str = "3";
/// Default value of [`QUALITY_LABEL`].
pub const QUALITY_LABEL_DEFAULT: &str = "Quality";

/// Prefix of environment variables mapped onto settings keys.
pub const ENV_PREFIX: &str = "TRACKBRIDGE_";

/// A flat key to string lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds settings from environment-style pairs.
    ///
    /// Only variables starting with [`ENV_PREFIX`] are kept;
    /// `TRACKBRIDGE_TRACKER_URL` becomes `tracker.url`.
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let values = vars
            .into_iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(ENV_PREFIX)?;
                Some((rest.to_ascii_lowercase().replace('_', "."), value))
            })
            .collect();
        Self { values }
    }

    /// Loads a flat YAML mapping of keys to scalar values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or is not a
    /// flat mapping.
    pub fn from_yaml_file(path: &Path) -> Result<Self, TrackerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::configuration(format!(
                "Failed to read settings file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content).map_err(|e| {
            TrackerError::configuration(format!(
                "Failed to parse settings file {}: {e}",
                path.display()
            ))
        })
    }

    fn from_yaml_str(content: &str) -> Result<Self, String> {
        let raw: HashMap<String, serde_yaml::Value> =
            serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        let mut values = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => continue,
                _ => return Err(format!("value of '{key}' is not a scalar")),
            };
            values.insert(key, text);
        }
        Ok(Self { values })
    }

    /// Parses a `key=value` override.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there is no `=` or the key is empty.
    pub fn parse_override(raw: &str) -> Result<(String, String), TrackerError> {
        match raw.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(TrackerError::configuration(format!(
                "Invalid setting override '{raw}', expected key=value"
            ))),
        }
    }

    /// Sets a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Overlays `other` on top of `self`.
    #[must_use]
    pub fn merged_with(mut self, other: Settings) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Returns the trimmed value of `key`, treating blank values as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Returns the value of `key` exactly as entered, treating blank values
    /// as absent. Credentials are read this way.
    #[must_use]
    pub fn get_untrimmed(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns the keys from `keys` that have no value.
    #[must_use]
    pub fn missing<'k>(&self, keys: &[&'k str]) -> Vec<&'k str> {
        keys.iter().copied().filter(|key| self.get(key).is_none()).collect()
    }
}

/// Tracker connection and issue settings for one operation.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Tracker base URL.
    pub server_url: Option<String>,
    /// Service path appended to the base URL.
    pub rpc_path: String,
    /// Tracker user name.
    pub username: Option<String>,
    password: Option<String>,
    /// Project new issues are created in.
    pub project_key: Option<String>,
    /// Saved filter name for metrics collection.
    pub filter: Option<String>,
    /// Issue type code for created issues.
    pub issue_type: String,
    /// Quality server base URL for back-links.
    pub quality_server_url: Option<String>,
    /// Quality platform label.
    pub label: String,
}

impl TrackerConfig {
    /// Reads every tracker key from `settings`, applying defaults.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let owned = |key: &str| settings.get(key).map(str::to_string);
        let verbatim = |key: &str| settings.get_untrimmed(key).map(str::to_string);
        Self {
            server_url: owned(SERVER_URL),
            rpc_path: owned(RPC_PATH).unwrap_or_else(|| RPC_PATH_DEFAULT.to_string()),
            username: verbatim(USERNAME),
            password: verbatim(PASSWORD),
            project_key: owned(PROJECT_KEY),
            filter: owned(FILTER),
            issue_type: owned(ISSUE_TYPE).unwrap_or_else(|| ISSUE_TYPE_DEFAULT.to_string()),
            quality_server_url: owned(QUALITY_SERVER_URL),
            label: owned(QUALITY_LABEL).unwrap_or_else(|| QUALITY_LABEL_DEFAULT.to_string()),
        }
    }

    /// The configured password, if any.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The tracker base URL, or an empty string when unset.
    #[must_use]
    pub fn server_url_or_empty(&self) -> &str {
        self.server_url.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("server_url", &self.server_url)
            .field("rpc_path", &self.rpc_path)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("project_key", &self.project_key)
            .field("filter", &self.filter)
            .field("issue_type", &self.issue_type)
            .field("quality_server_url", &self.quality_server_url)
            .field("label", &self.label)
            .finish()
    }
}
