//! Measure sink port: where the host stores computed metrics.

use serde::{Deserialize, Serialize};

/// A single metric value with optional auxiliary text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Metric identifier.
    pub metric: String,
    /// Numeric value.
    pub value: f64,
    /// Auxiliary data, e.g. a distribution string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Persists measures on behalf of the host.
pub trait MeasureSink: Send + Sync {
    /// Saves one measure.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses or cannot store the measure.
    fn save_measure(
        &self,
        measure: &Measure,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
