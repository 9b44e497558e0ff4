//! Live adapter for the `MeasureSink` port: one JSON line per measure on
//! standard output, for the host to pick up.

use std::io::Write;

use crate::ports::measures::{Measure, MeasureSink};

/// Writes measures to stdout.
pub struct StdoutMeasureSink;

impl MeasureSink for StdoutMeasureSink {
    fn save_measure(
        &self,
        measure: &Measure,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let line = serde_json::to_string(measure)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_line_carries_metric_value_and_data() {
        let measure = Measure {
            metric: "tracker_issues".into(),
            value: 3.0,
            data: Some("Minor=3".into()),
        };
        assert!(StdoutMeasureSink.save_measure(&measure).is_ok());
        assert_eq!(
            serde_json::to_string(&measure).unwrap(),
            r#"{"metric":"tracker_issues","value":3.0,"data":"Minor=3"}"#
        );
    }
}
