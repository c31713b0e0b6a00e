use super::{GestureConfig, StrokeConfig};

const MAX_REASONABLE_TIMEOUT_MS: u64 = 10_000;
const MAX_REASONABLE_WATCH_INTERVAL_MS: u64 = 100;

/// Outcome of checking a config. Errors make the config unusable;
/// warnings are logged on load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[must_use]
pub fn validate_config(config: &GestureConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.gesture_timeout_ms == 0 {
        report
            .errors
            .push("gesture_timeout_ms must be greater than 0".to_string());
    } else if config.gesture_timeout_ms > MAX_REASONABLE_TIMEOUT_MS {
        report.warnings.push(format!(
            "gesture_timeout_ms is very long ({}ms), abandoned gestures will linger",
            config.gesture_timeout_ms
        ));
    }

    check_stroke(&config.stroke, &mut report);
    report
}

fn check_stroke(stroke: &StrokeConfig, report: &mut ValidationReport) {
    let thresholds = [
        ("stroke.start_threshold", stroke.start_threshold),
        (
            "stroke.direction_change_threshold",
            stroke.direction_change_threshold,
        ),
        ("stroke.extension_threshold", stroke.extension_threshold),
    ];
    for (name, value) in thresholds {
        if !value.is_finite() || value < 0.0 {
            report.errors.push(format!(
                "{} must be a finite, non-negative distance: {}",
                name, value
            ));
        }
    }

    if stroke.start_threshold == 0.0 {
        report
            .warnings
            .push("stroke.start_threshold is 0, any jitter starts a stroke".to_string());
    }
    if stroke.direction_change_threshold < stroke.extension_threshold {
        report.warnings.push(format!(
            "stroke.direction_change_threshold ({}) is below stroke.extension_threshold ({}), turns register more easily than extensions",
            stroke.direction_change_threshold, stroke.extension_threshold
        ));
    }

    if stroke.watch_interval_ms == 0 {
        report
            .errors
            .push("stroke.watch_interval_ms must be greater than 0".to_string());
    } else if stroke.watch_interval_ms > MAX_REASONABLE_WATCH_INTERVAL_MS {
        report.warnings.push(format!(
            "stroke.watch_interval_ms is slow ({}ms), stroke feedback will lag",
            stroke.watch_interval_ms
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_clean() {
        let report = validate_config(&GestureConfig::default());
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = GestureConfig::default();
        config.gesture_timeout_ms = 0;
        config.stroke.watch_interval_ms = 0;
        let report = validate_config(&config);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_bad_thresholds() {
        let mut config = GestureConfig::default();
        config.stroke.start_threshold = -1.0;
        config.stroke.extension_threshold = f32::NAN;
        let report = validate_config(&config);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_warnings() {
        let mut config = GestureConfig::default();
        config.gesture_timeout_ms = 60_000;
        config.stroke.direction_change_threshold = 5.0;
        let report = validate_config(&config);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 2);
    }
}
