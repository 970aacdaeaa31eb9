//! Threshold Classifier Implementation

use crate::alert::{AlertCandidate, AlertType, Severity};
use serde::{Deserialize, Serialize};
use telemetry::Trend;
use thiserror::Error;
use tracing::{debug, info};

/// Glucose threshold configuration (mg/dL)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Boundary for `critical_high` (default: 250.0)
    pub critical_high: f64,
    /// Boundary for `high_glucose` (default: 180.0)
    pub high: f64,
    /// Boundary for `low_glucose` (default: 70.0)
    pub low: f64,
    /// Boundary for `critical_low` (default: 54.0)
    pub critical_low: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        // Standard CGM target-range boundaries
        Self {
            critical_high: 250.0,
            high: 180.0,
            low: 70.0,
            critical_low: 54.0,
        }
    }
}

/// Errors in threshold configuration
#[derive(Debug, Clone, Error)]
pub enum ThresholdError {
    #[error("thresholds must satisfy critical_low < low < high < critical_high")]
    Unordered,
}

impl ThresholdConfig {
    /// Check the bands are strictly ordered
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.critical_low < self.low && self.low < self.high && self.high < self.critical_high {
            Ok(())
        } else {
            Err(ThresholdError::Unordered)
        }
    }
}

/// Deterministic classifier from readings to alert candidates
///
/// Given the same value, trend, and thresholds, `classify` always
/// produces the same candidate set. It never emits `connection_lost`;
/// that comes from the [`crate::LivenessMonitor`].
pub struct Classifier {
    config: ThresholdConfig,
}

impl Classifier {
    /// Create a classifier with the given thresholds
    pub fn new(config: ThresholdConfig) -> Self {
        info!("Creating classifier with thresholds: {:?}", config);
        Self { config }
    }

    /// Classify one reading into zero or more alert candidates
    ///
    /// `reading_id` is attached to every candidate; pass `None` for a
    /// reading that has not been persisted yet.
    pub fn classify(&self, reading_id: Option<i64>, value: f64, trend: Trend) -> Vec<AlertCandidate> {
        let mut candidates = Vec::new();

        let level = if value >= self.config.critical_high {
            Some((
                AlertType::CriticalHigh,
                Severity::Critical,
                format!(
                    "Glucose {:.1} mg/dL is at or above the critical high threshold ({:.0} mg/dL)",
                    value, self.config.critical_high
                ),
            ))
        } else if value >= self.config.high {
            Some((
                AlertType::HighGlucose,
                Severity::Warning,
                format!(
                    "Glucose {:.1} mg/dL is at or above the high threshold ({:.0} mg/dL)",
                    value, self.config.high
                ),
            ))
        } else if value <= self.config.critical_low {
            Some((
                AlertType::CriticalLow,
                Severity::Critical,
                format!(
                    "Glucose {:.1} mg/dL is at or below the critical low threshold ({:.0} mg/dL)",
                    value, self.config.critical_low
                ),
            ))
        } else if value <= self.config.low {
            Some((
                AlertType::LowGlucose,
                Severity::Warning,
                format!(
                    "Glucose {:.1} mg/dL is at or below the low threshold ({:.0} mg/dL)",
                    value, self.config.low
                ),
            ))
        } else {
            None
        };

        if let Some((alert_type, severity, message)) = level {
            candidates.push(AlertCandidate {
                glucose_reading_id: reading_id,
                alert_type,
                severity,
                message,
            });
        }

        // Trend warnings are independent of the level bands
        if trend.is_rapid() {
            candidates.push(AlertCandidate {
                glucose_reading_id: reading_id,
                alert_type: AlertType::TrendWarning,
                severity: Severity::Info,
                message: format!("Glucose is {}", trend.as_str().replace('_', " ")),
            });
        }

        debug!(
            "Classified reading (value {:.1}, trend {:?}) into {} candidate(s)",
            value,
            trend,
            candidates.len()
        );

        candidates
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}
