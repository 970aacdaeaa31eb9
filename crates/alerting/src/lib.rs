//! Glucose Alerting
//!
//! Threshold-based classification of glucose readings into alert
//! candidates, plus the liveness monitor that detects a silent feed.

mod alert;
mod classifier;
mod liveness;

pub use alert::{AlertCandidate, AlertType, ParseAlertError, Severity};
pub use classifier::{Classifier, ThresholdConfig, ThresholdError};
pub use liveness::LivenessMonitor;
