//! Feed Liveness Monitor

use crate::alert::{AlertCandidate, AlertType, Severity};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::warn;

/// Detects a feed that has gone quiet
///
/// The classifier never emits `connection_lost`; it comes from here,
/// based on the timestamp of the most recent reading.
pub struct LivenessMonitor {
    timeout: Duration,
}

impl LivenessMonitor {
    /// Create a monitor with the given silence window
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Check whether the feed is alive at `now`
    ///
    /// Returns a `connection_lost` candidate when no reading has ever
    /// arrived, or when the last one is older than the window. The
    /// candidate references no reading.
    pub fn check(&self, last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<AlertCandidate> {
        let message = match last_seen {
            Some(last) => {
                let silence = (now - last).to_std().unwrap_or(Duration::ZERO);
                if silence <= self.timeout {
                    return None;
                }
                format!(
                    "No glucose reading received for {}s (window: {}s)",
                    silence.as_secs(),
                    self.timeout.as_secs()
                )
            }
            None => "No glucose readings received yet".to_string(),
        };

        warn!("Feed liveness check failed: {}", message);

        Some(AlertCandidate {
            glucose_reading_id: None,
            alert_type: AlertType::ConnectionLost,
            severity: Severity::Error,
            message,
        })
    }
}
