//! Alert Data Contracts

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors when parsing alert fields from their wire/database form
#[derive(Debug, Clone, Error)]
pub enum ParseAlertError {
    /// Alert type string outside the enumerated set
    #[error("unknown alert type: {0}")]
    UnknownType(String),

    /// Severity string outside the enumerated set
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
}

/// Kind of condition an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HighGlucose,
    LowGlucose,
    CriticalHigh,
    CriticalLow,
    TrendWarning,
    ConnectionLost,
}

impl AlertType {
    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::HighGlucose => "high_glucose",
            AlertType::LowGlucose => "low_glucose",
            AlertType::CriticalHigh => "critical_high",
            AlertType::CriticalLow => "critical_low",
            AlertType::TrendWarning => "trend_warning",
            AlertType::ConnectionLost => "connection_lost",
        }
    }
}

impl FromStr for AlertType {
    type Err = ParseAlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high_glucose" => Ok(AlertType::HighGlucose),
            "low_glucose" => Ok(AlertType::LowGlucose),
            "critical_high" => Ok(AlertType::CriticalHigh),
            "critical_low" => Ok(AlertType::CriticalLow),
            "trend_warning" => Ok(AlertType::TrendWarning),
            "connection_lost" => Ok(AlertType::ConnectionLost),
            other => Err(ParseAlertError::UnknownType(other.to_string())),
        }
    }
}

/// How urgent an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = ParseAlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            other => Err(ParseAlertError::UnknownSeverity(other.to_string())),
        }
    }
}

/// An unpersisted alert, before storage assigns an id
///
/// `glucose_reading_id` is `None` for alerts that reference no reading,
/// such as `connection_lost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCandidate {
    pub glucose_reading_id: Option<i64>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
}
