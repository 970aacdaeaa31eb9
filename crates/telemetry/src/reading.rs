//! Glucose Reading Data Contracts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors when parsing reading fields from their wire/database form
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Trend string outside the enumerated set
    #[error("unknown trend: {0}")]
    UnknownTrend(String),

    /// Mode string outside the enumerated set
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}

/// Direction of glucose change reported alongside a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    RisingRapidly,
    FallingRapidly,
}

impl Trend {
    /// All trend variants, in declaration order
    pub const ALL: [Trend; 5] = [
        Trend::Rising,
        Trend::Falling,
        Trend::Stable,
        Trend::RisingRapidly,
        Trend::FallingRapidly,
    ];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
            Trend::RisingRapidly => "rising_rapidly",
            Trend::FallingRapidly => "falling_rapidly",
        }
    }

    /// Whether this is one of the rapid variants
    pub fn is_rapid(&self) -> bool {
        matches!(self, Trend::RisingRapidly | Trend::FallingRapidly)
    }
}

impl FromStr for Trend {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rising" => Ok(Trend::Rising),
            "falling" => Ok(Trend::Falling),
            "stable" => Ok(Trend::Stable),
            "rising_rapidly" => Ok(Trend::RisingRapidly),
            "falling_rapidly" => Ok(Trend::FallingRapidly),
            other => Err(ValidationError::UnknownTrend(other.to_string())),
        }
    }
}

/// Provenance of a reading, always set by the producer and never inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Mock,
    Real,
}

impl Mode {
    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Mock => "mock",
            Mode::Real => "real",
        }
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mock" => Ok(Mode::Mock),
            "real" => Ok(Mode::Real),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// An unpersisted glucose observation, before storage assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    /// Instant the reading nominally occurred
    pub timestamp: DateTime<Utc>,
    /// Concentration in mg/dL
    pub value: f64,
    pub trend: Trend,
    pub mode: Mode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_round_trip() {
        for trend in Trend::ALL {
            assert_eq!(trend.as_str().parse::<Trend>().unwrap(), trend);
        }
    }

    #[test]
    fn test_unknown_trend_rejected() {
        assert!("sideways".parse::<Trend>().is_err());
        assert!("".parse::<Trend>().is_err());
    }

    #[test]
    fn test_mode_round_trip() {
        assert_eq!("mock".parse::<Mode>().unwrap(), Mode::Mock);
        assert_eq!("real".parse::<Mode>().unwrap(), Mode::Real);
        assert!("simulated".parse::<Mode>().is_err());
    }

    #[test]
    fn test_rapid_variants() {
        assert!(Trend::RisingRapidly.is_rapid());
        assert!(Trend::FallingRapidly.is_rapid());
        assert!(!Trend::Stable.is_rapid());
        assert!(!Trend::Rising.is_rapid());
    }
}
