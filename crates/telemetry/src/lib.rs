//! Glucose Telemetry
//!
//! Data contracts for glucose readings and the mock reading synthesizer
//! that stands in for a real CGM feed.

mod reading;
mod synthesizer;

pub use reading::{Mode, NewReading, Trend, ValidationError};
pub use synthesizer::{Synthesizer, MAX_MOCK_VALUE, MIN_MOCK_VALUE};
