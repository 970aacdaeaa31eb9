//! API Configuration

use crate::rate_limit::RateLimitConfig;
use alerting::ThresholdConfig;
use serde::Deserialize;

/// Server configuration
///
/// Defaults give a runnable mock deployment over an in-memory database.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Listen address
    pub bind_addr: String,
    /// SQLite database URL
    pub database_url: String,
    /// CORS origins; "*" allows any
    pub allowed_origins: Vec<String>,
    /// Seed mock data into an empty store at startup
    pub seed_on_start: bool,
    /// Number of readings to seed
    pub seed_count: u32,
    /// Silence window before the feed counts as disconnected (seconds)
    pub liveness_timeout_secs: u64,
    /// Glucose alert thresholds (mg/dL)
    pub thresholds: ThresholdConfig,
    /// Rate limit for the mock fetch endpoint
    pub rate_limit: RateLimitConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite::memory:".to_string(),
            allowed_origins: vec!["http://localhost".to_string()],
            seed_on_start: true,
            seed_count: 12,
            liveness_timeout_secs: 300,
            thresholds: ThresholdConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Load configuration from an optional `cgm.toml` plus `CGM_*` environment
/// overrides (`CGM_BIND_ADDR`, `CGM_THRESHOLDS__HIGH`, ...)
pub fn load() -> Result<ApiConfig, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("cgm").required(false))
        .add_source(config::Environment::with_prefix("CGM").separator("__"))
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = ApiConfig::default();
        assert!(config.thresholds.validate().is_ok());
        assert!(config.seed_count > 0);
        assert!(config.database_url.contains("sqlite"));
    }

    #[test]
    fn test_file_values_override_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "bind_addr = \"127.0.0.1:9000\"\nseed_on_start = false\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: ApiConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert!(!config.seed_on_start);
        // Untouched fields keep their defaults
        assert_eq!(config.seed_count, 12);
    }
}
