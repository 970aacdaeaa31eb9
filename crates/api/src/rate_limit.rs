//! Rate Limiting for the Mock Fetch Endpoint
//!
//! Per-IP GCRA limiting via tower_governor on the one endpoint that
//! writes synthetic data on demand.

use governor::middleware::StateInformationMiddleware;
use serde::Deserialize;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;

/// Rate limit settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Seconds per replenished request
    pub per_second: u64,
    /// Requests allowed in a burst
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst_size: 5,
        }
    }
}

/// Build the governor layer for the fetch route
///
/// Uses `PeerIpKeyExtractor`, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
/// `X-RateLimit-*` headers are added to responses.
pub fn layer(
    config: &RateLimitConfig,
) -> GovernorLayer<PeerIpKeyExtractor, StateInformationMiddleware> {
    // GovernorConfigBuilder rejects zeroes; clamp instead of panicking
    // on a bad config file.
    let governor_config = GovernorConfigBuilder::default()
        .per_second(config.per_second.max(1))
        .burst_size(config.burst_size.max(1))
        .use_headers()
        .finish()
        .expect("non-zero rate limit settings");

    GovernorLayer {
        config: Arc::new(governor_config),
    }
}
