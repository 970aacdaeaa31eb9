//! Telemed CGM API Server
//!
//! REST backend exposing glucose readings and alerts for the CGM
//! dashboard.

use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;
mod seed;

use crate::config::ApiConfig;
use alerting::{Classifier, LivenessMonitor};
use storage::Repository;
use telemetry::Synthesizer;

/// Application state shared across handlers
pub struct AppState {
    /// Storage repository
    pub repository: Repository,
    /// Mock reading generator
    pub synthesizer: Synthesizer,
    /// Threshold classifier
    pub classifier: Classifier,
    /// Feed liveness monitor
    pub liveness: LivenessMonitor,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

/// Handler-facing handle to the application state
pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    /// Build state from configuration, connecting to storage
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        config.thresholds.validate()?;

        Ok(Self {
            repository: Repository::connect(&config.database_url).await?,
            synthesizer: Synthesizer::new(),
            classifier: Classifier::new(config.thresholds.clone()),
            liveness: LivenessMonitor::new(Duration::from_secs(config.liveness_timeout_secs)),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        })
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub feed: FeedStatus,
    pub metrics: StoreMetrics,
}

/// Liveness verdict for the reading feed
#[derive(Debug, Serialize)]
pub struct FeedStatus {
    pub status: String,
    pub last_reading_at: Option<DateTime<Utc>>,
}

/// Store counters
#[derive(Debug, Serialize)]
pub struct StoreMetrics {
    pub reading_count: i64,
    pub alert_count: i64,
}

/// Create the application router
pub fn create_router(state: SharedState, config: &ApiConfig) -> Router {
    Router::new()
        .route("/glucose/mock", get(routes::glucose::get_mock))
        .route(
            "/glucose/fetch",
            post(routes::glucose::force_reading).layer(rate_limit::layer(&config.rate_limit)),
        )
        .route("/glucose/latest", get(routes::glucose::get_latest))
        .route("/glucose/readings", get(routes::glucose::get_readings))
        .route("/alerts/", get(routes::alerts::list_alerts))
        .route("/alerts/active", get(routes::alerts::active_alerts))
        .route("/alerts/:id/read", put(routes::alerts::mark_read))
        .route("/alerts/:id", delete(routes::alerts::delete_alert))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

/// Health check handler
///
/// Stays answerable when storage misbehaves; counters degrade to zero
/// rather than failing the probe.
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;

    let last_reading_at = state.repository.latest_timestamp().await.unwrap_or(None);
    let feed_status = match state.liveness.check(last_reading_at, Utc::now()) {
        Some(_) => "stale",
        None => "ok",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        feed: FeedStatus {
            status: feed_status.to_string(),
            last_reading_at,
        },
        metrics: StoreMetrics {
            reading_count: state.repository.reading_count().await.unwrap_or(0),
            alert_count: state.repository.alert_count().await.unwrap_or(0),
        },
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let list: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(list))
    }
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(config: ApiConfig) -> anyhow::Result<()> {
    let mut state = AppState::from_config(&config).await?;

    if config.seed_on_start {
        let seeded = seed::seed_if_empty(
            &state.repository,
            &mut state.synthesizer,
            &state.classifier,
            config.seed_count,
        )
        .await?;
        if seeded > 0 {
            info!("Seeded {} mock readings at startup", seeded);
        }
    }

    let state = Arc::new(RwLock::new(state));
    let app = create_router(state, &config);

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
