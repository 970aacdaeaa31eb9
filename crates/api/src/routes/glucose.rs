//! Glucose Routes

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::SharedState;
use storage::GlucoseReading;

/// Query parameters for the readings endpoint
#[derive(Debug, Deserialize)]
pub struct ReadingQuery {
    /// Records to skip
    #[serde(default)]
    pub skip: u32,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// Response for reading list endpoints
#[derive(Debug, Serialize)]
pub struct ReadingListResponse {
    pub data: Vec<GlucoseReading>,
    pub count: usize,
}

/// Readings shown on the mock dashboard
const MOCK_WINDOW: u32 = 12;
const MAX_LIMIT: u32 = 500;

/// Get the last 12 readings
///
/// A pure read: seeding happens at startup, never here.
pub async fn get_mock(
    State(state): State<SharedState>,
) -> Result<Json<ReadingListResponse>, ApiError> {
    let state = state.read().await;
    let data = state.repository.get_readings(0, MOCK_WINDOW).await?;

    Ok(Json(ReadingListResponse {
        count: data.len(),
        data,
    }))
}

/// Force a new mock reading: synthesize, persist, classify
pub async fn force_reading(
    State(state): State<SharedState>,
) -> Result<Json<GlucoseReading>, ApiError> {
    let mut state = state.write().await;

    let reading = state.synthesizer.synthesize();
    let stored = state.repository.insert_reading(&reading).await?;

    for candidate in state
        .classifier
        .classify(Some(stored.id), stored.value, stored.trend)
    {
        state.repository.insert_alert(&candidate).await?;
    }

    Ok(Json(stored))
}

/// Get the most recent reading by timestamp
pub async fn get_latest(
    State(state): State<SharedState>,
) -> Result<Json<GlucoseReading>, ApiError> {
    let state = state.read().await;
    let reading = state.repository.latest_reading().await?;
    Ok(Json(reading))
}

/// Get readings with pagination
pub async fn get_readings(
    State(state): State<SharedState>,
    Query(params): Query<ReadingQuery>,
) -> Result<Json<ReadingListResponse>, ApiError> {
    let state = state.read().await;
    let limit = params.limit.min(MAX_LIMIT);
    let data = state.repository.get_readings(params.skip, limit).await?;

    Ok(Json(ReadingListResponse {
        count: data.len(),
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::AppState;
    use chrono::Utc;
    use std::sync::Arc;
    use telemetry::{Mode, NewReading, Synthesizer, Trend, MAX_MOCK_VALUE, MIN_MOCK_VALUE};
    use tokio::sync::RwLock;

    async fn test_state(seed: u64) -> SharedState {
        let mut state = AppState::from_config(&ApiConfig::default()).await.unwrap();
        state.synthesizer = Synthesizer::seeded(seed);
        Arc::new(RwLock::new(state))
    }

    #[tokio::test]
    async fn test_latest_on_empty_store_is_not_found() {
        let state = test_state(1).await;
        let result = get_latest(State(state)).await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn test_force_reading_persists_one_row() {
        let state = test_state(42).await;

        let reading = force_reading(State(state.clone())).await.unwrap().0;
        assert!(reading.value >= MIN_MOCK_VALUE && reading.value <= MAX_MOCK_VALUE);
        assert_eq!(reading.mode, Mode::Mock);

        let guard = state.read().await;
        assert_eq!(guard.repository.reading_count().await.unwrap(), 1);
        let latest = guard.repository.latest_reading().await.unwrap();
        assert_eq!(latest.id, reading.id);
    }

    #[tokio::test]
    async fn test_mock_window_is_a_pure_read() {
        let state = test_state(7).await;

        {
            let guard = state.read().await;
            let base = Utc::now();
            for i in 0..15 {
                let reading = NewReading {
                    timestamp: base + chrono::TimeDelta::seconds(i),
                    value: 100.0,
                    trend: Trend::Stable,
                    mode: Mode::Mock,
                };
                guard.repository.insert_reading(&reading).await.unwrap();
            }
        }

        let response = get_mock(State(state.clone())).await.unwrap().0;
        assert_eq!(response.count, 12);

        // No rows were created by the read
        let guard = state.read().await;
        assert_eq!(guard.repository.reading_count().await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_readings_pagination() {
        let state = test_state(3).await;

        for _ in 0..5 {
            force_reading(State(state.clone())).await.unwrap();
        }

        let page = get_readings(
            State(state.clone()),
            Query(ReadingQuery { skip: 2, limit: 2 }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(page.count, 2);
    }
}
