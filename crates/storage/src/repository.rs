//! Repository Implementation

use crate::StorageError;
use alerting::{AlertCandidate, AlertType, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use telemetry::{Mode, NewReading, Trend};
use tracing::{debug, info};

/// A persisted glucose reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlucoseReading {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub trend: Trend,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
}

/// A persisted alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: i64,
    pub glucose_reading_id: Option<i64>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ReadingRow {
    id: i64,
    timestamp: DateTime<Utc>,
    value: f64,
    trend: String,
    mode: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReadingRow> for GlucoseReading {
    type Error = StorageError;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        Ok(GlucoseReading {
            id: row.id,
            timestamp: row.timestamp,
            value: row.value,
            trend: row
                .trend
                .parse::<Trend>()
                .map_err(|e| StorageError::Decode(e.to_string()))?,
            mode: row
                .mode
                .parse::<Mode>()
                .map_err(|e| StorageError::Decode(e.to_string()))?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AlertRow {
    id: i64,
    glucose_reading_id: Option<i64>,
    alert_type: String,
    severity: String,
    message: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = StorageError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(Alert {
            id: row.id,
            glucose_reading_id: row.glucose_reading_id,
            alert_type: row
                .alert_type
                .parse::<AlertType>()
                .map_err(|e| StorageError::Decode(e.to_string()))?,
            severity: row
                .severity
                .parse::<Severity>()
                .map_err(|e| StorageError::Decode(e.to_string()))?,
            message: row.message,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const CREATE_READINGS: &str = "\
CREATE TABLE IF NOT EXISTS glucose_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    value REAL NOT NULL,
    trend TEXT NOT NULL,
    mode TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const CREATE_ALERTS: &str = "\
CREATE TABLE IF NOT EXISTS alerts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    glucose_reading_id INTEGER REFERENCES glucose_readings(id),
    alert_type TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
)";

/// Repository for readings and alerts over a SQLite pool
///
/// Every operation is a single short statement against the pool;
/// connections are acquired per call and released on all exit paths.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Connect to the database at `database_url` and ensure the schema
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        info!("Connecting to database: {}", database_url);

        let options = database_url
            .parse::<SqliteConnectOptions>()?
            .create_if_missing(true);

        // An in-memory database exists per connection, so the pool must
        // not hand out more than one.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_READINGS).execute(&pool).await?;
        sqlx::query(CREATE_ALERTS).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Persist a reading, returning the stored row with its assigned id
    pub async fn insert_reading(&self, reading: &NewReading) -> Result<GlucoseReading, StorageError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO glucose_readings (timestamp, value, trend, mode, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(reading.timestamp)
        .bind(reading.value)
        .bind(reading.trend.as_str())
        .bind(reading.mode.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted glucose reading {}", id);
        self.get_reading(id).await
    }

    /// Fetch one reading by id
    pub async fn get_reading(&self, id: i64) -> Result<GlucoseReading, StorageError> {
        let row = sqlx::query_as::<_, ReadingRow>(
            "SELECT id, timestamp, value, trend, mode, created_at \
             FROM glucose_readings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        row.try_into()
    }

    /// List readings, newest first, with pagination
    pub async fn get_readings(&self, skip: u32, limit: u32) -> Result<Vec<GlucoseReading>, StorageError> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            "SELECT id, timestamp, value, trend, mode, created_at \
             FROM glucose_readings ORDER BY timestamp DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GlucoseReading::try_from).collect()
    }

    /// Fetch the most recent reading by `timestamp`
    pub async fn latest_reading(&self) -> Result<GlucoseReading, StorageError> {
        let row = sqlx::query_as::<_, ReadingRow>(
            "SELECT id, timestamp, value, trend, mode, created_at \
             FROM glucose_readings ORDER BY timestamp DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        row.try_into()
    }

    /// Timestamp of the most recent reading, if any
    pub async fn latest_timestamp(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let timestamp = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT timestamp FROM glucose_readings ORDER BY timestamp DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(timestamp)
    }

    /// Total reading count
    pub async fn reading_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM glucose_readings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Persist an alert candidate, returning the stored row
    pub async fn insert_alert(&self, candidate: &AlertCandidate) -> Result<Alert, StorageError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO alerts (glucose_reading_id, alert_type, severity, message, is_active, created_at) \
             VALUES (?, ?, ?, ?, 1, ?)",
        )
        .bind(candidate.glucose_reading_id)
        .bind(candidate.alert_type.as_str())
        .bind(candidate.severity.as_str())
        .bind(&candidate.message)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted {} alert {}", candidate.alert_type.as_str(), id);
        self.get_alert(id).await
    }

    /// Fetch one alert by id
    pub async fn get_alert(&self, id: i64) -> Result<Alert, StorageError> {
        let row = sqlx::query_as::<_, AlertRow>(
            "SELECT id, glucose_reading_id, alert_type, severity, message, is_active, created_at \
             FROM alerts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        row.try_into()
    }

    /// List alerts, newest first, optionally filtered by severity
    pub async fn get_alerts(
        &self,
        severity: Option<Severity>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Alert>, StorageError> {
        let rows = match severity {
            Some(severity) => {
                sqlx::query_as::<_, AlertRow>(
                    "SELECT id, glucose_reading_id, alert_type, severity, message, is_active, created_at \
                     FROM alerts WHERE severity = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(severity.as_str())
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AlertRow>(
                    "SELECT id, glucose_reading_id, alert_type, severity, message, is_active, created_at \
                     FROM alerts ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Alert::try_from).collect()
    }

    /// List active alerts, newest first
    pub async fn get_active_alerts(&self) -> Result<Vec<Alert>, StorageError> {
        let rows = sqlx::query_as::<_, AlertRow>(
            "SELECT id, glucose_reading_id, alert_type, severity, message, is_active, created_at \
             FROM alerts WHERE is_active = 1 ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Alert::try_from).collect()
    }

    /// Deactivate an alert, returning the updated row
    ///
    /// Idempotent: deactivating an already-inactive alert re-runs the
    /// same update and succeeds.
    pub async fn mark_alert_read(&self, id: i64) -> Result<Alert, StorageError> {
        let result = sqlx::query("UPDATE alerts SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Marked alert {} as read", id);
        self.get_alert(id).await
    }

    /// Hard-delete an alert
    pub async fn delete_alert(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Deleted alert {}", id);
        Ok(())
    }

    /// Total alert count
    pub async fn alert_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alerts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry::Synthesizer;

    async fn repo() -> Repository {
        Repository::connect("sqlite::memory:").await.unwrap()
    }

    fn stable_reading(value: f64) -> NewReading {
        NewReading {
            timestamp: Utc::now(),
            value,
            trend: Trend::Stable,
            mode: Mode::Mock,
        }
    }

    fn candidate(reading_id: Option<i64>) -> AlertCandidate {
        AlertCandidate {
            glucose_reading_id: reading_id,
            alert_type: AlertType::HighGlucose,
            severity: Severity::Warning,
            message: "Glucose 190.0 mg/dL is at or above the high threshold".to_string(),
        }
    }

    #[tokio::test]
    async fn test_reading_round_trip() {
        let repo = repo().await;
        let mut synth = Synthesizer::seeded(42);
        let reading = synth.synthesize();

        let stored = repo.insert_reading(&reading).await.unwrap();
        let fetched = repo.get_reading(stored.id).await.unwrap();

        assert_eq!(fetched.value, reading.value);
        assert_eq!(fetched.trend, reading.trend);
        assert_eq!(fetched.mode, reading.mode);
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_missing_reading_is_not_found() {
        let repo = repo().await;
        assert!(matches!(
            repo.get_reading(12345).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.latest_reading().await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_readings_paginate_newest_first() {
        let repo = repo().await;
        let base = Utc::now();
        for i in 0..5 {
            let mut reading = stable_reading(100.0 + i as f64);
            reading.timestamp = base + chrono::TimeDelta::seconds(i);
            repo.insert_reading(&reading).await.unwrap();
        }

        let page = repo.get_readings(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].value, 104.0);
        assert_eq!(page[1].value, 103.0);

        let next = repo.get_readings(2, 2).await.unwrap();
        assert_eq!(next[0].value, 102.0);

        let latest = repo.latest_reading().await.unwrap();
        assert_eq!(latest.value, 104.0);
        assert_eq!(
            repo.latest_timestamp().await.unwrap(),
            Some(latest.timestamp)
        );
    }

    #[tokio::test]
    async fn test_alert_lifecycle() {
        let repo = repo().await;
        let reading = repo.insert_reading(&stable_reading(190.0)).await.unwrap();

        let alert = repo.insert_alert(&candidate(Some(reading.id))).await.unwrap();
        assert!(alert.is_active);
        assert_eq!(alert.glucose_reading_id, Some(reading.id));

        let active = repo.get_active_alerts().await.unwrap();
        assert_eq!(active.len(), 1);

        let read = repo.mark_alert_read(alert.id).await.unwrap();
        assert!(!read.is_active);
        assert!(repo.get_active_alerts().await.unwrap().is_empty());

        // Second deactivation succeeds and returns the same record
        let again = repo.mark_alert_read(alert.id).await.unwrap();
        assert!(!again.is_active);
        assert_eq!(again.id, read.id);
    }

    #[tokio::test]
    async fn test_alert_without_reading_reference() {
        let repo = repo().await;
        let alert = repo.insert_alert(&candidate(None)).await.unwrap();
        assert_eq!(alert.glucose_reading_id, None);
    }

    #[tokio::test]
    async fn test_delete_alert() {
        let repo = repo().await;
        let alert = repo.insert_alert(&candidate(None)).await.unwrap();

        repo.delete_alert(alert.id).await.unwrap();
        assert!(matches!(
            repo.get_alert(alert.id).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.delete_alert(alert.id).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_mark_read_missing_alert_is_not_found() {
        let repo = repo().await;
        assert!(matches!(
            repo.mark_alert_read(99).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_alerts_filter_by_severity() {
        let repo = repo().await;
        repo.insert_alert(&candidate(None)).await.unwrap();

        let mut critical = candidate(None);
        critical.alert_type = AlertType::CriticalHigh;
        critical.severity = Severity::Critical;
        repo.insert_alert(&critical).await.unwrap();

        let all = repo.get_alerts(None, 0, 100).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_critical = repo
            .get_alerts(Some(Severity::Critical), 0, 100)
            .await
            .unwrap();
        assert_eq!(only_critical.len(), 1);
        assert_eq!(only_critical[0].alert_type, AlertType::CriticalHigh);

        assert_eq!(repo.alert_count().await.unwrap(), 2);
    }
}
