//! Storage Layer
//!
//! SQLite persistence for glucose readings and alerts, behind a
//! repository pattern.

mod repository;

pub use repository::{Alert, GlucoseReading, Repository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record not found")]
    NotFound,
    #[error("invalid stored value: {0}")]
    Decode(String),
}
