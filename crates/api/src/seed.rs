//! Startup Seeding
//!
//! Mock data is written here, once, at startup. Read endpoints never
//! create data as a side effect.

use alerting::Classifier;
use storage::{Repository, StorageError};
use telemetry::Synthesizer;
use tracing::info;

/// Seed `count` mock readings (plus their alerts) into an empty store
///
/// Returns how many readings were inserted; a non-empty store is left
/// untouched.
pub async fn seed_if_empty(
    repository: &Repository,
    synthesizer: &mut Synthesizer,
    classifier: &Classifier,
    count: u32,
) -> Result<u32, StorageError> {
    if repository.reading_count().await? > 0 {
        return Ok(0);
    }

    info!("Empty store: seeding {} mock readings", count);

    for _ in 0..count {
        let reading = synthesizer.synthesize();
        let stored = repository.insert_reading(&reading).await?;
        for candidate in classifier.classify(Some(stored.id), stored.value, stored.trend) {
            repository.insert_alert(&candidate).await?;
        }
    }

    Ok(count)
}
