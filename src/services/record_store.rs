//! RecordStore: loads and saves the whole Q&A collection as one JSON document.
//!
//! Neither operation ever fails towards the caller: a missing or malformed
//! document loads as an empty collection and a failed save is only logged.
//! There is no locking; concurrent writers race and the last one wins.

use crate::{
    models::qa::{QaRecord, StoredRecord},
    services::document::DocumentBackend,
};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn DocumentBackend>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Load every record from the document.
    ///
    /// Records stored without an id get a fresh one, and if any id was
    /// assigned the corrected collection is written back before returning.
    pub async fn load(&self) -> Vec<QaRecord> {
        let bytes = match self.backend.read().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No Q&A document at {}, returning empty list", self.location());
                return Vec::new();
            }
            Err(err) => {
                error!("Error loading Q&A data from {}: {}", self.location(), err);
                return Vec::new();
            }
        };

        let stored: Vec<StoredRecord> = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(err) => {
                error!("Error parsing Q&A data from {}: {}", self.location(), err);
                return Vec::new();
            }
        };

        let mut migrated = false;
        let records: Vec<QaRecord> = stored
            .into_iter()
            .map(|record| {
                let (record, assigned) = record.into_record();
                migrated |= assigned;
                record
            })
            .collect();

        if migrated {
            match self.try_save(&records).await {
                Ok(()) => info!("Assigned IDs to Q&A entries and saved updated document"),
                Err(err) => error!("Error saving Q&A data with new IDs: {}", err),
            }
        }

        debug!("Loaded {} Q&A records", records.len());
        records
    }

    /// Overwrite the document with `records`. Failures are logged, not returned,
    /// so callers cannot assume the write reached storage.
    pub async fn save(&self, records: &[QaRecord]) {
        match self.try_save(records).await {
            Ok(()) => debug!("Saved {} Q&A records", records.len()),
            Err(err) => error!("Error saving Q&A data to {}: {}", self.location(), err),
        }
    }

    async fn try_save(&self, records: &[QaRecord]) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(records)?;
        self.backend.write(&body).await?;
        Ok(())
    }
}
