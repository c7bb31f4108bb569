//! One collection run: fetch → parse → persist
//!
//! Stages run strictly in order and the first error ends the run. Errors are
//! translated into a [`CollectionResponse`] here and nowhere else. No retry
//! happens inside a run; a retry is another run.

use chrono::{DateTime, Utc};
use ptt_common::{KnownLocation, Period, StoredPrayerTime};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::{CollectionError, CollectionResponse, SourceAdapter};
use crate::db::PersistenceGateway;

/// Most recent successful run of one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastCollection {
    /// Collected month, `YYYY-MM`
    pub period: String,
    pub records: usize,
    pub finished_at: DateTime<Utc>,
}

pub struct CollectionOrchestrator {
    store: Arc<dyn PersistenceGateway>,
    /// Message of the most recent failed run (for /health)
    last_error: Arc<RwLock<Option<String>>>,
    last_success: RwLock<HashMap<KnownLocation, LastCollection>>,
}

impl CollectionOrchestrator {
    pub fn new(store: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            store,
            last_error: Arc::new(RwLock::new(None)),
            last_success: RwLock::new(HashMap::new()),
        }
    }

    pub fn last_error(&self) -> Arc<RwLock<Option<String>>> {
        Arc::clone(&self.last_error)
    }

    /// Most recent successful run for `location`, if any since startup
    pub async fn last_collection(&self, location: KnownLocation) -> Option<LastCollection> {
        self.last_success.read().await.get(&location).cloned()
    }

    /// Run one adapter end to end for `period`
    pub async fn run(&self, adapter: &dyn SourceAdapter, period: Period) -> CollectionResponse {
        let location = adapter.location();

        match self.collect(adapter, period).await {
            Ok(stored) => {
                info!(
                    location = %location,
                    %period,
                    records = stored.len(),
                    "Collection complete"
                );
                self.last_success.write().await.insert(
                    location,
                    LastCollection {
                        period: period.to_string(),
                        records: stored.len(),
                        finished_at: Utc::now(),
                    },
                );
                CollectionResponse::ok(stored)
            }
            Err(err) => {
                let response = CollectionResponse::failed(&err);
                error!(
                    location = %location,
                    %period,
                    status = ?response.status,
                    "Collection failed: {}",
                    err
                );
                *self.last_error.write().await =
                    Some(format!("{} {}: {}", location, period, err));
                response
            }
        }
    }

    async fn collect(
        &self,
        adapter: &dyn SourceAdapter,
        period: Period,
    ) -> Result<Vec<StoredPrayerTime>, CollectionError> {
        let payload = adapter.fetch(period).await?;
        let records = adapter.parse(&payload, period)?;

        if records.is_empty() {
            return Err(CollectionError::Persistence(
                "no records to insert".to_string(),
            ));
        }

        let stored = self
            .store
            .insert_batch(&records)
            .await
            .map_err(|e| CollectionError::Persistence(e.to_string()))?;

        if stored.is_empty() {
            return Err(CollectionError::Persistence(format!(
                "insert of {} records stored nothing",
                records.len()
            )));
        }

        Ok(stored)
    }
}
