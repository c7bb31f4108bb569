//! ptt-collector library interface
//!
//! Collection pipeline, persistence, scheduling and HTTP API of the prayer
//! timetable collector. Exposed as a library for integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use ptt_common::{KnownLocation, Period};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::SqlitePrayerTimeStore;
use crate::services::{CollectionOrchestrator, CollectionResponse, Sources};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Prayer-time store (also the orchestrator's persistence gateway)
    pub store: Arc<SqlitePrayerTimeStore>,
    pub orchestrator: Arc<CollectionOrchestrator>,
    pub sources: Sources,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last collection error for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, sources: Sources) -> Self {
        let store = Arc::new(SqlitePrayerTimeStore::new(db.clone()));
        let orchestrator = Arc::new(CollectionOrchestrator::new(store.clone()));
        let last_error = orchestrator.last_error();

        Self {
            db,
            store,
            orchestrator,
            sources,
            startup_time: Utc::now(),
            last_error,
        }
    }

    /// Run one collection for a location and month
    pub async fn run_collection(&self, location: KnownLocation, period: Period) -> CollectionResponse {
        let adapter = self.sources.get(location);
        self.orchestrator.run(adapter.as_ref(), period).await
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::collect_routes())
        .merge(api::times_routes())
        .merge(api::location_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
