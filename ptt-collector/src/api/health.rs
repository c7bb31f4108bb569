//! Health check endpoint
//!
//! Reports liveness plus collection state: the last successful run of each
//! location and the most recent failure since startup.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use ptt_common::KnownLocation;
use serde::Serialize;

use crate::services::LastCollection;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// One entry per known location, in id order
    pub collections: Vec<LocationHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationHealth {
    pub location: KnownLocation,
    pub location_id: i64,
    /// Absent until the first successful run
    pub last_success: Option<LastCollection>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    let mut collections = Vec::with_capacity(KnownLocation::ALL.len());
    for location in KnownLocation::ALL {
        collections.push(LocationHealth {
            location,
            location_id: location.id(),
            last_success: state.orchestrator.last_collection(location).await,
        });
    }

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "ptt-collector".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        collections,
        last_error: state.last_error.read().await.clone(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
