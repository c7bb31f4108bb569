//! Stored prayer-time endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use ptt_common::{KnownLocation, StoredPrayerTime};
use serde::Serialize;
use tracing::info;

use super::collect::parse_period;
use crate::db::PersistenceGateway;
use crate::{ApiError, ApiResult, AppState};

/// Response of a month delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: u64,
}

/// Response of a month lookup
#[derive(Debug, Serialize)]
pub struct FindResponse {
    pub success: bool,
    pub result: Vec<StoredPrayerTime>,
}

/// DELETE /times/location/:location_id/:year/:month
///
/// Clears a month of bad data before re-collection.
pub async fn delete_month(
    State(state): State<AppState>,
    Path((location_id, year, month)): Path<(i64, String, String)>,
) -> ApiResult<Json<DeleteResponse>> {
    let location = known_location(location_id)?;
    let period = parse_period(&year, &month).map_err(ApiError::BadRequest)?;

    let deleted = state
        .store
        .delete_where(location.id(), period.date_range())
        .await?;

    info!(location = %location, %period, deleted, "Deleted stored month");
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

/// GET /times/find/:location_id/:year/:month
pub async fn find_month(
    State(state): State<AppState>,
    Path((location_id, year, month)): Path<(i64, String, String)>,
) -> ApiResult<Json<FindResponse>> {
    let location = known_location(location_id)?;
    let period = parse_period(&year, &month).map_err(ApiError::BadRequest)?;

    let result = state.store.find_month(location.id(), period).await?;
    Ok(Json(FindResponse {
        success: true,
        result,
    }))
}

fn known_location(location_id: i64) -> ApiResult<KnownLocation> {
    KnownLocation::from_id(location_id)
        .ok_or_else(|| ApiError::NotFound(format!("Location {}", location_id)))
}

/// Build stored prayer-time routes
pub fn times_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/times/location/:location_id/:year/:month",
            delete(delete_month),
        )
        .route("/times/find/:location_id/:year/:month", get(find_month))
}
