//! Location registry endpoint

use axum::{extract::State, routing::get, Json, Router};
use ptt_common::Location;
use serde::Serialize;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub success: bool,
    pub result: Vec<Location>,
}

/// GET /locations/find
pub async fn find_locations(State(state): State<AppState>) -> ApiResult<Json<LocationsResponse>> {
    let result = state.store.list_locations().await?;
    Ok(Json(LocationsResponse {
        success: true,
        result,
    }))
}

pub fn location_routes() -> Router<AppState> {
    Router::new().route("/locations/find", get(find_locations))
}
