//! Collection endpoints
//!
//! Each handler runs one collection synchronously and answers with the
//! run's `CollectionResponse`. Month segments accept a number or an English
//! month name; London and Birmingham take `year/month`, Manchester takes
//! `month/year`.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use ptt_common::{KnownLocation, Period};

use crate::services::CollectionResponse;
use crate::AppState;

/// GET /london/:year/:month
pub async fn collect_london(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
) -> CollectionResponse {
    run(&state, KnownLocation::London, &year, &month).await
}

/// GET /birmingham (current month)
pub async fn collect_birmingham_current(State(state): State<AppState>) -> CollectionResponse {
    state
        .run_collection(KnownLocation::Birmingham, Period::current())
        .await
}

/// GET /birmingham/:year/:month
pub async fn collect_birmingham(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
) -> CollectionResponse {
    run(&state, KnownLocation::Birmingham, &year, &month).await
}

/// GET /manchester/:month/:year
pub async fn collect_manchester(
    State(state): State<AppState>,
    Path((month, year)): Path<(String, String)>,
) -> CollectionResponse {
    run(&state, KnownLocation::Manchester, &year, &month).await
}

async fn run(
    state: &AppState,
    location: KnownLocation,
    year: &str,
    month: &str,
) -> CollectionResponse {
    match parse_period(year, month) {
        Ok(period) => state.run_collection(location, period).await,
        Err(message) => CollectionResponse::invalid_argument(message),
    }
}

/// Period from path segments
pub fn parse_period(year: &str, month: &str) -> Result<Period, String> {
    let year: i32 = year
        .trim()
        .parse()
        .map_err(|_| format!("Invalid year: {}", year))?;
    Period::parse(year, month).map_err(|e| e.to_string())
}

/// Build collection routes
pub fn collect_routes() -> Router<AppState> {
    Router::new()
        .route("/london/:year/:month", get(collect_london))
        .route("/birmingham", get(collect_birmingham_current))
        .route("/birmingham/:year/:month", get(collect_birmingham))
        .route("/manchester/:month/:year", get(collect_manchester))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_accepts_names_and_numbers() {
        assert_eq!(parse_period("2024", "05").unwrap(), Period::new(2024, 5).unwrap());
        assert_eq!(parse_period("2024", "May").unwrap(), Period::new(2024, 5).unwrap());
    }

    #[test]
    fn test_parse_period_rejects_bad_segments() {
        assert_eq!(parse_period("twenty", "5").unwrap_err(), "Invalid year: twenty");
        assert!(parse_period("2024", "13").is_err());
        assert!(parse_period("2024", "Smarch").is_err());
    }
}
