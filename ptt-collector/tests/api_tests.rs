//! Integration tests for the HTTP API
//!
//! Router-level tests through `tower::ServiceExt::oneshot`, with upstream
//! publishers served from local stand-ins.

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Html,
    routing::post,
    Router,
};
use helpers::*;
use http_body_util::BodyExt;
use ptt_collector::db::PersistenceGateway;
use ptt_collector::AppState;
use ptt_common::{Period, PrayerTimeRecord};
use serde_json::Value;
use tower::util::ServiceExt;

/// App whose adapters point at `birmingham_url` (others unreachable)
async fn create_test_app(birmingham_url: &str) -> (Router, AppState) {
    let closed = closed_url().await;
    let config = sources_config(&closed, birmingham_url, &closed);
    let state = AppState::new(memory_pool().await, sources(&config, StaticSecrets::empty()));
    (ptt_collector::build_router(state.clone()), state)
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn record(location_id: i64, date: &str) -> PrayerTimeRecord {
    PrayerTimeRecord {
        location_id,
        date: date.to_string(),
        fajr: "04:00".to_string(),
        fajr_jamat: None,
        sunrise: Some("05:30".to_string()),
        dhuhr: "13:00".to_string(),
        dhuhr_jamat: None,
        asr: "17:00".to_string(),
        asr2: "17:00".to_string(),
        asr_jamat: None,
        maghrib: "20:30".to_string(),
        maghrib_jamat: None,
        isha: "22:00".to_string(),
        isha_jamat: None,
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let (status, json) = send(app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "ptt-collector");
    assert!(json["uptime_seconds"].is_u64());
    assert!(json.get("last_error").is_none());

    let collections = json["collections"].as_array().unwrap();
    assert_eq!(collections.len(), 3);
    assert_eq!(collections[0]["location"], "london");
    assert_eq!(collections[2]["location_id"], 3);
    assert!(collections.iter().all(|c| c["last_success"].is_null()));
}

#[tokio::test]
async fn test_locations_find_lists_seeded_locations() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let (status, json) = send(app, "GET", "/locations/find").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let result = json["result"].as_array().unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result[0]["code"], "LDN");
    assert_eq!(result[1]["name"], "Birmingham");
    assert_eq!(result[2]["id"], 3);
}

#[tokio::test]
async fn test_birmingham_collection_endpoint_stores_records() {
    let page = birmingham_page(&[&BIRMINGHAM_ROW[..]]);
    let upstream = Router::new().route("/ajax", post(move || async move { Html(page) }));
    let base = spawn_upstream(upstream).await;
    let (app, state) = create_test_app(&format!("{}/ajax", base)).await;

    let (status, json) = send(app.clone(), "GET", "/birmingham/2024/may").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    let body = json["body"].as_array().unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["locationId"], 2);
    assert_eq!(body[0]["date"], "2024-05-01");
    assert_eq!(body[0]["dhuhrJamat"], "13:15");
    assert!(body[0]["id"].is_i64());

    let stored = state.store.find_month(2, Period::new(2024, 5).unwrap()).await.unwrap();
    assert_eq!(stored.len(), 1);

    let (_, health) = send(app, "GET", "/health").await;
    let birmingham = &health["collections"][1];
    assert_eq!(birmingham["location"], "birmingham");
    assert_eq!(birmingham["last_success"]["period"], "2024-05");
    assert_eq!(birmingham["last_success"]["records"], 1);
    assert!(health["collections"][0]["last_success"].is_null());
}

#[tokio::test]
async fn test_collection_failure_reports_status_and_message() {
    let (app, state) = create_test_app("http://127.0.0.1:9/unused").await;

    // London adapter has no API key configured
    let (status, json) = send(app.clone(), "GET", "/london/2024/5").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "internal");
    assert!(json["error"].as_str().unwrap().contains("LONDON_PRAYER_TIMES_API"));
    assert!(json.get("body").is_none());

    let (_, health) = send(app, "GET", "/health").await;
    assert!(health["last_error"].as_str().unwrap().starts_with("London 2024-05"));
    assert!(state.last_error.read().await.is_some());
}

#[tokio::test]
async fn test_unreachable_manchester_is_service_unavailable() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let (status, json) = send(app, "GET", "/manchester/May/2024").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unavailable");
}

#[tokio::test]
async fn test_invalid_period_is_invalid_argument() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let (status, json) = send(app.clone(), "GET", "/birmingham/2024/13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "invalid_argument");

    let (status, json) = send(app, "GET", "/manchester/May/next").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid year: next");
}

#[tokio::test]
async fn test_times_find_returns_month_in_date_order() {
    let (app, state) = create_test_app("http://127.0.0.1:9/unused").await;
    state
        .store
        .insert_batch(&[
            record(3, "2024-05-02"),
            record(3, "2024-05-01"),
            record(3, "2024-06-01"),
        ])
        .await
        .unwrap();

    let (status, json) = send(app, "GET", "/times/find/3/2024/5").await;

    assert_eq!(status, StatusCode::OK);
    let result = json["result"].as_array().unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["date"], "2024-05-01");
    assert_eq!(result[1]["date"], "2024-05-02");
    assert_eq!(result[0]["sunrise"], "05:30");
}

#[tokio::test]
async fn test_delete_month_clears_only_that_month() {
    let (app, state) = create_test_app("http://127.0.0.1:9/unused").await;
    state
        .store
        .insert_batch(&[
            record(2, "2024-05-01"),
            record(2, "2024-05-31"),
            record(2, "2024-06-01"),
            record(1, "2024-05-01"),
        ])
        .await
        .unwrap();

    let (status, json) = send(app, "DELETE", "/times/location/2/2024/5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["deleted"], 2);
    assert_eq!(state.store.count_month(2, Period::new(2024, 6).unwrap()).await.unwrap(), 1);
    assert_eq!(state.store.count_month(1, Period::new(2024, 5).unwrap()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_location_uses_error_envelope() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let (status, json) = send(app, "DELETE", "/times/location/9/2024/5").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Location 9");
}

#[tokio::test]
async fn test_bad_month_on_find_is_bad_request() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let (status, json) = send(app, "GET", "/times/find/1/2024/Smarch").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_non_numeric_year_uses_error_envelope() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let (status, json) = send(app.clone(), "GET", "/times/find/1/next/5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert_eq!(json["error"]["message"], "Invalid year: next");

    let (status, json) = send(app, "DELETE", "/times/location/1/2024x/5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "Invalid year: 2024x");
}

#[tokio::test]
async fn test_cors_preflight_is_permitted() {
    let (app, _state) = create_test_app("http://127.0.0.1:9/unused").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/locations/find")
                .header("Origin", "http://display.local")
                .header("Access-Control-Request-Method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
