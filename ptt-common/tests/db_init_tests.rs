//! Tests for database initialization
//!
//! - Database file created automatically on first run
//! - Re-opening an existing database is idempotent
//! - The fixed locations are seeded exactly once

use ptt_common::db::init::{init_database, init_schema};
use ptt_common::{KnownLocation, Location};
use sqlx::sqlite::SqlitePoolOptions;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("timetable.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_and_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("timetable.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
        .fetch_one(&pool2)
        .await
        .unwrap();

    assert_eq!(count, 3, "locations must be seeded exactly once");
}

#[tokio::test]
async fn test_seeded_locations_match_known_ids() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();

    let locations: Vec<Location> =
        sqlx::query_as("SELECT id, name, code, description FROM locations ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(locations.len(), 3);
    for (location, known) in locations.iter().zip(KnownLocation::ALL) {
        assert_eq!(location.id, known.id());
        assert_eq!(location.name, known.name());
        assert_eq!(location.code, known.code());
    }
}

#[tokio::test]
async fn test_prayer_times_table_has_no_uniqueness_on_date() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();

    for _ in 0..2 {
        sqlx::query(
            "INSERT INTO prayer_times (location_id, date, fajr, dhuhr, asr, asr2, maghrib, isha)
             VALUES (2, '2024-05-01', '04:00', '13:05', '17:30', '17:30', '20:45', '22:00')",
        )
        .execute(&pool)
        .await
        .unwrap();
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prayer_times")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_prayer_times_rejects_unknown_location() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO prayer_times (location_id, date, fajr, dhuhr, asr, asr2, maghrib, isha)
         VALUES (99, '2024-05-01', '04:00', '13:05', '17:30', '17:30', '20:45', '22:00')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "foreign key on location_id must be enforced");
}
