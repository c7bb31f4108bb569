//! Database initialization
//!
//! Creates the database file and schema on first run; safe to call on every
//! startup (all statements are idempotent).

use crate::models::KnownLocation;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the HTTP handlers read while a collection run is inserting
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create tables and seed the fixed locations
///
/// Split from [`init_database`] so in-memory pools can be prepared the same way.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_settings_table(pool).await?;
    create_locations_table(pool).await?;
    create_prayer_times_table(pool).await?;
    seed_locations(pool).await?;

    Ok(())
}

/// Create the settings table
///
/// Stores key-value pairs; also the highest-priority secrets tier.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_locations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// No uniqueness on (location_id, date): a rerun for the same month inserts again
async fn create_prayer_times_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prayer_times (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            location_id INTEGER NOT NULL REFERENCES locations(id),
            date TEXT NOT NULL,
            fajr TEXT NOT NULL,
            fajr_jamat TEXT,
            sunrise TEXT,
            dhuhr TEXT NOT NULL,
            dhuhr_jamat TEXT,
            asr TEXT NOT NULL,
            asr2 TEXT NOT NULL,
            asr_jamat TEXT,
            maghrib TEXT NOT NULL,
            maghrib_jamat TEXT,
            isha TEXT NOT NULL,
            isha_jamat TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_prayer_times_location_date ON prayer_times(location_id, date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn seed_locations(pool: &SqlitePool) -> Result<()> {
    for location in KnownLocation::ALL {
        sqlx::query("INSERT OR IGNORE INTO locations (id, name, code) VALUES (?, ?, ?)")
            .bind(location.id())
            .bind(location.name())
            .bind(location.code())
            .execute(pool)
            .await?;
    }

    Ok(())
}
