//! Prayer-time persistence
//!
//! [`PersistenceGateway`] is the storage contract the collection pipeline
//! depends on. [`SqlitePrayerTimeStore`] implements it over the shared pool
//! and adds the read queries used by the HTTP API.
//!
//! Inserts are plain inserts: collecting the same month twice stores every
//! day twice.

use async_trait::async_trait;
use ptt_common::{
    DateRange, Error, Location, Period, PrayerTimeRecord, Result, StoredPrayerTime,
};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

/// Storage contract of the collection pipeline
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Insert a batch in one transaction, returning the stored rows in input order
    async fn insert_batch(&self, records: &[PrayerTimeRecord]) -> Result<Vec<StoredPrayerTime>>;

    /// Delete a location's records within an inclusive date range
    async fn delete_where(&self, location_id: i64, range: DateRange) -> Result<u64>;
}

/// Row as stored in `prayer_times`
#[derive(Debug, FromRow)]
struct PrayerTimeRow {
    id: i64,
    location_id: i64,
    date: String,
    fajr: String,
    fajr_jamat: Option<String>,
    sunrise: Option<String>,
    dhuhr: String,
    dhuhr_jamat: Option<String>,
    asr: String,
    asr2: String,
    asr_jamat: Option<String>,
    maghrib: String,
    maghrib_jamat: Option<String>,
    isha: String,
    isha_jamat: Option<String>,
}

impl From<PrayerTimeRow> for StoredPrayerTime {
    fn from(row: PrayerTimeRow) -> Self {
        StoredPrayerTime {
            id: row.id,
            record: PrayerTimeRecord {
                location_id: row.location_id,
                date: row.date,
                fajr: row.fajr,
                fajr_jamat: row.fajr_jamat,
                sunrise: row.sunrise,
                dhuhr: row.dhuhr,
                dhuhr_jamat: row.dhuhr_jamat,
                asr: row.asr,
                asr2: row.asr2,
                asr_jamat: row.asr_jamat,
                maghrib: row.maghrib,
                maghrib_jamat: row.maghrib_jamat,
                isha: row.isha,
                isha_jamat: row.isha_jamat,
            },
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, location_id, date, fajr, fajr_jamat, sunrise, dhuhr, \
     dhuhr_jamat, asr, asr2, asr_jamat, maghrib, maghrib_jamat, isha, isha_jamat FROM prayer_times";

/// SQLite-backed prayer-time store
#[derive(Clone)]
pub struct SqlitePrayerTimeStore {
    pool: SqlitePool,
}

impl SqlitePrayerTimeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records of one location and month, ordered by date
    pub async fn find_month(&self, location_id: i64, period: Period) -> Result<Vec<StoredPrayerTime>> {
        let range = period.date_range();
        let rows: Vec<PrayerTimeRow> = sqlx::query_as(&format!(
            "{} WHERE location_id = ? AND date BETWEEN ? AND ? ORDER BY date, id",
            SELECT_COLUMNS
        ))
        .bind(location_id)
        .bind(range.start.to_string())
        .bind(range.end.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredPrayerTime::from).collect())
    }

    /// Number of stored records for a location and month
    pub async fn count_month(&self, location_id: i64, period: Period) -> Result<i64> {
        let range = period.date_range();
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM prayer_times WHERE location_id = ? AND date BETWEEN ? AND ?",
        )
        .bind(location_id)
        .bind(range.start.to_string())
        .bind(range.end.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// All locations, ordered by id
    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        let locations =
            sqlx::query_as::<_, Location>("SELECT id, name, code, description FROM locations ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(locations)
    }
}

#[async_trait]
impl PersistenceGateway for SqlitePrayerTimeStore {
    async fn insert_batch(&self, records: &[PrayerTimeRecord]) -> Result<Vec<StoredPrayerTime>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(records.len());

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO prayer_times (
                    location_id, date, fajr, fajr_jamat, sunrise, dhuhr, dhuhr_jamat,
                    asr, asr2, asr_jamat, maghrib, maghrib_jamat, isha, isha_jamat
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.location_id)
            .bind(&record.date)
            .bind(&record.fajr)
            .bind(&record.fajr_jamat)
            .bind(&record.sunrise)
            .bind(&record.dhuhr)
            .bind(&record.dhuhr_jamat)
            .bind(&record.asr)
            .bind(&record.asr2)
            .bind(&record.asr_jamat)
            .bind(&record.maghrib)
            .bind(&record.maghrib_jamat)
            .bind(&record.isha)
            .bind(&record.isha_jamat)
            .execute(&mut *tx)
            .await?;

            stored.push(StoredPrayerTime {
                id: result.last_insert_rowid(),
                record: record.clone(),
            });
        }

        tx.commit().await?;
        debug!(records = stored.len(), "Inserted prayer times");

        Ok(stored)
    }

    async fn delete_where(&self, location_id: i64, range: DateRange) -> Result<u64> {
        if range.start > range.end {
            return Err(Error::InvalidRange(format!(
                "{} is after {}",
                range.start, range.end
            )));
        }

        let result = sqlx::query(
            "DELETE FROM prayer_times WHERE location_id = ? AND date BETWEEN ? AND ?",
        )
        .bind(location_id)
        .bind(range.start.to_string())
        .bind(range.end.to_string())
        .execute(&self.pool)
        .await?;

        debug!(location_id, deleted = result.rows_affected(), "Deleted prayer times");
        Ok(result.rows_affected())
    }
}
