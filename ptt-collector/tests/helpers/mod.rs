//! Shared test helpers
//!
//! - In-memory database with the production schema
//! - Local axum server standing in for an upstream publisher
//! - Persistence gateway that counts calls
//! - Fixed secrets

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use ptt_collector::config::SecretsProvider;
use ptt_collector::db::{PersistenceGateway, SqlitePrayerTimeStore};
use ptt_collector::services::sources::{
    build_http_client, BirminghamAdapter, LondonAdapter, ManchesterAdapter,
};
use ptt_collector::services::Sources;
use ptt_common::config::SourcesConfig;
use ptt_common::{DateRange, PrayerTimeRecord, StoredPrayerTime};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Single-connection in-memory pool (every connection would otherwise get
/// its own empty database)
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    ptt_common::db::init_schema(&pool)
        .await
        .expect("Failed to initialize schema");
    pool
}

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream stand-in");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// A local URL nothing is listening on
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/closed", addr)
}

/// Sources config pointing every adapter at local URLs
pub fn sources_config(london: &str, birmingham: &str, manchester: &str) -> SourcesConfig {
    SourcesConfig {
        london_url: london.to_string(),
        birmingham_url: birmingham.to_string(),
        manchester_url: manchester.to_string(),
        fetch_timeout_secs: 5,
        user_agent: "ptt-collector-tests".to_string(),
    }
}

pub fn sources(config: &SourcesConfig, secrets: Arc<dyn SecretsProvider>) -> Sources {
    Sources::from_config(config, secrets).expect("Failed to build sources")
}

pub fn birmingham_adapter(url: &str) -> BirminghamAdapter {
    let config = sources_config(url, url, url);
    BirminghamAdapter::new(build_http_client(&config).unwrap(), url.to_string())
}

pub fn manchester_adapter(url: &str) -> ManchesterAdapter {
    let config = sources_config(url, url, url);
    ManchesterAdapter::new(build_http_client(&config).unwrap(), url.to_string())
}

pub fn london_adapter(url: &str, secrets: Arc<dyn SecretsProvider>) -> LondonAdapter {
    let config = sources_config(url, url, url);
    LondonAdapter::new(build_http_client(&config).unwrap(), url.to_string(), secrets)
}

/// Secrets from a fixed map
pub struct StaticSecrets(pub HashMap<String, String>);

impl StaticSecrets {
    pub fn with(key: &str, value: &str) -> Arc<Self> {
        Arc::new(Self(HashMap::from([(key.to_string(), value.to_string())])))
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self(HashMap::new()))
    }
}

#[async_trait]
impl SecretsProvider for StaticSecrets {
    async fn get(&self, key: &str) -> ptt_common::Result<String> {
        self.0
            .get(key)
            .cloned()
            .ok_or_else(|| ptt_common::Error::Config(format!("{} not configured", key)))
    }
}

/// Gateway delegating to a real store while counting insert calls
pub struct CountingGateway {
    pub inner: SqlitePrayerTimeStore,
    pub insert_calls: AtomicUsize,
}

impl CountingGateway {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Arc::new(Self {
            inner: SqlitePrayerTimeStore::new(pool),
            insert_calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistenceGateway for CountingGateway {
    async fn insert_batch(
        &self,
        records: &[PrayerTimeRecord],
    ) -> ptt_common::Result<Vec<StoredPrayerTime>> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_batch(records).await
    }

    async fn delete_where(&self, location_id: i64, range: DateRange) -> ptt_common::Result<u64> {
        self.inner.delete_where(location_id, range).await
    }
}

/// One Birmingham month page with the given table body rows
pub fn birmingham_page(rows: &[&[&str]]) -> String {
    let body: String = rows
        .iter()
        .map(|cells| {
            let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
            format!("<tr>{}</tr>", tds)
        })
        .collect();
    format!(
        "<div class=\"timetable\"><table><thead><tr><th>Date</th></tr></thead><tbody>{}</tbody></table></div>",
        body
    )
}

/// The single-row Birmingham fixture
pub const BIRMINGHAM_ROW: [&str; 15] = [
    "1st May 2024",
    "-",
    "6:15AM",
    "6:30AM",
    "7:02AM",
    "-",
    "1:05PM",
    "1:15PM",
    "5:30PM",
    "5:30PM",
    "-",
    "8:45PM",
    "8:45PM",
    "9:00PM",
    "9:00PM",
];
