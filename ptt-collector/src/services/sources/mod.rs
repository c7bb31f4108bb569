//! Source adapters
//!
//! One adapter per location. An adapter knows the upstream request shape
//! (verb, parameter naming, period encoding) and how to turn the payload it
//! fetched into records. Adapters hold no state between calls.

pub mod birmingham;
pub mod london;
pub mod manchester;

pub use birmingham::BirminghamAdapter;
pub use london::LondonAdapter;
pub use manchester::ManchesterAdapter;

use async_trait::async_trait;
use ptt_common::config::SourcesConfig;
use ptt_common::{KnownLocation, Period, PrayerTimeRecord};
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;

use super::CollectionError;
use crate::config::SecretsProvider;

/// Raw upstream payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayload {
    Json(String),
    Html(String),
}

impl RawPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            RawPayload::Json(_) => "json",
            RawPayload::Html(_) => "html",
        }
    }
}

/// Fetch-and-parse contract of one upstream publisher
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Location whose id is stamped onto every record
    fn location(&self) -> KnownLocation;

    /// Fetch the raw timetable for one month
    ///
    /// Fails with `SourceUnavailable` on a non-success status.
    async fn fetch(&self, period: Period) -> Result<RawPayload, CollectionError>;

    /// Turn a fetched payload into records, all or nothing
    fn parse(
        &self,
        payload: &RawPayload,
        period: Period,
    ) -> Result<Vec<PrayerTimeRecord>, CollectionError>;
}

/// Build the HTTP client shared by all adapters
pub fn build_http_client(config: &SourcesConfig) -> Result<Client, CollectionError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()
        .map_err(|e| CollectionError::Unknown(format!("Failed to create HTTP client: {}", e)))
}

/// Body text of a successful response; non-success becomes `SourceUnavailable`
pub(crate) async fn success_body(response: Response) -> Result<String, CollectionError> {
    let status = response.status();
    if !status.is_success() {
        return Err(CollectionError::SourceUnavailable(status.to_string()));
    }
    Ok(response.text().await?)
}

pub(crate) fn expect_html<'a>(
    payload: &'a RawPayload,
    location: KnownLocation,
) -> Result<&'a str, CollectionError> {
    match payload {
        RawPayload::Html(html) => Ok(html),
        other => Err(CollectionError::Unknown(format!(
            "{} adapter expects an HTML payload, got {}",
            location,
            other.kind()
        ))),
    }
}

/// The adapter set, one per known location
#[derive(Clone)]
pub struct Sources {
    london: Arc<dyn SourceAdapter>,
    birmingham: Arc<dyn SourceAdapter>,
    manchester: Arc<dyn SourceAdapter>,
}

impl Sources {
    pub fn new(
        london: Arc<dyn SourceAdapter>,
        birmingham: Arc<dyn SourceAdapter>,
        manchester: Arc<dyn SourceAdapter>,
    ) -> Self {
        Self {
            london,
            birmingham,
            manchester,
        }
    }

    /// Adapters for the configured upstream endpoints
    pub fn from_config(
        config: &SourcesConfig,
        secrets: Arc<dyn SecretsProvider>,
    ) -> Result<Self, CollectionError> {
        let client = build_http_client(config)?;

        Ok(Self::new(
            Arc::new(LondonAdapter::new(
                client.clone(),
                config.london_url.clone(),
                secrets,
            )),
            Arc::new(BirminghamAdapter::new(
                client.clone(),
                config.birmingham_url.clone(),
            )),
            Arc::new(ManchesterAdapter::new(client, config.manchester_url.clone())),
        ))
    }

    pub fn get(&self, location: KnownLocation) -> Arc<dyn SourceAdapter> {
        match location {
            KnownLocation::London => Arc::clone(&self.london),
            KnownLocation::Birmingham => Arc::clone(&self.birmingham),
            KnownLocation::Manchester => Arc::clone(&self.manchester),
        }
    }
}
