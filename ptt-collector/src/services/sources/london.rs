//! London publisher
//!
//! JSON API fetched with GET:
//! `?format=json&key=<api key>&year=<YYYY>&month=<lowercase month name>&24hours=true`.
//! The API key is looked up through the secrets provider on every fetch.

use async_trait::async_trait;
use ptt_common::{KnownLocation, Period, PrayerTimeRecord};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::{success_body, RawPayload, SourceAdapter};
use crate::config::SecretsProvider;
use crate::services::record_assembler::{assemble_named_day, NamedDay};
use crate::services::CollectionError;

/// Secret holding the London API key
pub const API_KEY_SECRET: &str = "LONDON_PRAYER_TIMES_API";

/// Month response; `times` is keyed by ISO date
#[derive(Debug, Deserialize)]
pub struct LondonTimetable {
    #[serde(default)]
    pub city: Option<String>,
    pub times: BTreeMap<String, NamedDay>,
}

pub struct LondonAdapter {
    client: Client,
    url: String,
    secrets: Arc<dyn SecretsProvider>,
}

impl LondonAdapter {
    pub fn new(client: Client, url: String, secrets: Arc<dyn SecretsProvider>) -> Self {
        Self {
            client,
            url,
            secrets,
        }
    }

    /// Query parameters for one month (month as lowercase English name)
    pub fn query(period: Period, api_key: &str) -> [(&'static str, String); 5] {
        [
            ("format", "json".to_string()),
            ("key", api_key.to_string()),
            ("year", period.year().to_string()),
            ("month", period.month_name().to_lowercase()),
            ("24hours", "true".to_string()),
        ]
    }
}

#[async_trait]
impl SourceAdapter for LondonAdapter {
    fn location(&self) -> KnownLocation {
        KnownLocation::London
    }

    async fn fetch(&self, period: Period) -> Result<RawPayload, CollectionError> {
        let api_key = self
            .secrets
            .get(API_KEY_SECRET)
            .await
            .map_err(|e| CollectionError::Unknown(e.to_string()))?;

        debug!(url = %self.url, %period, "Requesting London timetable");

        let response = self
            .client
            .get(&self.url)
            .query(&Self::query(period, &api_key))
            .send()
            .await?;

        Ok(RawPayload::Json(success_body(response).await?))
    }

    fn parse(
        &self,
        payload: &RawPayload,
        _period: Period,
    ) -> Result<Vec<PrayerTimeRecord>, CollectionError> {
        let RawPayload::Json(text) = payload else {
            return Err(CollectionError::Unknown(format!(
                "{} adapter expects a JSON payload, got {}",
                self.location(),
                payload.kind()
            )));
        };

        let timetable: LondonTimetable = serde_json::from_str(text)?;
        timetable
            .times
            .values()
            .map(|day| assemble_named_day(day, self.location()))
            .collect()
    }
}
