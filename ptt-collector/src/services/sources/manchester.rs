//! Manchester publisher
//!
//! HTML timetable fetched by POSTing the site's month picker form:
//! `timetable_month=<Month name>`, `timetable_year=<YYYY>`, `submit=Show`.
//! The table body mixes header rows in with the days, so only rows starting
//! with a day number are kept. Clock cells have no AM/PM marker.

use async_trait::async_trait;
use ptt_common::{KnownLocation, Period, PrayerTimeRecord};
use reqwest::Client;
use tracing::debug;

use super::{expect_html, success_body, RawPayload, SourceAdapter};
use crate::services::record_assembler::{assemble_rows, MANCHESTER_LAYOUT};
use crate::services::table_extractor::extract_numbered_rows;
use crate::services::CollectionError;

pub struct ManchesterAdapter {
    client: Client,
    url: String,
}

impl ManchesterAdapter {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }

    /// Form body for one month
    pub fn form(period: Period) -> [(&'static str, String); 3] {
        [
            ("timetable_month", period.month_name().to_string()),
            ("timetable_year", period.year().to_string()),
            ("submit", "Show".to_string()),
        ]
    }
}

#[async_trait]
impl SourceAdapter for ManchesterAdapter {
    fn location(&self) -> KnownLocation {
        KnownLocation::Manchester
    }

    async fn fetch(&self, period: Period) -> Result<RawPayload, CollectionError> {
        debug!(url = %self.url, %period, "Requesting Manchester timetable");

        let response = self
            .client
            .post(&self.url)
            .form(&Self::form(period))
            .send()
            .await?;

        Ok(RawPayload::Html(success_body(response).await?))
    }

    fn parse(
        &self,
        payload: &RawPayload,
        period: Period,
    ) -> Result<Vec<PrayerTimeRecord>, CollectionError> {
        let rows = extract_numbered_rows(expect_html(payload, self.location())?)?;
        assemble_rows(&rows, &MANCHESTER_LAYOUT, self.location(), period)
    }
}
