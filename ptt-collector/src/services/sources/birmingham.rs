//! Birmingham publisher
//!
//! HTML timetable fetched by POSTing a form to the site's AJAX endpoint:
//! `action=prayer_timetable_month`, `month=<MM>`, `year=<YYYY>`.
//! Clock cells carry an explicit AM/PM; the date cell is an ordinal date.

use async_trait::async_trait;
use ptt_common::{KnownLocation, Period, PrayerTimeRecord};
use reqwest::Client;
use tracing::debug;

use super::{expect_html, success_body, RawPayload, SourceAdapter};
use crate::services::record_assembler::{assemble_rows, BIRMINGHAM_LAYOUT};
use crate::services::table_extractor::extract_rows;
use crate::services::CollectionError;

const FORM_ACTION: &str = "prayer_timetable_month";

pub struct BirminghamAdapter {
    client: Client,
    url: String,
}

impl BirminghamAdapter {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }

    /// Form body for one month
    pub fn form(period: Period) -> [(&'static str, String); 3] {
        [
            ("action", FORM_ACTION.to_string()),
            ("month", format!("{:02}", period.month())),
            ("year", period.year().to_string()),
        ]
    }
}

#[async_trait]
impl SourceAdapter for BirminghamAdapter {
    fn location(&self) -> KnownLocation {
        KnownLocation::Birmingham
    }

    async fn fetch(&self, period: Period) -> Result<RawPayload, CollectionError> {
        debug!(url = %self.url, %period, "Requesting Birmingham timetable");

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
        let rows = extract_rows(expect_html(payload, self.location())?)?;
        assemble_rows(&rows, &BIRMINGHAM_LAYOUT, self.location(), period)
    }
}
