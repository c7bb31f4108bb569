//! Date string normalization to ISO `YYYY-MM-DD`
//!
//! English ordinal suffixes are stripped from numerals ("23rd" → "23") and
//! the cleaned text is tried against the English date grammars the sources
//! publish. Unparseable input yields an empty string.

use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("ordinal pattern"));

/// Accepted date grammars, tried in order
///
/// chrono accepts full or abbreviated month and weekday names for both
/// `%B`/`%b` and `%A`/`%a`.
const DATE_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%A %d %B %Y",
    "%B %d %Y",
    "%A %B %d %Y",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
];

/// Wall-clock hour appended by [`normalize_date_anchored`]
///
/// Mid-afternoon keeps the calendar date stable across the UTC conversion,
/// including on daylight-saving changeover days.
pub const ANCHOR_TIME: (u32, u32, u32) = (14, 0, 0);

/// Remove English ordinal suffixes from day numerals
pub fn strip_ordinals(raw: &str) -> String {
    ORDINAL_SUFFIX.replace_all(raw, "$1").into_owned()
}

/// Parse a source date into a calendar date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let stripped = strip_ordinals(raw).replace(',', " ");
    let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

/// Normalize a source date ("1st January 2024" → "2024-01-01")
pub fn normalize_date(raw: &str) -> String {
    parse_date(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Normalize a source date anchored at 14:00 local time
///
/// The date is combined with [`ANCHOR_TIME`] in the local zone and converted
/// to UTC before the calendar date is taken, so a midnight-anchored parse
/// cannot roll back a day across a daylight-saving transition.
pub fn normalize_date_anchored(raw: &str) -> String {
    parse_date(raw)
        .and_then(anchor_to_utc_date)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn anchor_to_utc_date(date: NaiveDate) -> Option<NaiveDate> {
    let (hour, minute, second) = ANCHOR_TIME;
    let anchored = date.and_time(NaiveTime::from_hms_opt(hour, minute, second)?);
    let local = Local.from_local_datetime(&anchored).earliest()?;
    Some(local.with_timezone(&Utc).date_naive())
}
