//! Calendar period utilities
//!
//! Sources publish one timetable per calendar month. `Period` is the
//! (year, month) pair every adapter receives; each adapter formats it the way
//! its upstream expects (month number, month name, lowercase name).

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// One calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period, rejecting months outside 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidPeriod(format!("month {} out of range", month)));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(Error::InvalidPeriod(format!("year {} out of range", year)));
        }
        Ok(Self { year, month })
    }

    /// Parse a period from path segments, accepting a month number or English name
    pub fn parse(year: i32, month: &str) -> Result<Self> {
        Self::new(year, parse_month(month)?)
    }

    /// The period containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The period containing [`today`]
    pub fn current() -> Self {
        Self::containing(today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Capitalized English month name ("May")
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month
    pub fn last_day(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Inclusive date range covering the whole month
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }
}

/// Today's UTC date
///
/// The single clock for "current month": HTTP handlers, the CLI and the
/// scheduler all resolve the month from it.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parse a month given as a number ("5", "05") or English name ("may", "Sep")
pub fn parse_month(month: &str) -> Result<u32> {
    let trimmed = month.trim();
    if let Ok(number) = trimmed.parse::<u32>() {
        return if (1..=12).contains(&number) {
            Ok(number)
        } else {
            Err(Error::InvalidPeriod(format!("month {} out of range", number)))
        };
    }

    let lower = trimmed.to_lowercase();
    if lower.len() >= 3 {
        for (index, name) in MONTH_NAMES.iter().enumerate() {
            if name.to_lowercase().starts_with(&lower) {
                return Ok(index as u32 + 1);
            }
        }
    }

    Err(Error::InvalidPeriod(format!("unknown month {}", month)))
}
