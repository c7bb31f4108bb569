//! Canonical prayer-time model
//!
//! Every source, whatever its native encoding, is normalized into
//! [`PrayerTimeRecord`]: ISO `YYYY-MM-DD` date, zero-padded 24-hour `HH:MM`
//! clock fields, wall-clock local time with no timezone component.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Location row (reference data, created at database initialization)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Location {
    pub id: i64,
    pub name: String,
    /// Short code, e.g. `LDN`, `BIRM`, `MANC`
    pub code: String,
    pub description: Option<String>,
}

/// The fixed set of collected locations and their numeric identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownLocation {
    London,
    Birmingham,
    Manchester,
}

impl KnownLocation {
    pub const ALL: [KnownLocation; 3] = [
        KnownLocation::London,
        KnownLocation::Birmingham,
        KnownLocation::Manchester,
    ];

    /// Numeric location id stamped onto every record
    pub fn id(&self) -> i64 {
        match self {
            KnownLocation::London => 1,
            KnownLocation::Birmingham => 2,
            KnownLocation::Manchester => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KnownLocation::London => "London",
            KnownLocation::Birmingham => "Birmingham",
            KnownLocation::Manchester => "Manchester",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            KnownLocation::London => "LDN",
            KnownLocation::Birmingham => "BIRM",
            KnownLocation::Manchester => "MANC",
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|location| location.id() == id)
    }
}

impl fmt::Display for KnownLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KnownLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "london" | "ldn" => Ok(KnownLocation::London),
            "birmingham" | "birm" => Ok(KnownLocation::Birmingham),
            "manchester" | "manc" => Ok(KnownLocation::Manchester),
            other => Err(Error::UnknownLocation(other.to_string())),
        }
    }
}

/// One day of prayer times for one location
///
/// Required clock fields are always populated; sunrise and the Jamat
/// (congregational) times are absent when the source leaves them blank.
/// When a source publishes a single Asr time, `asr2` repeats it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerTimeRecord {
    pub location_id: i64,
    pub date: String,
    pub fajr: String,
    pub fajr_jamat: Option<String>,
    pub sunrise: Option<String>,
    pub dhuhr: String,
    pub dhuhr_jamat: Option<String>,
    pub asr: String,
    pub asr2: String,
    pub asr_jamat: Option<String>,
    pub maghrib: String,
    pub maghrib_jamat: Option<String>,
    pub isha: String,
    pub isha_jamat: Option<String>,
}

/// A persisted record with its row id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPrayerTime {
    pub id: i64,
    #[serde(flatten)]
    pub record: PrayerTimeRecord,
}
