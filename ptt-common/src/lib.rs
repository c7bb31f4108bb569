//! # Prayer Timetable Common Library
//!
//! Shared code for the prayer timetable services:
//! - Canonical prayer-time model and fixed location registry
//! - Calendar period helpers (month periods, date ranges)
//! - TOML bootstrap configuration and root folder resolution
//! - Database initialization

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{KnownLocation, Location, PrayerTimeRecord, StoredPrayerTime};
pub use time::{DateRange, Period};
