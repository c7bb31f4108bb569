//! Error type shared by the prayer timetable crates
//!
//! Collection failures have their own taxonomy in `ptt-collector`; this type
//! covers configuration, storage and the validation of locations, periods
//! and date ranges.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database folder creation or config file access
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad TOML or a secret that no layer provides
    #[error("Configuration error: {0}")]
    Config(String),

    /// Location name, code or id outside the fixed registry
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    /// Year or month that does not name a calendar month
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Date range whose start is after its end
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

impl Error {
    /// True for errors caused by caller input rather than the environment
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::UnknownLocation(_) | Error::InvalidPeriod(_) | Error::InvalidRange(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_invalid_input() {
        assert!(Error::UnknownLocation("leeds".into()).is_invalid_input());
        assert!(Error::InvalidPeriod("month 13".into()).is_invalid_input());
        assert!(Error::InvalidRange("2024-05-31 > 2024-05-01".into()).is_invalid_input());
        assert!(!Error::Config("missing key".into()).is_invalid_input());
    }
}
