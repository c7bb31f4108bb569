//! Clock string normalization to zero-padded 24-hour `HH:MM`
//!
//! Sources publish three encodings:
//! - explicit meridiem (`"6:15AM"`, `"12:30 PM"`)
//! - positional meridiem (`"6.15"`, `"1.45"`), where AM/PM comes from the
//!   cell's column, never from its text
//! - 24-hour (`"5:03"`, `"17:45"`)
//!
//! Unparseable input yields an empty string; callers decide whether an empty
//! value is acceptable for the field.

use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

static MERIDIEM_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?(AM|PM)$").expect("meridiem time pattern")
});

static POSITIONAL_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?:[.:](\d{2}))?$").expect("positional time pattern"));

static TWENTY_FOUR_HOUR_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[:.](\d{2})(?::\d{2})?$").expect("24-hour time pattern")
});

/// Half of the 12-hour clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// 12-hour clock hour (1..=12) to 24-hour clock hour
    pub fn to_24_hour(self, hour: u32) -> u32 {
        match (self, hour) {
            (Meridiem::Pm, h) if h != 12 => h + 12,
            (Meridiem::Am, 12) => 0,
            (_, h) => h,
        }
    }
}

impl FromStr for Meridiem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AM" => Ok(Meridiem::Am),
            "PM" => Ok(Meridiem::Pm),
            other => Err(format!("Not a meridiem: {}", other)),
        }
    }
}

/// Normalize an explicit-meridiem clock string ("1:05PM" → "13:05")
///
/// Whitespace is removed and case folded before matching; a missing minute
/// part means `:00`. Returns `""` for empty or malformed input.
pub fn normalize_meridiem_time(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    parse_meridiem_time(&cleaned).unwrap_or_default()
}

fn parse_meridiem_time(cleaned: &str) -> Option<String> {
    let caps = MERIDIEM_TIME.captures(cleaned)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem: Meridiem = caps[3].parse().ok()?;

    format_12_hour(hour, minute, meridiem)
}

/// Normalize a positional-meridiem clock string ("1.45" + PM → "13:45")
///
/// `meridiem` is supplied by the caller from the column the cell came from.
pub fn normalize_positional_time(raw: &str, meridiem: Meridiem) -> String {
    let cleaned = raw.trim();
    let Some(caps) = POSITIONAL_TIME.captures(cleaned) else {
        return String::new();
    };

    let hour = caps[1].parse::<u32>().ok();
    let minute = match caps.get(2) {
        Some(m) => m.as_str().parse::<u32>().ok(),
        None => Some(0),
    };

    match (hour, minute) {
        (Some(hour), Some(minute)) => format_12_hour(hour, minute, meridiem).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Re-pad a 24-hour clock string ("5:03" → "05:03", "17:45:00" → "17:45")
pub fn normalize_24h_time(raw: &str) -> String {
    let Some(caps) = TWENTY_FOUR_HOUR_TIME.captures(raw.trim()) else {
        return String::new();
    };

    match (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
        (Ok(hour), Ok(minute)) if hour < 24 && minute < 60 => format!("{:02}:{:02}", hour, minute),
        _ => String::new(),
    }
}

fn format_12_hour(hour: u32, minute: u32, meridiem: Meridiem) -> Option<String> {
    if !(1..=12).contains(&hour) || minute >= 60 {
        return None;
    }
    Some(format!("{:02}:{:02}", meridiem.to_24_hour(hour), minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meridiem_midnight_and_noon() {
        assert_eq!(normalize_meridiem_time("12:00AM"), "00:00");
        assert_eq!(normalize_meridiem_time("12:00PM"), "12:00");
    }

    #[test]
    fn test_meridiem_afternoon_adds_twelve() {
        assert_eq!(normalize_meridiem_time("1:05PM"), "13:05");
        assert_eq!(normalize_meridiem_time("9:00PM"), "21:00");
        assert_eq!(normalize_meridiem_time("11:59PM"), "23:59");
    }

    #[test]
    fn test_meridiem_morning_is_zero_padded() {
        assert_eq!(normalize_meridiem_time("6:15AM"), "06:15");
        assert_eq!(normalize_meridiem_time("11:30AM"), "11:30");
    }

    #[test]
    fn test_meridiem_tolerates_spacing_and_case() {
        assert_eq!(normalize_meridiem_time("12:30 PM"), "12:30");
        assert_eq!(normalize_meridiem_time(" 7:02 am "), "07:02");
        assert_eq!(normalize_meridiem_time("7 : 02\u{a0}AM"), "07:02");
    }

    #[test]
    fn test_meridiem_minute_defaults_to_zero() {
        assert_eq!(normalize_meridiem_time("6AM"), "06:00");
        assert_eq!(normalize_meridiem_time("1 PM"), "13:00");
    }

    #[test]
    fn test_meridiem_empty_or_malformed_is_empty() {
        assert_eq!(normalize_meridiem_time(""), "");
        assert_eq!(normalize_meridiem_time("-"), "");
        assert_eq!(normalize_meridiem_time("13:00PM"), "");
        assert_eq!(normalize_meridiem_time("6:75AM"), "");
        assert_eq!(normalize_meridiem_time("6:15"), "");
    }

    #[test]
    fn test_positional_uses_supplied_meridiem() {
        assert_eq!(normalize_positional_time("6.15", Meridiem::Am), "06:15");
        assert_eq!(normalize_positional_time("1.45", Meridiem::Pm), "13:45");
        assert_eq!(normalize_positional_time("12.10", Meridiem::Pm), "12:10");
        assert_eq!(normalize_positional_time("12.10", Meridiem::Am), "00:10");
    }

    #[test]
    fn test_positional_accepts_colon_and_bare_hour() {
        assert_eq!(normalize_positional_time("8:05", Meridiem::Pm), "20:05");
        assert_eq!(normalize_positional_time("5", Meridiem::Am), "05:00");
    }

    #[test]
    fn test_positional_malformed_is_empty() {
        assert_eq!(normalize_positional_time("", Meridiem::Am), "");
        assert_eq!(normalize_positional_time("-", Meridiem::Pm), "");
        assert_eq!(normalize_positional_time("6.1a", Meridiem::Am), "");
        assert_eq!(normalize_positional_time("0.30", Meridiem::Am), "");
    }

    #[test]
    fn test_24_hour_repadding() {
        assert_eq!(normalize_24h_time("5:03"), "05:03");
        assert_eq!(normalize_24h_time("17:45"), "17:45");
        assert_eq!(normalize_24h_time("17:45:00"), "17:45");
        assert_eq!(normalize_24h_time("24:00"), "");
        assert_eq!(normalize_24h_time(""), "");
    }

    #[test]
    fn test_meridiem_parse() {
        assert_eq!("pm".parse::<Meridiem>().unwrap(), Meridiem::Pm);
        assert_eq!(" AM ".parse::<Meridiem>().unwrap(), Meridiem::Am);
        assert!("noon".parse::<Meridiem>().is_err());
    }
}
