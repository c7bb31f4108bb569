//! Mapping of extracted rows onto [`PrayerTimeRecord`]
//!
//! HTML sources are mapped through a fixed per-source [`ColumnLayout`]
//! (column index → field). A layout change upstream is a one-line edit to
//! the table below. The JSON source maps named keys one-to-one through
//! [`assemble_named_day`].
//!
//! Every record is stamped with the adapter's location id. A row is only
//! turned into a record when the date and every required clock field
//! normalize to a value; otherwise the run fails with `MarkupShape`.

use ptt_common::{KnownLocation, Period, PrayerTimeRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use super::date_normalizer::{normalize_date, normalize_date_anchored};
use super::time_normalizer::{
    normalize_24h_time, normalize_meridiem_time, normalize_positional_time, Meridiem,
};
use super::CollectionError;

/// Canonical record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Fajr,
    FajrJamat,
    Sunrise,
    Dhuhr,
    DhuhrJamat,
    Asr,
    Asr2,
    AsrJamat,
    Maghrib,
    MaghribJamat,
    Isha,
    IshaJamat,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Fajr => "fajr",
            Field::FajrJamat => "fajrJamat",
            Field::Sunrise => "sunrise",
            Field::Dhuhr => "dhuhr",
            Field::DhuhrJamat => "dhuhrJamat",
            Field::Asr => "asr",
            Field::Asr2 => "asr2",
            Field::AsrJamat => "asrJamat",
            Field::Maghrib => "maghrib",
            Field::MaghribJamat => "maghribJamat",
            Field::Isha => "isha",
            Field::IshaJamat => "ishaJamat",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How clock cells are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEncoding {
    /// "6:15AM"
    ExplicitMeridiem,
    /// "6.15", with AM/PM decided by column: listed columns are AM, all others PM
    PositionalMeridiem { am_columns: &'static [usize] },
}

impl ClockEncoding {
    fn normalize(&self, cell: &str, column: usize) -> String {
        match self {
            ClockEncoding::ExplicitMeridiem => normalize_meridiem_time(cell),
            ClockEncoding::PositionalMeridiem { am_columns } => {
                normalize_positional_time(cell, meridiem_for_column(am_columns, column))
            }
        }
    }
}

/// Meridiem of a positional-meridiem column
///
/// Fragile by nature: a column reordering upstream silently shifts AM/PM.
pub fn meridiem_for_column(am_columns: &[usize], column: usize) -> Meridiem {
    if am_columns.contains(&column) {
        Meridiem::Am
    } else {
        Meridiem::Pm
    }
}

/// How the date cell is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    /// Full date text, e.g. "1st May 2024"
    FullDate,
    /// Day of month only; month and year come from the requested period and
    /// the date is normalized with the 14:00 anchor
    DayOfMonth,
}

impl DateCell {
    fn normalize(&self, cell: &str, period: Period) -> String {
        match self {
            DateCell::FullDate => normalize_date(cell),
            DateCell::DayOfMonth => normalize_date_anchored(&format!(
                "{} {} {}",
                cell,
                period.month_name(),
                period.year()
            )),
        }
    }
}

/// Fixed column table for one HTML source
#[derive(Debug, Clone, Copy)]
pub struct ColumnLayout {
    /// (column index, field); one column may feed several fields
    pub columns: &'static [(usize, Field)],
    pub clock: ClockEncoding,
    pub date: DateCell,
}

impl ColumnLayout {
    /// Cells a row needs for every mapped column to exist
    pub fn min_cells(&self) -> usize {
        self.columns.iter().map(|(index, _)| index + 1).max().unwrap_or(0)
    }
}

/// Birmingham: explicit-meridiem cells, full ordinal date
pub const BIRMINGHAM_LAYOUT: ColumnLayout = ColumnLayout {
    columns: &[
        (0, Field::Date),
        (2, Field::Fajr),
        (3, Field::FajrJamat),
        (4, Field::Sunrise),
        (6, Field::Dhuhr),
        (7, Field::DhuhrJamat),
        (8, Field::Asr),
        (8, Field::Asr2),
        (9, Field::Maghrib),
        (10, Field::AsrJamat),
        (11, Field::MaghribJamat),
        (12, Field::Isha),
        (13, Field::IshaJamat),
    ],
    clock: ClockEncoding::ExplicitMeridiem,
    date: DateCell::FullDate,
};

/// Manchester: positional-meridiem cells (columns 2-4 AM), day-of-month date
pub const MANCHESTER_LAYOUT: ColumnLayout = ColumnLayout {
    columns: &[
        (0, Field::Date),
        (2, Field::Fajr),
        (3, Field::FajrJamat),
        (4, Field::Sunrise),
        (6, Field::Dhuhr),
        (7, Field::DhuhrJamat),
        (8, Field::Asr),
        (8, Field::Asr2),
        (9, Field::AsrJamat),
        (10, Field::Maghrib),
        (11, Field::MaghribJamat),
        (12, Field::Isha),
        (13, Field::IshaJamat),
    ],
    clock: ClockEncoding::PositionalMeridiem {
        am_columns: &[2, 3, 4],
    },
    date: DateCell::DayOfMonth,
};

/// Assemble one HTML row
pub fn assemble_row(
    row: &[String],
    layout: &ColumnLayout,
    location: KnownLocation,
    period: Period,
) -> Result<PrayerTimeRecord, CollectionError> {
    if row.len() < layout.min_cells() {
        return Err(CollectionError::MarkupShape(format!(
            "{} row has {} cells, expected at least {}",
            location,
            row.len(),
            layout.min_cells()
        )));
    }

    let mut values = HashMap::new();
    for &(column, field) in layout.columns {
        let cell = &row[column];
        let value = match field {
            Field::Date => layout.date.normalize(cell, period),
            _ => layout.clock.normalize(cell, column),
        };
        if !value.is_empty() {
            values.insert(field, value);
        }
    }

    build_record(location, values)
}

/// Assemble every row of a table, failing on the first bad row
pub fn assemble_rows(
    rows: &[Vec<String>],
    layout: &ColumnLayout,
    location: KnownLocation,
    period: Period,
) -> Result<Vec<PrayerTimeRecord>, CollectionError> {
    rows.iter()
        .map(|row| assemble_row(row, layout, location, period))
        .collect()
}

/// One day as published by the JSON source (upstream key naming)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedDay {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub fajr: Option<String>,
    #[serde(default)]
    pub fajr_jamat: Option<String>,
    #[serde(default)]
    pub sunrise: Option<String>,
    #[serde(default)]
    pub dhuhr: Option<String>,
    #[serde(default)]
    pub dhuhr_jamat: Option<String>,
    #[serde(default)]
    pub asr: Option<String>,
    #[serde(default)]
    pub asr_2: Option<String>,
    #[serde(default)]
    pub asr_jamat: Option<String>,
    #[serde(default)]
    pub magrib: Option<String>,
    #[serde(default)]
    pub magrib_jamat: Option<String>,
    #[serde(default)]
    pub isha: Option<String>,
    #[serde(default)]
    pub isha_jamat: Option<String>,
}

/// Assemble one day of the JSON source (24-hour clock values)
pub fn assemble_named_day(
    day: &NamedDay,
    location: KnownLocation,
) -> Result<PrayerTimeRecord, CollectionError> {
    let clock_fields = [
        (Field::Fajr, &day.fajr),
        (Field::FajrJamat, &day.fajr_jamat),
        (Field::Sunrise, &day.sunrise),
        (Field::Dhuhr, &day.dhuhr),
        (Field::DhuhrJamat, &day.dhuhr_jamat),
        (Field::Asr, &day.asr),
        (Field::Asr2, &day.asr_2),
        (Field::AsrJamat, &day.asr_jamat),
        (Field::Maghrib, &day.magrib),
        (Field::MaghribJamat, &day.magrib_jamat),
        (Field::Isha, &day.isha),
        (Field::IshaJamat, &day.isha_jamat),
    ];

    let mut values = HashMap::new();
    if let Some(date) = day.date.as_deref() {
        values.insert(Field::Date, normalize_date(date));
    }
    for (field, raw) in clock_fields {
        if let Some(raw) = raw.as_deref() {
            values.insert(field, normalize_24h_time(raw));
        }
    }
    values.retain(|_, value| !value.is_empty());

    // A single published Asr time fills both Asr fields
    if !values.contains_key(&Field::Asr2) {
        if let Some(asr) = values.get(&Field::Asr).cloned() {
            values.insert(Field::Asr2, asr);
        }
    }

    build_record(location, values)
}

fn build_record(
    location: KnownLocation,
    mut values: HashMap<Field, String>,
) -> Result<PrayerTimeRecord, CollectionError> {
    let mut required = |field: Field| {
        values.remove(&field).ok_or_else(|| {
            CollectionError::MarkupShape(format!("{} row is missing {}", location, field))
        })
    };

    let date = required(Field::Date)?;
    let fajr = required(Field::Fajr)?;
    let dhuhr = required(Field::Dhuhr)?;
    let asr = required(Field::Asr)?;
    let asr2 = required(Field::Asr2)?;
    let maghrib = required(Field::Maghrib)?;
    let isha = required(Field::Isha)?;

    Ok(PrayerTimeRecord {
        location_id: location.id(),
        date,
        fajr,
        fajr_jamat: values.remove(&Field::FajrJamat),
        sunrise: values.remove(&Field::Sunrise),
        dhuhr,
        dhuhr_jamat: values.remove(&Field::DhuhrJamat),
        asr,
        asr2,
        asr_jamat: values.remove(&Field::AsrJamat),
        maghrib,
        maghrib_jamat: values.remove(&Field::MaghribJamat),
        isha,
        isha_jamat: values.remove(&Field::IshaJamat),
    })
}
