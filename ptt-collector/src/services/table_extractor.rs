//! HTML timetable extraction
//!
//! Locates the first table body in a payload and returns its rows as
//! ordered, de-tagged, whitespace-trimmed cell strings (entities decoded).
//!
//! Extraction is strict: a missing table body, a body with no rows, or any
//! row without cells fails the whole payload. Skipping a malformed row would
//! shift the positional column mapping for every row after it.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::CollectionError;

static TBODY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<tbody[\s>]").expect("tbody marker pattern"));

/// Rows of cell text
pub type Rows = Vec<Vec<String>>;

/// Extract every row of the first `<tbody>` in `html`
pub fn extract_rows(html: &str) -> Result<Rows, CollectionError> {
    // The HTML parser inserts an implicit tbody into bare tables, so the
    // marker has to be checked on the raw text.
    if !TBODY_MARKER.is_match(html) {
        return Err(CollectionError::MarkupShape(
            "no table body in payload".to_string(),
        ));
    }

    let document = Html::parse_document(html);
    let tbody_selector = parse_selector("tbody")?;
    let tbody = document.select(&tbody_selector).next().ok_or_else(|| {
        CollectionError::MarkupShape("no table body in payload".to_string())
    })?;

    let rows: Vec<ElementRef> = child_elements(tbody, &["tr"]).collect();
    if rows.is_empty() {
        return Err(CollectionError::MarkupShape(
            "table body has no rows".to_string(),
        ));
    }

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let cells: Vec<String> = child_elements(row, &["td", "th"]).map(cell_text).collect();
            if cells.is_empty() {
                Err(CollectionError::MarkupShape(format!(
                    "row {} has no cells",
                    index + 1
                )))
            } else {
                Ok(cells)
            }
        })
        .collect()
}

/// Extract rows whose first cell is a positive integer (day of month)
///
/// Used where header and decoration rows are mixed into the table body.
pub fn extract_numbered_rows(html: &str) -> Result<Rows, CollectionError> {
    Ok(extract_rows(html)?
        .into_iter()
        .filter(|row| is_day_number(row.first().map(String::as_str).unwrap_or_default()))
        .collect())
}

fn is_day_number(cell: &str) -> bool {
    cell.parse::<u32>().map(|n| n > 0).unwrap_or(false)
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |element| names.contains(&element.value().name()))
}

/// Text of a cell with its tags removed and whitespace runs collapsed
///
/// Text nodes are joined as-is, so inline markup such as `1<sup>st</sup>`
/// reads `1st`.
fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selector(selector: &str) -> Result<Selector, CollectionError> {
    Selector::parse(selector).map_err(|e| {
        CollectionError::Unknown(format!("invalid CSS selector '{}': {}", selector, e))
    })
}
