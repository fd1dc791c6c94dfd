//! Day page extraction: one HTML table → one [`RawRecord`].
//!
//! Each day page carries a single data table. Every data row holds a KPI
//! label (text up to the first digit, since some labels embed their
//! value inline) and a highlighted value cell. Label and value are
//! paired within the same row of a single traversal, so a markup change
//! on the source site produces missing fields rather than silently
//! misaligned ones.

use std::sync::LazyLock;

use meteo_harvest_models::RawRecord;
use scraper::{Html, Selector};

use crate::slug::slugify;

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));

/// The highlighted cell holding a row's measurement value.
static VALUE_CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.text-center.bg-primary").expect("valid selector"));

/// Errors while extracting a day record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The expected table structure was absent — the source changed
    /// shape or returned an unexpected page.
    #[error("malformed page: {0}")]
    MalformedPage(String),
}

/// Splits `s` at the first ASCII digit, returning (prefix, rest).
///
/// Labels sometimes embed their value inline ("Température maximale
/// 31°"); everything from the first digit on is discarded when the
/// prefix is used as a field name.
#[must_use]
pub fn split_on_first_digit(s: &str) -> (&str, &str) {
    s.find(|c: char| c.is_ascii_digit())
        .map_or((s, ""), |i| s.split_at(i))
}

/// Extracts the KPI fields of one day page and tags them with `date`
/// (`YYYY/MM/DD`).
///
/// Rows without a highlighted value cell — the header row and the
/// trailing non-data row — contribute nothing.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedPage`] if the page has no table or
/// the table yields no KPI fields.
pub fn extract_day(html: &str, date: &str) -> Result<RawRecord, ExtractError> {
    let document = Html::parse_document(html);

    let table = document
        .select(&TABLE_SEL)
        .next()
        .ok_or_else(|| ExtractError::MalformedPage("no table element".to_owned()))?;

    let mut record = RawRecord::default();
    // Skip the header row; pair each remaining label with the value
    // cell of the same row.
    for row in table.select(&ROW_SEL).skip(1) {
        let Some(cell) = row.select(&VALUE_CELL_SEL).next() else {
            continue;
        };
        let label_text = row.text().collect::<String>();
        let (label, _) = split_on_first_digit(label_text.trim());
        let key = slugify(label);
        if key.is_empty() {
            continue;
        }
        let value = cell.text().collect::<String>().trim().to_owned();
        record.insert(key, value);
    }

    if record.fields.is_empty() {
        return Err(ExtractError::MalformedPage(
            "table contains no KPI rows".to_owned(),
        ));
    }

    record.set_date(date.to_owned());
    Ok(record)
}
