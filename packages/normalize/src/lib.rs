#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalization of raw harvested weather records into a typed table.
//!
//! Takes the scheduler's raw string records, strips per-column unit
//! text, casts to `f64`, parses the date tag, and drops incomplete rows
//! and exact duplicates. Rows are dropped, never repaired or imputed;
//! every drop is counted in the [`NormalizeReport`] so a smaller table
//! than expected is always explainable.

pub mod schema;

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use meteo_harvest_models::{DATE_FIELD, RawRecord};
use serde::{Deserialize, Serialize};

pub use schema::{ColumnSpec, Schema};

/// Format of the raw record date tag.
const DATE_FORMAT: &str = "%Y/%m/%d";

/// One normalized row: a date plus the required numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedRecord {
    /// The observation date.
    pub date: NaiveDate,
    /// Column name → numeric value. Holds every schema column.
    pub values: BTreeMap<String, f64>,
}

/// The typed output table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Output column names: [`DATE_FIELD`] first, then the schema
    /// columns in schema order.
    pub columns: Vec<String>,
    /// Retained rows. Every row has a value for every numeric column
    /// and no exact duplicate exists.
    pub rows: Vec<TypedRecord>,
}

impl Table {
    /// Number of retained rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What normalization kept and why it dropped the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Raw rows received.
    pub input_rows: usize,
    /// Rows retained in the output table.
    pub kept: usize,
    /// Rows dropped because a required column was absent.
    pub dropped_missing: usize,
    /// Rows dropped because a value failed to parse after unit strip.
    pub dropped_cast: usize,
    /// Rows dropped as exact duplicates of an earlier row.
    pub dropped_duplicate: usize,
}

impl std::fmt::Display for NormalizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} rows kept ({} missing, {} unparseable, {} duplicate)",
            self.kept, self.input_rows, self.dropped_missing, self.dropped_cast,
            self.dropped_duplicate
        )
    }
}

/// Normalizes raw records into a typed table under `schema`.
///
/// Per row, every schema column must be present and must parse to `f64`
/// after its unit text is removed; the date tag must parse as
/// `YYYY/MM/DD`. Failing rows are dropped and counted — a cast failure
/// never aborts normalization of the remaining rows. Fields listed in
/// `schema.drop_fields` (and any field outside the schema) are excluded
/// from the output. Values that already carry no unit pass through
/// unchanged, so normalizing clean input is a no-op.
#[must_use]
pub fn normalize(rows: &[RawRecord], schema: &Schema) -> (Table, NormalizeReport) {
    let mut report = NormalizeReport {
        input_rows: rows.len(),
        ..NormalizeReport::default()
    };

    // Dropped fields win over the column list, so a field can be
    // retired from the output without rebuilding the whole schema.
    let columns: Vec<&ColumnSpec> = schema
        .columns
        .iter()
        .filter(|c| !schema.drop_fields.contains(&c.name))
        .collect();

    let mut seen: HashSet<(NaiveDate, Vec<u64>)> = HashSet::new();
    let mut out = Table {
        columns: std::iter::once(DATE_FIELD.to_owned())
            .chain(columns.iter().map(|c| c.name.clone()))
            .collect(),
        rows: Vec::with_capacity(rows.len()),
    };

    'rows: for row in rows {
        let Some(raw_date) = row.get(DATE_FIELD) else {
            log::debug!("dropping row without a {DATE_FIELD} field");
            report.dropped_missing += 1;
            continue;
        };
        let date = match NaiveDate::parse_from_str(raw_date, DATE_FORMAT) {
            Ok(date) => date,
            Err(e) => {
                log::warn!("dropping row with unparseable date '{raw_date}': {e}");
                report.dropped_cast += 1;
                continue;
            }
        };

        let mut values = BTreeMap::new();
        for column in &columns {
            let Some(raw) = row.get(&column.name) else {
                log::debug!("{raw_date}: dropping row missing '{}'", column.name);
                report.dropped_missing += 1;
                continue 'rows;
            };
            match cast_value(raw, column.unit.as_deref()) {
                Some(value) => {
                    values.insert(column.name.clone(), value);
                }
                None => {
                    log::warn!(
                        "{raw_date}: dropping row, '{}' value '{raw}' is not numeric",
                        column.name
                    );
                    report.dropped_cast += 1;
                    continue 'rows;
                }
            }
        }

        let key = (
            date,
            values.values().map(|v| v.to_bits()).collect::<Vec<u64>>(),
        );
        if !seen.insert(key) {
            report.dropped_duplicate += 1;
            continue;
        }

        out.rows.push(TypedRecord { date, values });
    }

    report.kept = out.rows.len();
    log::info!("normalization: {report}");
    (out, report)
}

/// Strips the unit text and parses the remainder as `f64`.
fn cast_value(raw: &str, unit: Option<&str>) -> Option<f64> {
    let stripped = unit.map_or_else(|| raw.to_owned(), |u| raw.replace(u, ""));
    stripped.trim().parse::<f64>().ok()
}
