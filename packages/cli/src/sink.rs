//! CSV sink for the normalized table.
//!
//! Persistence is deliberately outside the pipeline core; this is the
//! thin external collaborator the typed table is handed to.

use std::path::Path;

use meteo_normalize::Table;

/// Errors while writing the output file.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the underlying file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the table to `path` as CSV: a header row of column names,
/// then one record per row with the date in ISO format.
///
/// # Errors
///
/// Returns [`SinkError`] if the file cannot be written.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(table.columns.len());
        record.push(row.date.format("%Y-%m-%d").to_string());
        for column in &table.columns[1..] {
            record.push(
                row.values
                    .get(column)
                    .copied()
                    .map_or_else(String::new, |v| v.to_string()),
            );
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
