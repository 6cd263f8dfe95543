//! Reading student rows from delimited text files.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::RawRow;

/// Read every record of a CSV stream as a [`RawRow`].
///
/// The first record is the header. Header labels are trimmed; records
/// shorter than the header simply lack the trailing cells.
pub fn read_rows_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("failed to read CSV header")?
        .clone();

    csv_reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            // +2: one for the header, one for 1-based numbering.
            let record = record.with_context(|| format!("failed to read CSV line {}", index + 2))?;
            Ok(RawRow::from_cells(headers.iter().zip(record.iter())))
        })
        .collect()
}

/// Read a CSV file of student rows.
pub fn read_rows(path: &Path, delimiter: u8) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open data file: {}", path.display()))?;
    read_rows_from_reader(file, delimiter)
        .with_context(|| format!("failed to parse CSV: {}", path.display()))
}

/// Recursively read all `.csv` files under a directory.
///
/// Files that fail to parse are logged and skipped.
pub fn load_directory(dir: &Path, delimiter: u8) -> Result<Vec<RawRow>> {
    let mut rows = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            rows.extend(load_directory(&path, delimiter)?);
        } else if path.extension().is_some_and(|ext| ext == "csv") {
            match read_rows(&path, delimiter) {
                Ok(file_rows) => rows.extend(file_rows),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(rows)
}
