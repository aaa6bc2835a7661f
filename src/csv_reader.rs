use anyhow::{Context, Result};
use std::io::{self, Read};

use crate::data::{Cell, Sheet};

/// Read a CSV document into a sheet. The first record is the header row; data rows may
/// have fewer or more fields than the header.
pub fn read_csv<R: Read>(reader: R, name: &str) -> Result<Sheet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        anyhow::bail!("CSV input has no header row");
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", i + 1))?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(Sheet::new(name, headers, rows))
}

pub fn read_csv_from_stdin() -> Result<Sheet> {
    read_csv(io::stdin().lock(), "stdin")
}
