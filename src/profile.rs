//! Column profiling.
//!
//! Every column of a sheet is scanned once and classified by a majority vote over its
//! non-empty cells. The resulting [`Column`] records are what the validator consults, and
//! what a UI shows next to each column picker.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::coerce;
use crate::data::{Cell, Sheet};
use crate::ProfileOptions;

/// Inferred type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Date,
    String,
    Mixed,
    Unknown,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::String => "string",
            ColumnType::Mixed => "mixed",
            ColumnType::Unknown => "unknown",
        }
    }
}

/// Profile of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub is_numeric_field: bool,
    /// First distinct display values, capped for UI hinting
    pub unique_values: Vec<String>,
    pub non_empty_count: usize,
    pub numeric_count: usize,
}

/// Vote tally for one column
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Tally {
    numeric: usize,
    date: usize,
    text: usize,
}

impl Tally {
    fn total(&self) -> usize {
        self.numeric + self.date + self.text
    }

    fn classify(&self) -> ColumnType {
        let total = self.total();
        if total == 0 {
            ColumnType::Unknown
        } else if self.text == 0 && self.date == 0 {
            ColumnType::Number
        } else if self.numeric == 0 && self.date * 2 > total {
            ColumnType::Date
        } else if self.numeric > 0 {
            ColumnType::Mixed
        } else {
            ColumnType::String
        }
    }

    fn numeric_majority(&self) -> bool {
        self.numeric * 2 > self.total()
    }
}

fn vote(cell: &Cell, options: &ProfileOptions, tally: &mut Tally) {
    match cell {
        Cell::Empty => {}
        Cell::Number(n) if n.is_finite() => tally.numeric += 1,
        Cell::Number(_) => tally.text += 1,
        Cell::Date(_) => tally.date += 1,
        Cell::Text(s) => {
            if coerce::parse_number(s).is_some() {
                tally.numeric += 1;
            } else if coerce::parse_date(s, &options.date_formats).is_some() {
                tally.date += 1;
            } else {
                tally.text += 1;
            }
        }
    }
}

/// Profile a single column by index
pub fn profile_column(sheet: &Sheet, index: usize, options: &ProfileOptions) -> Column {
    let name = sheet.headers.get(index).cloned().unwrap_or_default();
    let mut tally = Tally::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique_values = Vec::new();

    for cell in sheet.column_cells(index) {
        if cell.is_empty() {
            continue;
        }
        vote(cell, options, &mut tally);

        if unique_values.len() < options.unique_value_cap {
            let shown = cell.to_string();
            if seen.insert(shown.clone()) {
                unique_values.push(shown);
            }
        }
    }

    let data_type = tally.classify();
    let is_numeric_field = match data_type {
        ColumnType::Number => true,
        ColumnType::Mixed => tally.numeric_majority(),
        _ => false,
    };

    Column {
        name,
        data_type,
        is_numeric_field,
        unique_values,
        non_empty_count: tally.total(),
        numeric_count: tally.numeric,
    }
}

/// Profile every column of a sheet, in header order
pub fn profile_sheet(sheet: &Sheet, options: &ProfileOptions) -> Vec<Column> {
    let columns: Vec<Column> = (0..sheet.headers.len())
        .map(|i| profile_column(sheet, i, options))
        .collect();

    debug!(
        sheet = %sheet.name,
        rows = sheet.rows.len(),
        columns = columns.len(),
        numeric = columns.iter().filter(|c| c.is_numeric_field).count(),
        "profiled sheet"
    );

    columns
}

/// Look up a profiled column, exact name first, then case-insensitively
pub fn find_column<'a>(columns: &'a [Column], name: &str) -> Option<&'a Column> {
    columns
        .iter()
        .find(|c| c.name == name)
        .or_else(|| columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
        Sheet::new(
            "t",
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::from_text(c)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_classification() {
        let sheet = text_sheet(
            &["num", "date", "str", "mixed", "empty", "mostly_text"],
            &[
                &["1", "2024-01-01", "East", "10", "", "a"],
                &["2.5", "2024-01-02", "West", "20", "", "b"],
                &["$1,000", "01/03/2024", "North", "n/a", "", "3"],
            ],
        );
        let cols = profile_sheet(&sheet, &ProfileOptions::default());
        let types: Vec<ColumnType> = cols.iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Number,
                ColumnType::Date,
                ColumnType::String,
                ColumnType::Mixed,
                ColumnType::Unknown,
                ColumnType::Mixed,
            ]
        );
        assert!(cols[0].is_numeric_field);
        assert!(!cols[1].is_numeric_field);
        assert!(!cols[2].is_numeric_field);
        // 2 of 3 numeric
        assert!(cols[3].is_numeric_field);
        assert!(!cols[4].is_numeric_field);
        // 1 of 3 numeric
        assert!(!cols[5].is_numeric_field);
        assert_eq!(cols[3].numeric_count, 2);
        assert_eq!(cols[4].non_empty_count, 0);
    }

    #[test]
    fn test_date_majority_with_stray_text() {
        let sheet = text_sheet(
            &["d"],
            &[&["2024-01-01"], &["2024-02-01"], &["pending"]],
        );
        let cols = profile_sheet(&sheet, &ProfileOptions::default());
        assert_eq!(cols[0].data_type, ColumnType::Date);
    }

    #[test]
    fn test_ragged_rows_and_native_cells() {
        let sheet = Sheet::new(
            "t",
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![Cell::Number(1.0)],
                vec![Cell::Number(2.0), Cell::Number(3.0)],
            ],
        );
        let cols = profile_sheet(&sheet, &ProfileOptions::default());
        assert_eq!(cols[1].data_type, ColumnType::Number);
        assert_eq!(cols[1].non_empty_count, 1);
    }

    #[test]
    fn test_unique_values_capped_in_order() {
        let rows: Vec<Vec<Cell>> = (0..120)
            .map(|i| vec![Cell::Text(format!("v{}", i % 80))])
            .collect();
        let sheet = Sheet::new("t", vec!["v".to_string()], rows);
        let options = ProfileOptions::default();
        let cols = profile_sheet(&sheet, &options);
        assert_eq!(cols[0].unique_values.len(), options.unique_value_cap);
        assert_eq!(cols[0].unique_values[0], "v0");
        assert_eq!(cols[0].unique_values[1], "v1");

        let sheet = text_sheet(&["v"], &[&["a"], &["a"], &["b"]]);
        let cols = profile_sheet(&sheet, &options);
        assert_eq!(cols[0].unique_values, vec!["a", "b"]);
    }

    #[test]
    fn test_deterministic() {
        let sheet = text_sheet(&["x", "y"], &[&["a", "1"], &["b", "x"]]);
        let options = ProfileOptions::default();
        assert_eq!(profile_sheet(&sheet, &options), profile_sheet(&sheet, &options));
    }

    #[test]
    fn test_find_column() {
        let sheet = text_sheet(&["Sales"], &[&["1"]]);
        let cols = profile_sheet(&sheet, &ProfileOptions::default());
        assert!(find_column(&cols, "sales").is_some());
        assert!(find_column(&cols, "Profit").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let sheet = text_sheet(&["Sales"], &[&["1"]]);
        let cols = profile_sheet(&sheet, &ProfileOptions::default());
        let json = serde_json::to_value(&cols[0]).unwrap();
        assert_eq!(json["dataType"], "number");
        assert_eq!(json["isNumericField"], true);
        assert_eq!(json["uniqueValues"][0], "1");
    }
}
