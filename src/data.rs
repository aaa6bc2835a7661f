use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDateTime, Timelike};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::coerce;

/// A single raw spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Convert a JSON value from the ingestion contract. Never fails: arrays and objects
    /// degrade to their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::String(s) => Cell::from_text(s),
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Wrap a raw string, mapping blank text to `Empty`
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric value of the cell, coercing text where it reads as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => coerce::parse_number(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => f.write_str(&coerce::format_number(*n)),
            Cell::Text(s) => f.write_str(s.trim()),
            Cell::Date(d) => {
                if d.time().num_seconds_from_midnight() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// One worksheet: headers plus positionally aligned rows (rows may be ragged)
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Deserialize)]
struct SheetPayload {
    #[serde(default)]
    name: String,
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Cell at `(row, col)`; missing trailing cells of ragged rows read as empty
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Iterate the cells of one column across all rows
    pub fn column_cells(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(col).unwrap_or(&EMPTY_CELL))
    }

    /// Find a header, preferring an exact match over a case-insensitive one
    pub fn column_index(&self, name: &str) -> Option<usize> {
        find_header(&self.headers, name)
    }

    /// Parse the ingestion contract `{ name, headers, rows }`
    pub fn from_json(value: &Value) -> Result<Self> {
        let payload: SheetPayload = serde_json::from_value(value.clone())
            .context("Sheet must be an object with 'headers' and 'rows'")?;
        let rows = payload
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::from_json).collect())
            .collect();
        Ok(Self {
            name: payload.name,
            headers: payload.headers,
            rows,
        })
    }

    /// Build a sheet from a JSON array of objects. Headers are the union of keys in
    /// first-seen order.
    pub fn from_records(name: impl Into<String>, value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut headers: Vec<String> = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = array
            .iter()
            .filter_map(|item| item.as_object())
            .map(|obj| {
                headers
                    .iter()
                    .map(|h| obj.get(h).map(Cell::from_json).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Ok(Self {
            name: name.into(),
            headers,
            rows,
        })
    }
}

/// Parse a workbook: either a single sheet object or an array of sheets
pub fn workbook_from_json(value: &Value) -> Result<Vec<Sheet>> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Sheet::from_json(item).with_context(|| format!("Invalid sheet at index {}", i))
            })
            .collect(),
        _ => Ok(vec![Sheet::from_json(value)?]),
    }
}

/// Pick a sheet by name, or the first one when no name is given
pub fn select_sheet(sheets: Vec<Sheet>, name: Option<&str>) -> Result<Sheet> {
    match name {
        Some(wanted) => {
            let available: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
            sheets
                .into_iter()
                .find(|s| s.name == wanted)
                .ok_or_else(|| {
                    anyhow!(
                        "Sheet '{}' not found (available: {})",
                        wanted,
                        available.join(", ")
                    )
                })
        }
        None => sheets
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Workbook contains no sheets")),
    }
}

pub(crate) fn find_header(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}
