use std::collections::HashMap;
use tracing::debug;

use crate::chart_spec::{ChartSpec, ChartType};
use crate::coerce;
use crate::data::{Cell, Sheet};
use crate::error::ChartError;
use crate::ir::{AggregatedData, Point, Series, SeriesData};

/// Label separator used when no settings are supplied
pub const DEFAULT_LABEL_SEPARATOR: &str = " - ";

/// Label of the single group formed when a proportional chart has no x axis
const TOTAL_LABEL: &str = "Total";

/// Main entry point: group the sheet rows according to a validated spec and reduce them
/// into series.
///
/// Category-keyed charts produce one aggregated value per label and y column; scatter and
/// bubble charts produce one point list per category value. Fails with `EmptyResult` when
/// no series carries a single usable value.
pub fn aggregate(
    sheet: &Sheet,
    spec: &ChartSpec,
    label_separator: &str,
) -> Result<AggregatedData, ChartError> {
    let data = if spec.chart_type.is_point_based() {
        aggregate_points(sheet, spec)?
    } else {
        aggregate_categories(sheet, spec, label_separator)?
    };

    debug!(
        chart_type = %spec.chart_type,
        series = data.series.len(),
        labels = data.labels.as_ref().map(|l| l.len()).unwrap_or(0),
        skipped_cells = data.skipped_cells,
        "aggregated rows"
    );

    if data.series.iter().all(|s| s.usable == 0) {
        return Err(ChartError::empty(match spec.chart_type {
            ChartType::Scatter | ChartType::Bubble => {
                "no row has numeric values for every plotted field".to_string()
            }
            _ => format!(
                "no numeric values found in {}",
                spec.y_axis.join(", ")
            ),
        }));
    }

    Ok(data)
}

/// Rows grouped under a key, with keys kept in first-seen order
struct Groups {
    keys: Vec<String>,
    rows: Vec<Vec<usize>>,
}

impl Groups {
    fn build<F>(n_rows: usize, key_of: F) -> Self
    where
        F: Fn(usize) -> String,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut keys = Vec::new();
        let mut rows: Vec<Vec<usize>> = Vec::new();

        for row in 0..n_rows {
            let key = key_of(row);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                keys.push(key);
                rows.push(Vec::new());
                keys.len() - 1
            });
            rows[slot].push(row);
        }

        Groups { keys, rows }
    }
}

fn column_index(sheet: &Sheet, field: &str, name: &str) -> Result<usize, ChartError> {
    sheet.column_index(name).ok_or_else(|| {
        ChartError::validation(field, format!("column '{}' does not exist in the sheet", name))
    })
}

/// Group key of a cell. Text that reads as a number keys the same as the number itself,
/// so `1,000` and `1000` land in one group.
fn label_key(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => coerce::parse_number(s)
            .map(coerce::format_number)
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}

/// Numeric value of a cell. Non-empty cells that do not coerce are counted in `skipped`.
fn coerce_counted(cell: &Cell, skipped: &mut usize) -> Option<f64> {
    let value = cell.as_number();
    if value.is_none() && !cell.is_empty() {
        *skipped += 1;
    }
    value
}

/// Bar, line, pie, doughnut, radar and polar area
fn aggregate_categories(
    sheet: &Sheet,
    spec: &ChartSpec,
    label_separator: &str,
) -> Result<AggregatedData, ChartError> {
    let x_idx = spec
        .x_axis
        .iter()
        .map(|name| column_index(sheet, "xAxis", name))
        .collect::<Result<Vec<_>, _>>()?;

    let total_label = if spec.title.is_empty() {
        TOTAL_LABEL.to_string()
    } else {
        spec.title.clone()
    };

    let groups = Groups::build(sheet.rows.len(), |row| {
        if x_idx.is_empty() {
            total_label.clone()
        } else {
            x_idx
                .iter()
                .map(|&col| label_key(sheet.cell(row, col)))
                .collect::<Vec<_>>()
                .join(label_separator)
        }
    });

    let mut skipped_cells = 0;
    let mut series = Vec::with_capacity(spec.y_axis.len());

    for y_name in &spec.y_axis {
        let y_idx = column_index(sheet, "yAxis", y_name)?;
        let mut values = Vec::with_capacity(groups.keys.len());
        let mut usable = 0;

        for rows in &groups.rows {
            let mut numbers = Vec::with_capacity(rows.len());
            for &row in rows {
                if let Some(v) = coerce_counted(sheet.cell(row, y_idx), &mut skipped_cells) {
                    numbers.push(v);
                }
            }
            if !numbers.is_empty() {
                usable += 1;
            }
            values.push(spec.aggregation_method.apply(&numbers));
        }

        series.push(Series {
            label: y_name.clone(),
            data: SeriesData::Values(values),
            usable,
        });
    }

    Ok(AggregatedData {
        labels: Some(groups.keys),
        series,
        skipped_cells,
    })
}

/// Scatter and bubble: one series per category value, one point per usable row
fn aggregate_points(sheet: &Sheet, spec: &ChartSpec) -> Result<AggregatedData, ChartError> {
    let x_name = spec
        .x_axis
        .first()
        .ok_or_else(|| ChartError::validation("xAxis", "select an X-axis column"))?;
    let y_name = spec
        .y_axis
        .first()
        .ok_or_else(|| ChartError::validation("yAxis", "select a Y-axis column"))?;
    let category_name = spec.category_field.as_deref().ok_or_else(|| {
        ChartError::validation("categoryField", "a category field is required")
    })?;

    let x_idx = column_index(sheet, "xAxis", x_name)?;
    let y_idx = column_index(sheet, "yAxis", y_name)?;
    let category_idx = column_index(sheet, "categoryField", category_name)?;
    let size_idx = match (&spec.chart_type, spec.size_field.as_deref()) {
        (ChartType::Bubble, Some(name)) => Some(column_index(sheet, "sizeField", name)?),
        (ChartType::Bubble, None) => {
            return Err(ChartError::validation(
                "sizeField",
                "bubble charts require a size field",
            ))
        }
        _ => None,
    };

    let groups = Groups::build(sheet.rows.len(), |row| label_key(sheet.cell(row, category_idx)));

    let mut skipped_cells = 0;
    let mut series = Vec::with_capacity(groups.keys.len());

    for (key, rows) in groups.keys.iter().zip(&groups.rows) {
        let mut points = Vec::with_capacity(rows.len());
        for &row in rows {
            let x = coerce_counted(sheet.cell(row, x_idx), &mut skipped_cells);
            let y = coerce_counted(sheet.cell(row, y_idx), &mut skipped_cells);
            let r = size_idx.map(|idx| coerce_counted(sheet.cell(row, idx), &mut skipped_cells));

            // Rows missing any plotted value are dropped
            match (x, y, r) {
                (Some(x), Some(y), None) => points.push(Point { x, y, r: None }),
                (Some(x), Some(y), Some(Some(r))) => points.push(Point { x, y, r: Some(r) }),
                _ => {}
            }
        }

        series.push(Series {
            label: key.clone(),
            usable: points.len(),
            data: SeriesData::Points(points),
        });
    }

    Ok(AggregatedData {
        labels: None,
        series,
        skipped_cells,
    })
}
