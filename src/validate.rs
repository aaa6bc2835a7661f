use tracing::debug;

use crate::chart_spec::{Aggregation, ChartSpec, ChartSpecInput, ChartType};
use crate::error::ChartError;
use crate::profile::{find_column, Column};

/// Validate a submitted chart spec against the per-type rule table and the profiled
/// columns of its sheet.
///
/// Checks run in a fixed order and stop at the first violation: type, x axis, y axis,
/// category field, size field, aggregation method. A missing aggregation method falls back
/// to `sum`.
pub fn validate_chart_spec(
    input: &ChartSpecInput,
    columns: &[Column],
) -> Result<ChartSpec, ChartError> {
    // 1. Type
    let chart_type = resolve_type(input.chart_type.as_deref())?;
    let rules = chart_type.rules();

    // 2. X axis
    let x_axis = if rules.x_axis {
        let names = non_blank(&input.x_axis);
        if names.is_empty() {
            return Err(ChartError::validation(
                "xAxis",
                format!("select at least one X-axis column for a {} chart", chart_type),
            ));
        }
        resolve_existing("xAxis", &names, columns)?
    } else if input.x_axis.is_empty() {
        Vec::new()
    } else {
        // Optional for this type, but named columns must still exist
        resolve_existing("xAxis", &non_blank(&input.x_axis), columns)?
    };

    // 3. Y axis
    let y_names = non_blank(&input.y_axis);
    if y_names.is_empty() {
        return Err(ChartError::validation(
            "yAxis",
            "select at least one Y-axis column",
        ));
    }
    let mut y_axis = Vec::with_capacity(y_names.len());
    for name in &y_names {
        let column = lookup("yAxis", name, columns)?;
        if !column.is_numeric_field {
            return Err(ChartError::data_type(
                "yAxis",
                column.name.clone(),
                format!(
                    "is not numeric (profiled as {}); Y-axis values must be numbers",
                    column.data_type.as_str()
                ),
            ));
        }
        y_axis.push(column.name.clone());
    }

    // 4. Category field
    let category_field = if rules.category_field {
        let name = required_field(input.category_field.as_deref()).ok_or_else(|| {
            ChartError::validation(
                "categoryField",
                format!(
                    "{} charts require a category field to group data points",
                    chart_type
                ),
            )
        })?;
        Some(lookup("categoryField", name, columns)?.name.clone())
    } else {
        None
    };

    // 5. Size field
    let size_field = if rules.size_field {
        let name = required_field(input.size_field.as_deref()).ok_or_else(|| {
            ChartError::validation(
                "sizeField",
                "bubble charts require a numeric size field to determine bubble size",
            )
        })?;
        let column = lookup("sizeField", name, columns)?;
        if !column.is_numeric_field {
            return Err(ChartError::data_type(
                "sizeField",
                column.name.clone(),
                format!(
                    "is not numeric (profiled as {}); bubble sizes must be numbers",
                    column.data_type.as_str()
                ),
            ));
        }
        Some(column.name.clone())
    } else {
        None
    };

    // 6. Aggregation
    let aggregation_method = match required_field(input.aggregation_method.as_deref()) {
        None => Aggregation::Sum,
        Some(name) => name
            .parse::<Aggregation>()
            .map_err(|reason| ChartError::validation("aggregationMethod", reason))?,
    };

    debug!(
        chart_type = %chart_type,
        x = x_axis.len(),
        y = y_axis.len(),
        aggregation = %aggregation_method,
        "validated chart spec"
    );

    Ok(ChartSpec {
        chart_type,
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        x_axis,
        y_axis,
        category_field,
        size_field,
        aggregation_method,
    })
}

fn resolve_type(raw: Option<&str>) -> Result<ChartType, ChartError> {
    let raw = required_field(raw)
        .ok_or_else(|| ChartError::validation("type", "select a chart type"))?;
    raw.parse::<ChartType>()
        .map_err(|reason| ChartError::validation("type", reason))
}

fn required_field(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_blank(names: &[String]) -> Vec<&str> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect()
}

fn lookup<'a>(field: &str, name: &str, columns: &'a [Column]) -> Result<&'a Column, ChartError> {
    find_column(columns, name).ok_or_else(|| {
        ChartError::validation(field, format!("column '{}' does not exist in the sheet", name))
    })
}

fn resolve_existing(
    field: &str,
    names: &[&str],
    columns: &[Column],
) -> Result<Vec<String>, ChartError> {
    names
        .iter()
        .map(|name| lookup(field, name, columns).map(|c| c.name.clone()))
        .collect()
}
