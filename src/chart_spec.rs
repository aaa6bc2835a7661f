// Chart spec types: the wire form submitted by callers and the validated form the
// pipeline works on.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported chart types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Doughnut,
    Scatter,
    Bubble,
    Radar,
    PolarArea,
}

/// Which spec fields a chart type requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    pub x_axis: bool,
    pub y_axis: bool,
    pub category_field: bool,
    pub size_field: bool,
}

const CATEGORICAL: FieldRules = FieldRules {
    x_axis: true,
    y_axis: true,
    category_field: false,
    size_field: false,
};
const PROPORTIONAL: FieldRules = FieldRules {
    x_axis: false,
    y_axis: true,
    category_field: false,
    size_field: false,
};
const SCATTER: FieldRules = FieldRules {
    x_axis: true,
    y_axis: true,
    category_field: true,
    size_field: false,
};
const BUBBLE: FieldRules = FieldRules {
    x_axis: true,
    y_axis: true,
    category_field: true,
    size_field: true,
};

impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Radar,
        ChartType::PolarArea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Radar => "radar",
            ChartType::PolarArea => "polarArea",
        }
    }

    pub const fn rules(self) -> FieldRules {
        match self {
            ChartType::Bar | ChartType::Line | ChartType::Radar => CATEGORICAL,
            ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => PROPORTIONAL,
            ChartType::Scatter => SCATTER,
            ChartType::Bubble => BUBBLE,
        }
    }

    /// Pie, doughnut and polar area: one value per label, no cartesian axes
    pub fn is_proportional(&self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea)
    }

    /// Scatter and bubble: individual points grouped by a category field
    pub fn is_point_based(&self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Bubble)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .iter()
            .find(|t| t.as_str() == s.trim())
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = ChartType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown chart type '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Numeric reduction applied to grouped values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Average,
    Count,
    Min,
    Max,
}

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::Sum,
        Aggregation::Average,
        Aggregation::Count,
        Aggregation::Min,
        Aggregation::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Average => "average",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }

    /// Reduce the coercible values of one group.
    ///
    /// An empty group yields `0` for sum and count, and `None` for average, min and max.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        match self {
            Aggregation::Sum => Some(values.iter().sum()),
            Aggregation::Count => Some(values.len() as f64),
            Aggregation::Average => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
            Aggregation::Min => values.iter().copied().reduce(f64::min),
            Aggregation::Max => values.iter().copied().reduce(f64::max),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aggregation::ALL
            .iter()
            .find(|a| a.as_str() == s.trim())
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown aggregation method '{}' (expected sum, average, count, min or max)",
                    s
                )
            })
    }
}

/// Chart spec as submitted by a caller. Every field is loosely typed so that problems are
/// reported by the validator with a field tag instead of a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpecInput {
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub x_axis: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub y_axis: Vec<String>,
    #[serde(default)]
    pub category_field: Option<String>,
    #[serde(default)]
    pub size_field: Option<String>,
    #[serde(default)]
    pub aggregation_method: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
    Null(()),
}

/// Accept `"col"`, `["a", "b"]` or `null` for axis lists
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.trim().is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

/// Validated, normalized chart spec
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub description: String,
    pub x_axis: Vec<String>,
    pub y_axis: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_field: Option<String>,
    pub aggregation_method: Aggregation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_table() {
        assert!(ChartType::Bar.rules().x_axis);
        assert!(!ChartType::Pie.rules().x_axis);
        assert!(!ChartType::PolarArea.rules().x_axis);
        assert!(ChartType::Scatter.rules().category_field);
        assert!(!ChartType::Scatter.rules().size_field);
        assert!(ChartType::Bubble.rules().size_field);
        for t in ChartType::ALL {
            assert!(t.rules().y_axis);
            assert_eq!(t.rules().category_field, t.is_point_based());
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("polarArea".parse::<ChartType>(), Ok(ChartType::PolarArea));
        assert!("polararea".parse::<ChartType>().is_err());
        assert!("histogram".parse::<ChartType>().is_err());
        assert_eq!("average".parse::<Aggregation>(), Ok(Aggregation::Average));
        assert!("median".parse::<Aggregation>().is_err());
    }

    #[test]
    fn test_aggregation_apply() {
        let v = [10.0, 20.0, 6.0];
        assert_eq!(Aggregation::Sum.apply(&v), Some(36.0));
        assert_eq!(Aggregation::Average.apply(&v), Some(12.0));
        assert_eq!(Aggregation::Count.apply(&v), Some(3.0));
        assert_eq!(Aggregation::Min.apply(&v), Some(6.0));
        assert_eq!(Aggregation::Max.apply(&v), Some(20.0));
    }

    #[test]
    fn test_aggregation_empty_group() {
        assert_eq!(Aggregation::Sum.apply(&[]), Some(0.0));
        assert_eq!(Aggregation::Count.apply(&[]), Some(0.0));
        assert_eq!(Aggregation::Average.apply(&[]), None);
        assert_eq!(Aggregation::Min.apply(&[]), None);
        assert_eq!(Aggregation::Max.apply(&[]), None);
    }

    #[test]
    fn test_input_accepts_single_axis_string() {
        let input: ChartSpecInput = serde_json::from_value(json!({
            "type": "bar",
            "xAxis": "Region",
            "yAxis": ["Sales", "Profit"],
            "aggregationMethod": "max"
        }))
        .unwrap();
        assert_eq!(input.x_axis, vec!["Region"]);
        assert_eq!(input.y_axis.len(), 2);
        assert_eq!(input.category_field, None);

        let input: ChartSpecInput =
            serde_json::from_value(json!({"type": "pie", "xAxis": null, "yAxis": "Sales"}))
                .unwrap();
        assert!(input.x_axis.is_empty());
    }
}
