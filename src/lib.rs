// Library exports for sheetchart

pub mod coerce;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod palette;
pub mod profile;
pub mod chart_spec;
pub mod validate;

// Pipeline stages
pub mod ir;
pub mod transform;
pub mod scale;
pub mod compiler;
pub mod theme;
pub mod runtime;

// Collaborators around the pipeline
pub mod cache;
pub mod retry;
pub mod wizard;

pub use chart_spec::{Aggregation, ChartSpec, ChartSpecInput, ChartType};
pub use data::{Cell, Sheet};
pub use error::ChartError;
pub use ir::ChartData;
pub use profile::{Column, ColumnType};
pub use runtime::generate_chart;

use serde::Deserialize;

use crate::retry::RetryPolicy;
use crate::scale::RadiusScale;

/// Top-level settings, loadable from a JSON file. Every field has a default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: ProfileOptions,
    pub chart: ChartSettings,
    pub retry: RetryPolicy,
}

/// Column profiling options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOptions {
    #[serde(default = "default_unique_value_cap")]
    pub unique_value_cap: usize,
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

fn default_unique_value_cap() -> usize { 50 }
fn default_date_formats() -> Vec<String> {
    coerce::DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            unique_value_cap: default_unique_value_cap(),
            date_formats: default_date_formats(),
        }
    }
}

/// Grouping and presentation options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSettings {
    /// Series colors; empty means the built-in palette
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default)]
    pub dark_mode: bool,
    /// Joins the values of several x-axis columns into one label
    #[serde(default = "default_label_separator")]
    pub label_separator: String,
    /// Joins column names into an axis title
    #[serde(default = "default_axis_title_separator")]
    pub axis_title_separator: String,
    #[serde(default)]
    pub bubble_radius: RadiusScale,
}

fn default_label_separator() -> String { transform::DEFAULT_LABEL_SEPARATOR.to_string() }
fn default_axis_title_separator() -> String { ", ".to_string() }

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            palette: Vec::new(),
            dark_mode: false,
            label_separator: default_label_separator(),
            axis_title_separator: default_axis_title_separator(),
            bubble_radius: RadiusScale::default(),
        }
    }
}

impl Settings {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_json_str("{}").unwrap();
        assert_eq!(settings.profile.unique_value_cap, 50);
        assert_eq!(settings.chart.label_separator, " - ");
        assert_eq!(settings.chart.axis_title_separator, ", ");
        assert!(!settings.chart.dark_mode);
        assert_eq!(settings.retry, RetryPolicy::default());
    }

    #[test]
    fn test_settings_partial_override() {
        let settings = Settings::from_json_str(
            r##"{
                "profile": {"uniqueValueCap": 5},
                "chart": {
                    "darkMode": true,
                    "palette": ["#000000"],
                    "bubbleRadius": {"mode": "linear"}
                },
                "retry": {"maxRetries": 0}
            }"##,
        )
        .unwrap();
        assert_eq!(settings.profile.unique_value_cap, 5);
        assert!(!settings.profile.date_formats.is_empty());
        assert!(settings.chart.dark_mode);
        assert_eq!(settings.chart.palette, vec!["#000000"]);
        assert!(matches!(settings.chart.bubble_radius, RadiusScale::Linear { .. }));
        assert_eq!(settings.retry.max_retries, 0);
    }

    #[test]
    fn test_settings_reject_unknown_mode() {
        let result = Settings::from_json_str(r#"{"chart": {"bubbleRadius": {"mode": "log"}}}"#);
        assert!(result.is_err());
    }
}
