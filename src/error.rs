use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the chart pipeline and its collaborators.
///
/// Every message is written for direct display next to the form field that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// A required field is missing or invalid for the chosen chart type
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    /// A named column is not numeric where a number is required
    #[error("{field}: column '{column}' {reason}")]
    DataType {
        field: String,
        column: String,
        reason: String,
    },

    /// Grouping produced no usable series or data points
    #[error("No chart data: {reason}")]
    EmptyResult { reason: String },

    /// The sheet could not be retrieved from its source
    #[error("Failed to fetch sheet '{source_id}': {reason}")]
    UpstreamFetch {
        source_id: String,
        reason: String,
        /// Whether another attempt could succeed
        retryable: bool,
    },
}

impl ChartError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ChartError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn data_type(
        field: impl Into<String>,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ChartError::DataType {
            field: field.into(),
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub fn empty(reason: impl Into<String>) -> Self {
        ChartError::EmptyResult {
            reason: reason.into(),
        }
    }

    /// A transient fetch failure, worth retrying
    pub fn upstream(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        ChartError::UpstreamFetch {
            source_id: source_id.into(),
            reason: reason.into(),
            retryable: true,
        }
    }

    /// A fetch failure that no retry can fix: missing file, bad content, unknown sheet
    pub fn upstream_permanent(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        ChartError::UpstreamFetch {
            source_id: source_id.into(),
            reason: reason.into(),
            retryable: false,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ChartError::UpstreamFetch { retryable: true, .. })
    }

    /// Spec field the error is tagged to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            ChartError::Validation { field, .. } | ChartError::DataType { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChartError::Validation { .. } => "ValidationError",
            ChartError::DataType { .. } => "DataTypeError",
            ChartError::EmptyResult { .. } => "EmptyResultError",
            ChartError::UpstreamFetch { .. } => "UpstreamFetchError",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            field: self.field().map(str::to_string),
            column: match self {
                ChartError::DataType { column, .. } => Some(column.clone()),
                _ => None,
            },
            message: self.to_string(),
        }
    }
}

/// Serializable error shape for UI display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_tagging() {
        let err = ChartError::validation("categoryField", "required for scatter charts");
        assert_eq!(err.field(), Some("categoryField"));
        assert_eq!(err.kind(), "ValidationError");
        assert_eq!(err.to_string(), "categoryField: required for scatter charts");

        let err = ChartError::empty("nothing to plot");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_report_serialization() {
        let err = ChartError::data_type("yAxis", "Region", "is not numeric");
        let json = serde_json::to_value(err.report()).unwrap();
        assert_eq!(json["kind"], "DataTypeError");
        assert_eq!(json["field"], "yAxis");
        assert_eq!(json["column"], "Region");
        assert_eq!(json["message"], "yAxis: column 'Region' is not numeric");

        let json = serde_json::to_value(ChartError::empty("x").report()).unwrap();
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_only_transient_fetch_errors_retry() {
        assert!(ChartError::upstream("s", "connection reset").is_retryable());
        assert!(!ChartError::upstream_permanent("s", "no such file").is_retryable());
        assert!(!ChartError::validation("xAxis", "missing").is_retryable());
        assert_eq!(
            ChartError::upstream_permanent("s", "no such file").to_string(),
            "Failed to fetch sheet 's': no such file"
        );
    }
}
