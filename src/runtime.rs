// Runtime executor for the sheet-to-chart pipeline

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, debug_span};

use crate::chart_spec::ChartSpecInput;
use crate::compiler::compile_chart_data;
use crate::data::Sheet;
use crate::error::ChartError;
use crate::ir::ChartData;
use crate::profile::{profile_sheet, Column};
use crate::transform::aggregate;
use crate::validate::validate_chart_spec;
use crate::{ChartSettings, Settings};

/// Run validate → aggregate → assemble for one chart spec against an already profiled
/// sheet. Validation errors are returned before any row is touched.
pub fn generate_chart(
    sheet: &Sheet,
    columns: &[Column],
    input: &ChartSpecInput,
    settings: &ChartSettings,
) -> Result<ChartData, ChartError> {
    let _span = debug_span!("generate_chart", sheet = %sheet.name).entered();

    let spec = validate_chart_spec(input, columns)?;
    let data = aggregate(sheet, &spec, &settings.label_separator)?;
    if data.skipped_cells > 0 {
        debug!(skipped = data.skipped_cells, "skipped non-numeric cells");
    }
    Ok(compile_chart_data(&spec, data, settings))
}

/// Profile the sheet and generate the chart in one call, for callers without a cache
pub fn profile_and_generate(
    sheet: &Sheet,
    input: &ChartSpecInput,
    settings: &Settings,
) -> Result<ChartData, ChartError> {
    let columns = profile_sheet(sheet, &settings.profile);
    generate_chart(sheet, &columns, input, &settings.chart)
}

/// Hands out increasing request ids so a caller can drop results of superseded requests.
///
/// The pipeline itself never checks this; it only gives callers an easy way to tell
/// whether the result they just received is still the latest one they asked for.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request; every earlier id becomes stale
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn make_sheet() -> Sheet {
        Sheet::new(
            "sales",
            vec!["Region".into(), "Sales".into()],
            vec![
                vec![Cell::Text("East".into()), Cell::Number(10.0)],
                vec![Cell::Text("East".into()), Cell::Number(20.0)],
                vec![Cell::Text("West".into()), Cell::Number(5.0)],
            ],
        )
    }

    fn bar_input() -> ChartSpecInput {
        ChartSpecInput {
            chart_type: Some("bar".into()),
            x_axis: vec!["Region".into()],
            y_axis: vec!["Sales".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_chart() {
        let chart =
            profile_and_generate(&make_sheet(), &bar_input(), &Settings::default()).unwrap();
        assert_eq!(chart.labels, Some(vec!["East".to_string(), "West".to_string()]));
        let json = serde_json::to_value(&chart.datasets[0].data).unwrap();
        assert_eq!(json, serde_json::json!([30.0, 5.0]));
    }

    #[test]
    fn test_validation_runs_first() {
        let mut input = bar_input();
        input.x_axis.clear();
        let err = profile_and_generate(&make_sheet(), &input, &Settings::default()).unwrap_err();
        assert_eq!(err.field(), Some("xAxis"));
    }

    #[test]
    fn test_pipeline_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sheet>();
        assert_send_sync::<Column>();
        assert_send_sync::<ChartData>();
        assert_send_sync::<ChartError>();
        assert_send_sync::<Settings>();
        assert_send_sync::<crate::cache::ProfileCache>();
        assert_send_sync::<RequestTracker>();
    }

    #[test]
    fn test_request_tracker() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_current(first));
        let second = tracker.begin();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }
}
