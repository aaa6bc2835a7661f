//! Chart builder wizard.
//!
//! The wizard walks a user through source selection, type selection, field configuration and
//! a preview. State lives in an immutable [`ChartDraft`]; every user action produces a new
//! draft or an error explaining why the action was refused.

use serde::Serialize;
use tracing::debug;

use crate::chart_spec::{Aggregation, ChartSpec, ChartSpecInput, ChartType};
use crate::error::ChartError;
use crate::profile::Column;
use crate::validate::validate_chart_spec;

const MIN_TITLE_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    SelectSource,
    SelectType,
    Configure,
    Preview,
}

impl WizardStep {
    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectSource => Some(WizardStep::SelectType),
            WizardStep::SelectType => Some(WizardStep::Configure),
            WizardStep::Configure => Some(WizardStep::Preview),
            WizardStep::Preview => None,
        }
    }

    fn previous(self) -> WizardStep {
        match self {
            WizardStep::SelectSource | WizardStep::SelectType => WizardStep::SelectSource,
            WizardStep::Configure => WizardStep::SelectType,
            WizardStep::Preview => WizardStep::Configure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    SelectSource(String),
    SelectType(ChartType),
    AddXAxis(String),
    RemoveXAxis(String),
    AddYAxis(String),
    RemoveYAxis(String),
    SetCategory(Option<String>),
    SetSize(Option<String>),
    SetAggregation(Aggregation),
    SetTitle(String),
    SetDescription(String),
    Next,
    Back,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDraft {
    pub step: WizardStep,
    pub source: Option<String>,
    pub chart_type: Option<ChartType>,
    pub x_axis: Vec<String>,
    pub y_axis: Vec<String>,
    pub category_field: Option<String>,
    pub size_field: Option<String>,
    pub aggregation: Aggregation,
    pub title: String,
    pub description: String,
}

impl Default for ChartDraft {
    fn default() -> Self {
        Self {
            step: WizardStep::SelectSource,
            source: None,
            chart_type: None,
            x_axis: Vec::new(),
            y_axis: Vec::new(),
            category_field: None,
            size_field: None,
            aggregation: Aggregation::default(),
            title: String::new(),
            description: String::new(),
        }
    }
}

impl ChartDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one user action, returning the next draft
    pub fn apply(&self, action: DraftAction) -> Result<ChartDraft, ChartError> {
        let mut next = self.clone();
        match action {
            DraftAction::SelectSource(source) => {
                if next.source.as_deref() != Some(source.as_str()) {
                    // Column selections belong to the previous sheet
                    next.x_axis.clear();
                    next.y_axis.clear();
                    next.category_field = None;
                    next.size_field = None;
                }
                next.source = Some(source).filter(|s| !s.trim().is_empty());
            }
            DraftAction::SelectType(chart_type) => {
                if chart_type.is_proportional() {
                    next.x_axis.clear();
                }
                next.chart_type = Some(chart_type);
            }
            DraftAction::AddXAxis(column) => push_unique(&mut next.x_axis, column),
            DraftAction::RemoveXAxis(column) => next.x_axis.retain(|c| *c != column),
            DraftAction::AddYAxis(column) => push_unique(&mut next.y_axis, column),
            DraftAction::RemoveYAxis(column) => next.y_axis.retain(|c| *c != column),
            DraftAction::SetCategory(field) => next.category_field = non_blank(field),
            DraftAction::SetSize(field) => next.size_field = non_blank(field),
            DraftAction::SetAggregation(method) => next.aggregation = method,
            DraftAction::SetTitle(title) => next.title = title,
            DraftAction::SetDescription(description) => next.description = description,
            DraftAction::Next => {
                self.check_step_complete()?;
                if let Some(step) = self.step.next() {
                    next.step = step;
                }
            }
            DraftAction::Back => next.step = self.step.previous(),
        }
        debug!(step = ?next.step, "wizard transition");
        Ok(next)
    }

    /// Refuse to leave the current step until its selections are made
    fn check_step_complete(&self) -> Result<(), ChartError> {
        match self.step {
            WizardStep::SelectSource => {
                if self.source.is_none() {
                    return Err(ChartError::validation("source", "select a data source"));
                }
            }
            WizardStep::SelectType => {
                if self.chart_type.is_none() {
                    return Err(ChartError::validation("type", "select a chart type"));
                }
            }
            WizardStep::Configure => self.check_fields()?,
            WizardStep::Preview => {}
        }
        Ok(())
    }

    fn check_fields(&self) -> Result<(), ChartError> {
        if self.source.is_none() {
            return Err(ChartError::validation("source", "select a data source"));
        }
        let chart_type = self
            .chart_type
            .ok_or_else(|| ChartError::validation("type", "select a chart type"))?;
        let rules = chart_type.rules();
        if rules.x_axis && self.x_axis.is_empty() {
            return Err(ChartError::validation(
                "xAxis",
                format!("select at least one X-axis column for a {} chart", chart_type),
            ));
        }
        if self.y_axis.is_empty() {
            return Err(ChartError::validation("yAxis", "select at least one Y-axis column"));
        }
        if rules.category_field && self.category_field.is_none() {
            return Err(ChartError::validation(
                "categoryField",
                format!("a {} chart needs a category field", chart_type),
            ));
        }
        if rules.size_field && self.size_field.is_none() {
            return Err(ChartError::validation(
                "sizeField",
                "a bubble chart needs a size field",
            ));
        }
        Ok(())
    }

    /// The draft in the wire form the validator accepts
    pub fn to_input(&self) -> ChartSpecInput {
        ChartSpecInput {
            chart_type: self.chart_type.map(|t| t.as_str().to_string()),
            title: self.title.clone(),
            description: self.description.clone(),
            x_axis: self.x_axis.clone(),
            y_axis: self.y_axis.clone(),
            category_field: self.category_field.clone(),
            size_field: self.size_field.clone(),
            aggregation_method: Some(self.aggregation.as_str().to_string()),
        }
    }

    /// Validate the draft for saving against the profiled columns of its source
    pub fn finish(&self, columns: &[Column]) -> Result<ChartSpec, ChartError> {
        if self.title.trim().chars().count() < MIN_TITLE_LEN {
            return Err(ChartError::validation(
                "title",
                format!("title must be at least {} characters", MIN_TITLE_LEN),
            ));
        }
        self.check_fields()?;
        validate_chart_spec(&self.to_input(), columns)
    }
}

fn push_unique(list: &mut Vec<String>, column: String) {
    if !column.trim().is_empty() && !list.contains(&column) {
        list.push(column);
    }
}

fn non_blank(field: Option<String>) -> Option<String> {
    field.filter(|f| !f.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Cell, Sheet};
    use crate::profile::profile_sheet;
    use crate::ProfileOptions;

    fn columns() -> Vec<Column> {
        let sheet = Sheet::new(
            "sales",
            vec!["Region".into(), "Sales".into()],
            vec![
                vec![Cell::Text("East".into()), Cell::Number(10.0)],
                vec![Cell::Text("West".into()), Cell::Number(5.0)],
            ],
        );
        profile_sheet(&sheet, &ProfileOptions::default())
    }

    fn run(actions: Vec<DraftAction>) -> Result<ChartDraft, ChartError> {
        actions
            .into_iter()
            .try_fold(ChartDraft::new(), |draft, action| draft.apply(action))
    }

    #[test]
    fn test_full_flow() {
        let draft = run(vec![
            DraftAction::SelectSource("upload-1".into()),
            DraftAction::Next,
            DraftAction::SelectType(ChartType::Bar),
            DraftAction::Next,
            DraftAction::AddXAxis("Region".into()),
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::Next,
            DraftAction::SetTitle("Sales by region".into()),
        ])
        .unwrap();
        assert_eq!(draft.step, WizardStep::Preview);

        let spec = draft.finish(&columns()).unwrap();
        assert_eq!(spec.chart_type, ChartType::Bar);
        assert_eq!(spec.x_axis, vec!["Region"]);
        assert_eq!(spec.aggregation_method, Aggregation::Sum);
    }

    #[test]
    fn test_next_requires_selection() {
        let err = ChartDraft::new().apply(DraftAction::Next).unwrap_err();
        assert_eq!(err.field(), Some("source"));

        let err = run(vec![
            DraftAction::SelectSource("s".into()),
            DraftAction::Next,
            DraftAction::Next,
        ])
        .unwrap_err();
        assert_eq!(err.field(), Some("type"));
    }

    #[test]
    fn test_preview_requires_fields() {
        let err = run(vec![
            DraftAction::SelectSource("s".into()),
            DraftAction::Next,
            DraftAction::SelectType(ChartType::Line),
            DraftAction::Next,
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::Next,
        ])
        .unwrap_err();
        assert_eq!(err.field(), Some("xAxis"));

        let err = run(vec![
            DraftAction::SelectSource("s".into()),
            DraftAction::Next,
            DraftAction::SelectType(ChartType::Scatter),
            DraftAction::Next,
            DraftAction::AddXAxis("Sales".into()),
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::Next,
        ])
        .unwrap_err();
        assert_eq!(err.field(), Some("categoryField"));
    }

    #[test]
    fn test_pie_needs_no_x_axis_and_clears_it() {
        let draft = run(vec![
            DraftAction::SelectSource("s".into()),
            DraftAction::AddXAxis("Region".into()),
            DraftAction::Next,
            DraftAction::SelectType(ChartType::Pie),
            DraftAction::Next,
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::Next,
        ])
        .unwrap();
        assert!(draft.x_axis.is_empty());
        assert_eq!(draft.step, WizardStep::Preview);
    }

    #[test]
    fn test_changing_source_clears_columns() {
        let draft = run(vec![
            DraftAction::SelectSource("a".into()),
            DraftAction::AddXAxis("Region".into()),
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::SetCategory(Some("Region".into())),
        ])
        .unwrap();

        let same = draft.apply(DraftAction::SelectSource("a".into())).unwrap();
        assert_eq!(same.y_axis, vec!["Sales"]);

        let changed = draft.apply(DraftAction::SelectSource("b".into())).unwrap();
        assert!(changed.x_axis.is_empty());
        assert!(changed.y_axis.is_empty());
        assert_eq!(changed.category_field, None);
        // The original draft is untouched
        assert_eq!(draft.x_axis, vec!["Region"]);
    }

    #[test]
    fn test_axis_edits_ignore_blanks_and_duplicates() {
        let draft = run(vec![
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::AddYAxis("  ".into()),
            DraftAction::AddYAxis("Units".into()),
            DraftAction::RemoveYAxis("Sales".into()),
            DraftAction::SetSize(Some("".into())),
        ])
        .unwrap();
        assert_eq!(draft.y_axis, vec!["Units"]);
        assert_eq!(draft.size_field, None);
    }

    #[test]
    fn test_back_and_last_step() {
        let draft = run(vec![DraftAction::Back]).unwrap();
        assert_eq!(draft.step, WizardStep::SelectSource);

        let draft = run(vec![
            DraftAction::SelectSource("s".into()),
            DraftAction::Next,
            DraftAction::SelectType(ChartType::Pie),
            DraftAction::Next,
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::Next,
            DraftAction::Next,
        ])
        .unwrap();
        assert_eq!(draft.step, WizardStep::Preview);
        assert_eq!(draft.apply(DraftAction::Back).unwrap().step, WizardStep::Configure);
    }

    #[test]
    fn test_finish_requires_title() {
        let draft = run(vec![
            DraftAction::SelectSource("s".into()),
            DraftAction::SelectType(ChartType::Pie),
            DraftAction::AddYAxis("Sales".into()),
            DraftAction::SetTitle(" ab ".into()),
        ])
        .unwrap();
        let err = draft.finish(&columns()).unwrap_err();
        assert_eq!(err.field(), Some("title"));

        let draft = draft.apply(DraftAction::SetTitle("Share".into())).unwrap();
        assert!(draft.finish(&columns()).is_ok());
    }

    #[test]
    fn test_finish_runs_validator() {
        let draft = run(vec![
            DraftAction::SelectSource("s".into()),
            DraftAction::SelectType(ChartType::Bar),
            DraftAction::AddXAxis("Region".into()),
            DraftAction::AddYAxis("Region".into()),
            DraftAction::SetTitle("Regions".into()),
        ])
        .unwrap();
        let err = draft.finish(&columns()).unwrap_err();
        assert_eq!(err.kind(), "DataTypeError");
    }
}
