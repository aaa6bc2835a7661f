use serde::Serialize;

// =============================================================================
// Aggregation output
// =============================================================================

/// One scatter/bubble point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
}

/// Payload of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    /// One aggregated value per label; `None` where a group had nothing to aggregate
    Values(Vec<Option<f64>>),
    /// Individual points, in row order
    Points(Vec<Point>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(v) => v.len(),
            SeriesData::Points(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A labeled data track (one bar group, one line, one bubble category)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: SeriesData,
    /// Number of groups or points that carried at least one usable value
    #[serde(skip)]
    pub usable: usize,
}

/// Everything the aggregator hands to the assembler
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedData {
    /// Distinct group keys in first-seen order; `None` for point-based charts
    pub labels: Option<Vec<String>>,
    pub series: Vec<Series>,
    /// Cells that could not be coerced to a number and were skipped
    pub skipped_cells: usize,
}

// =============================================================================
// Assembly output (the contract handed to a renderer)
// =============================================================================

/// Render-ready chart: labels, colored datasets and default options
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

/// A color for the whole dataset, or one per data point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorValue {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: SeriesData,
    pub background_color: ColorValue,
    pub border_color: ColorValue,
    pub border_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub plugins: Plugins,
    /// Absent for pie, doughnut and polar area charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    pub title: TitleOptions,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextColor {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
    pub position: LegendPosition,
    pub labels: TextColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipMode {
    Index,
    Nearest,
}

/// How the renderer should phrase a tooltip line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TooltipFormat {
    /// `Series: value`
    SeriesValue,
    /// `Label: value (share%)`
    ValueWithPercentage,
    /// `Series: (x, y)` or `(x, y, r)`
    Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub enabled: bool,
    pub mode: TooltipMode,
    pub intersect: bool,
    pub label_format: TooltipFormat,
    pub background_color: String,
    pub title_color: String,
    pub body_color: String,
}

/// Scale configuration: cartesian `x`/`y` axes, or a single radial `r` scale
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scales {
    Cartesian { x: CartesianAxis, y: CartesianAxis },
    Radial { r: RadialScale },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartesianAxis {
    pub title: AxisTitle,
    pub ticks: TextColor,
    pub grid: TextColor,
    pub begin_at_zero: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadialScale {
    pub angle_lines: TextColor,
    pub grid: TextColor,
    pub point_labels: TextColor,
    pub ticks: TextColor,
    pub begin_at_zero: bool,
}
