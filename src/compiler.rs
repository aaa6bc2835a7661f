use tracing::{debug, warn};

use crate::chart_spec::{ChartSpec, ChartType};
use crate::ir::{
    AggregatedData, AxisTitle, CartesianAxis, ChartData, ChartOptions, ColorValue, Dataset,
    Legend, LegendPosition, Plugins, RadialScale, Scales, Series, SeriesData, TextColor,
    TitleOptions, Tooltip, TooltipFormat, TooltipMode,
};
use crate::palette::{with_alpha, ColorPalette};
use crate::scale::{value_domain, RadiusMapping};
use crate::theme::{theme_colors, ThemeColors};
use crate::ChartSettings;

/// Background alpha for line and radar fills
const AREA_ALPHA: f64 = 0.2;

/// Compile aggregated series into the render-ready chart contract, using the configured
/// bubble radius scale.
pub fn compile_chart_data(
    spec: &ChartSpec,
    data: AggregatedData,
    settings: &ChartSettings,
) -> ChartData {
    compile_chart_data_with(spec, data, settings, &settings.bubble_radius)
}

/// Same as [`compile_chart_data`] with a caller supplied bubble radius mapping
pub fn compile_chart_data_with(
    spec: &ChartSpec,
    data: AggregatedData,
    settings: &ChartSettings,
    radius: &dyn RadiusMapping,
) -> ChartData {
    let palette = ColorPalette::new(&settings.palette);
    let chart_type = spec.chart_type;

    let (labels, datasets) = match chart_type {
        ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => {
            let labels = data.labels.unwrap_or_default();
            let dataset = proportional_dataset(data.series, &labels, &palette);
            (Some(labels), dataset.into_iter().collect())
        }
        ChartType::Scatter | ChartType::Bubble => {
            let mut series = data.series;
            if chart_type == ChartType::Bubble {
                scale_radii(&mut series, radius);
            }
            (None, point_datasets(series, &palette))
        }
        ChartType::Bar | ChartType::Line | ChartType::Radar => {
            let datasets = data
                .series
                .into_iter()
                .enumerate()
                .map(|(i, s)| category_dataset(chart_type, i, s, &palette))
                .collect();
            (data.labels, datasets)
        }
    };

    let options = build_options(spec, settings);

    debug!(
        chart_type = %chart_type,
        datasets = datasets.len(),
        "compiled chart data"
    );

    ChartData {
        labels,
        datasets,
        options,
    }
}

/// Pie-family charts show a single dataset with one color per label
fn proportional_dataset(
    series: Vec<Series>,
    labels: &[String],
    palette: &ColorPalette,
) -> Option<Dataset> {
    if series.len() > 1 {
        warn!(
            plotted = %series[0].label,
            dropped = series.len() - 1,
            "proportional charts plot only the first Y-axis column"
        );
    }
    let first = series.into_iter().next()?;
    let colors = palette.take(labels.len());
    Some(Dataset {
        label: first.label,
        data: first.data,
        background_color: ColorValue::PerPoint(colors.clone()),
        border_color: ColorValue::PerPoint(colors),
        border_width: 1,
        fill: None,
    })
}

fn category_dataset(
    chart_type: ChartType,
    index: usize,
    series: Series,
    palette: &ColorPalette,
) -> Dataset {
    let color = palette.color(index);
    let (background, fill) = match chart_type {
        ChartType::Line => (with_alpha(color, AREA_ALPHA), Some(false)),
        ChartType::Radar => (with_alpha(color, AREA_ALPHA), None),
        _ => (color.to_string(), None),
    };
    Dataset {
        label: series.label,
        data: series.data,
        background_color: ColorValue::Single(background),
        border_color: ColorValue::Single(color.to_string()),
        border_width: 1,
        fill,
    }
}

/// Scatter and bubble: one dataset per category, empty categories left out
fn point_datasets(series: Vec<Series>, palette: &ColorPalette) -> Vec<Dataset> {
    series
        .into_iter()
        .filter(|s| !s.data.is_empty())
        .enumerate()
        .map(|(i, s)| {
            let color = palette.color(i).to_string();
            Dataset {
                label: s.label,
                data: s.data,
                background_color: ColorValue::Single(color.clone()),
                border_color: ColorValue::Single(color),
                border_width: 1,
                fill: None,
            }
        })
        .collect()
}

/// Replace raw bubble sizes with rendered radii over the chart-wide size domain
fn scale_radii(series: &mut [Series], radius: &dyn RadiusMapping) {
    let domain = value_domain(series.iter().flat_map(|s| match &s.data {
        SeriesData::Points(points) => points.iter().filter_map(|p| p.r).collect::<Vec<_>>(),
        SeriesData::Values(_) => Vec::new(),
    }));
    let Some(domain) = domain else { return };

    for s in series.iter_mut() {
        if let SeriesData::Points(points) = &mut s.data {
            for p in points.iter_mut() {
                p.r = p.r.map(|r| radius.radius(r, domain));
            }
        }
    }
}

fn axis_title(columns: &[String], separator: &str, fallback: &str) -> String {
    if columns.is_empty() {
        fallback.to_string()
    } else {
        columns.join(separator)
    }
}

fn build_options(spec: &ChartSpec, settings: &ChartSettings) -> ChartOptions {
    let colors = theme_colors(settings.dark_mode);
    let chart_type = spec.chart_type;

    let (position, label_format, mode) = if chart_type.is_proportional() {
        (
            LegendPosition::Right,
            TooltipFormat::ValueWithPercentage,
            TooltipMode::Nearest,
        )
    } else if chart_type.is_point_based() {
        (LegendPosition::Top, TooltipFormat::Coordinates, TooltipMode::Nearest)
    } else {
        (LegendPosition::Top, TooltipFormat::SeriesValue, TooltipMode::Index)
    };

    let scales = match chart_type {
        ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => None,
        ChartType::Radar => Some(radial_scale(&colors)),
        _ => {
            let x_text = axis_title(&spec.x_axis, &settings.axis_title_separator, "X Axis");
            let y_text = axis_title(&spec.y_axis, &settings.axis_title_separator, "Y Axis");
            let begin_at_zero = !chart_type.is_point_based();
            Some(Scales::Cartesian {
                x: cartesian_axis(x_text, false, &colors),
                y: cartesian_axis(y_text, begin_at_zero, &colors),
            })
        }
    };

    let title = if spec.title.is_empty() {
        "Chart".to_string()
    } else {
        spec.title.clone()
    };

    ChartOptions {
        responsive: true,
        maintain_aspect_ratio: false,
        plugins: Plugins {
            legend: Legend {
                display: true,
                position,
                labels: TextColor {
                    color: colors.text.to_string(),
                },
            },
            title: TitleOptions {
                display: true,
                text: title,
                color: colors.text.to_string(),
            },
            tooltip: Tooltip {
                enabled: true,
                mode,
                intersect: mode == TooltipMode::Nearest,
                label_format,
                background_color: colors.tooltip_background.to_string(),
                title_color: colors.tooltip_text.to_string(),
                body_color: colors.tooltip_text.to_string(),
            },
        },
        scales,
    }
}

fn cartesian_axis(text: String, begin_at_zero: bool, colors: &ThemeColors) -> CartesianAxis {
    CartesianAxis {
        title: AxisTitle {
            display: true,
            text,
            color: colors.text.to_string(),
        },
        ticks: TextColor {
            color: colors.text.to_string(),
        },
        grid: TextColor {
            color: colors.grid.to_string(),
        },
        begin_at_zero,
    }
}

fn radial_scale(colors: &ThemeColors) -> Scales {
    Scales::Radial {
        r: RadialScale {
            angle_lines: TextColor {
                color: colors.grid.to_string(),
            },
            grid: TextColor {
                color: colors.grid.to_string(),
            },
            point_labels: TextColor {
                color: colors.text.to_string(),
            },
            ticks: TextColor {
                color: colors.text.to_string(),
            },
            begin_at_zero: true,
        },
    }
}
