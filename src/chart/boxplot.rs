//! Box plot rendering for crawl-time distributions

use std::rc::Rc;

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    datatype::{CompositeValue, Dataset, Transform},
    element::{
        AxisLabel, AxisType, Color, Formatter, ItemStyle, LineStyle, SplitLine, TextStyle, Tooltip,
        Trigger,
    },
    series::{Boxplot, Scatter},
};
use serde_json::Value;
use tracing::debug;

use super::colors::{COLOR_BACKGROUND, COLOR_GRID, COLOR_OUTLIER, COLOR_TEXT, TOTAL_COLORS};
use crate::api::{AggregateResponse, BoxStats, PeriodSeries};
use crate::output::format_time;
use crate::stats::{FiveNumberSummary, interpolate, summarize};

/// Whisker reach in interquartile ranges
const WHISKER_IQR: f64 = 1.5;

/// Drawn shape of one box: whisker ends, box edges, median line, outlier dots
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoxGeometry {
    pub(crate) low: f64,
    pub(crate) q1: f64,
    pub(crate) median: f64,
    pub(crate) q3: f64,
    pub(crate) high: f64,
    pub(crate) outliers: Vec<f64>,
}

/// Geometry as the charting library's boxplot transform derives it from raw
/// samples: quantiles at rank `(n-1)*p`, whiskers clipped to 1.5 IQR inside
/// the sample range, everything beyond them an outlier.
pub(crate) fn box_geometry(samples: &[f64]) -> Option<BoxGeometry> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = (sorted.len() - 1) as f64;

    let q1 = interpolate(&sorted, last * 0.25);
    let median = interpolate(&sorted, last * 0.5);
    let q3 = interpolate(&sorted, last * 0.75);
    let bound = WHISKER_IQR * (q3 - q1);
    let low = (q1 - bound).max(sorted[0]);
    let high = (q3 + bound).min(sorted[sorted.len() - 1]);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < low || v > high)
        .collect();

    Some(BoxGeometry {
        low,
        q1,
        median,
        q3,
        high,
        outliers,
    })
}

impl From<&BoxStats> for BoxGeometry {
    fn from(stats: &BoxStats) -> Self {
        Self {
            low: stats.min,
            q1: stats.q1,
            median: stats.median,
            q3: stats.q3,
            high: stats.max,
            outliers: stats.outliers.clone(),
        }
    }
}

/// One period's box, ready to draw
#[derive(Debug, Clone)]
pub(crate) struct BoxElement {
    pub(crate) period: String,
    pub(crate) summary: FiveNumberSummary,
    pub(crate) geometry: BoxGeometry,
    pub(crate) tooltip: String,
}

/// Hover text as HTML; the values come from the summary, not from the drawn geometry
pub(crate) fn tooltip_text(label: &str, summary: &FiveNumberSummary) -> String {
    format!(
        "{}<br/>max: {}<br/>Q3: {}<br/>median: {}<br/>Q1: {}<br/>min: {}<br/>crawls: {}",
        escape_html(label),
        format_time(summary.max),
        format_time(summary.q3),
        format_time(summary.median),
        format_time(summary.q1),
        format_time(summary.min),
        summary.count
    )
}

/// Boxes in `periods` order; periods with no samples are skipped, not drawn empty
pub(crate) fn build_boxes(periods: &[String], series: &PeriodSeries) -> Vec<BoxElement> {
    periods
        .iter()
        .filter_map(|period| {
            let samples = series.get(period)?;
            let summary = summarize(samples)?;
            let geometry = box_geometry(samples)?;
            Some(BoxElement {
                period: period.clone(),
                tooltip: tooltip_text(period, &summary),
                summary,
                geometry,
            })
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Inputs of one chart; a new `Rc` means new data and forces a re-render
#[derive(Debug)]
pub(crate) struct SeriesInput {
    pub(crate) label: String,
    pub(crate) subtitle: String,
    pub(crate) periods: Vec<String>,
    pub(crate) series: PeriodSeries,
    /// Box border and whisker color
    pub(crate) color: &'static str,
}

/// Owns the chart instance of one store and rebuilds it from scratch on new input
pub(crate) struct SeriesChart {
    input: Option<Rc<SeriesInput>>,
    boxes: Vec<BoxElement>,
    instance: Option<Chart>,
    renders: usize,
    disposals: usize,
}

impl SeriesChart {
    pub(crate) fn new() -> Self {
        Self {
            input: None,
            boxes: Vec::new(),
            instance: None,
            renders: 0,
            disposals: 0,
        }
    }

    /// Render `input` unless it is the input already shown; returns whether it rendered
    pub(crate) fn update(&mut self, input: &Rc<SeriesInput>) -> bool {
        if let Some(current) = &self.input
            && Rc::ptr_eq(current, input)
        {
            return false;
        }

        self.dispose();
        self.boxes = build_boxes(&input.periods, &input.series);
        self.instance = Some(box_chart(
            &input.label,
            &input.subtitle,
            input.color,
            &self.boxes,
            &input.series,
        ));
        self.input = Some(Rc::clone(input));
        self.renders += 1;
        debug!(label = %input.label, boxes = self.boxes.len(), renders = self.renders, "chart rendered");
        true
    }

    /// Release the current chart instance, if any
    pub(crate) fn dispose(&mut self) {
        if self.instance.take().is_some() {
            self.disposals += 1;
            debug!(disposals = self.disposals, "chart disposed");
        }
        self.boxes.clear();
        self.input = None;
    }

    pub(crate) fn boxes(&self) -> &[BoxElement] {
        &self.boxes
    }

    pub(crate) fn chart(&self) -> Option<&Chart> {
        self.instance.as_ref()
    }

    pub(crate) fn label(&self) -> Option<&str> {
        self.input.as_deref().map(|input| input.label.as_str())
    }
}

impl Drop for SeriesChart {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Box plot over raw samples. The chart library derives box geometry and
/// outliers itself through a `boxplot` dataset transform; the hover text
/// still shows the summary of each element.
pub(crate) fn box_chart(
    title: &str,
    subtitle: &str,
    color: &str,
    boxes: &[BoxElement],
    series: &PeriodSeries,
) -> Chart {
    let samples: Vec<Vec<f64>> = boxes
        .iter()
        .map(|b| series.get(&b.period).cloned().unwrap_or_default())
        .collect();
    let names = js_array(boxes.iter().map(|b| b.period.as_str()));
    // Transformed items are named by index; map them back to period ids
    let boxplot_transform = format!(
        r#"{{"type": "boxplot", "config": {{"itemNameFormatter": function (params) {{ return {}[params.value]; }}}}}}"#,
        names
    );
    let dataset = Dataset::new()
        .source(samples)
        .transform(Transform::new().transform(boxplot_transform))
        .transform(
            Transform::new()
                .from_dataset_index(1)
                .from_transform_result(1),
        );

    base_chart(title, subtitle, color, boxes)
        .dataset(dataset)
        .series(Boxplot::new().name(title).dataset_index(1))
        .series(outlier_series().dataset_index(2))
}

/// One box per store from backend-computed statistics, total first
pub(crate) fn aggregate_boxes(resp: &AggregateResponse) -> Vec<BoxElement> {
    let total = resp.total.as_ref().map(|stats| ("total", stats));
    total
        .into_iter()
        .chain(resp.stores.iter().map(|(store, stats)| (store.as_str(), stats)))
        .map(|(label, stats)| {
            let summary = FiveNumberSummary::from(stats);
            BoxElement {
                period: label.to_string(),
                tooltip: tooltip_text(label, &summary),
                summary,
                geometry: BoxGeometry::from(stats),
            }
        })
        .collect()
}

/// Box plot of precomputed boxes; rows are `[name, low, q1, median, q3, high]`
pub(crate) fn aggregate_chart(boxes: &[BoxElement], subtitle: &str) -> Chart {
    const TITLE: &str = "Crawl time by store";
    let rows: Vec<Vec<CompositeValue>> = boxes
        .iter()
        .map(|b| {
            let g = &b.geometry;
            vec![
                CompositeValue::from(b.period.as_str()),
                g.low.into(),
                g.q1.into(),
                g.median.into(),
                g.q3.into(),
                g.high.into(),
            ]
        })
        .collect();
    let outliers = outlier_points(boxes.iter().map(|b| &b.geometry));

    base_chart(TITLE, subtitle, TOTAL_COLORS.border, boxes)
        .dataset(Dataset::new().source(rows))
        .series(Boxplot::new().name(TITLE).dataset_index(0))
        .series(outlier_series().data(outliers))
}

/// `[category index, value]` pairs for the outlier scatter
fn outlier_points<'a>(geometries: impl Iterator<Item = &'a BoxGeometry>) -> Vec<Vec<f64>> {
    geometries
        .enumerate()
        .flat_map(|(i, g)| g.outliers.iter().map(move |&v| vec![i as f64, v]))
        .collect()
}

fn outlier_series() -> Scatter {
    Scatter::new()
        .name("outliers")
        .symbol_size(8.0)
        .item_style(ItemStyle::new().color(COLOR_OUTLIER))
}

/// JSON array literal, valid as JavaScript
fn js_array<'a>(items: impl Iterator<Item = &'a str>) -> String {
    Value::from(items.collect::<Vec<&str>>()).to_string()
}

/// Tooltip for both series. Boxes show their prepared HTML text by index;
/// outlier points `[index, seconds]` show the box name and the duration.
fn tooltip_formatter(boxes: &[BoxElement]) -> Formatter {
    let tips = js_array(boxes.iter().map(|b| b.tooltip.as_str()));
    let escaped: Vec<String> = boxes.iter().map(|b| escape_html(&b.period)).collect();
    let names = js_array(escaped.iter().map(String::as_str));
    let function = format!(
        "function (params) {{ \
var tips = {tips}; var names = {names}; \
if (params.seriesType === 'boxplot') {{ return tips[params.dataIndex]; }} \
var s = params.value[1]; var m = Math.floor(s / 60); var r = Math.round(s - m * 60); \
if (r === 60) {{ m += 1; r = 0; }} \
var t = s < 60 ? s.toFixed(1) + 's' : m + 'm ' + r + 's'; \
return names[params.value[0]] + '<br/>outlier: ' + t; }}"
    );
    Formatter::Function(function.into())
}

fn base_chart(title: &str, subtitle: &str, color: &str, boxes: &[BoxElement]) -> Chart {
    let categories: Vec<String> = boxes.iter().map(|b| b.period.clone()).collect();
    Chart::new()
        .background_color(Color::Value(COLOR_BACKGROUND.to_string()))
        .color(vec![Color::Value(color.to_string())])
        .title(
            Title::new()
                .text(title)
                .subtext(subtitle)
                .left("center")
                .top("2%")
                .text_style(TextStyle::new().color(COLOR_TEXT).font_size(20))
                .subtext_style(TextStyle::new().color(COLOR_TEXT).font_size(14)),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .formatter(tooltip_formatter(boxes)),
        )
        .grid(
            Grid::new()
                .left("4%")
                .right("3%")
                .bottom("8%")
                .top("16%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(categories)
                .axis_label(AxisLabel::new().color(COLOR_TEXT).font_size(12)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name("seconds")
                .name_text_style(TextStyle::new().color(COLOR_TEXT).font_size(12))
                .axis_label(AxisLabel::new().color(COLOR_TEXT).font_size(12))
                .split_line(
                    SplitLine::new().line_style(LineStyle::new().width(0.5).color(COLOR_GRID)),
                ),
        )
}
