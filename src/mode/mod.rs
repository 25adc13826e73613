//! CLI mode implementations

mod boxplot;
mod delete;
mod history;
mod timeseries;
mod watch;

pub(crate) use boxplot::run_boxplot;
pub(crate) use delete::{DeleteOptions, run_delete};
pub(crate) use history::{HistoryOptions, run_history};
pub(crate) use timeseries::run_timeseries;
pub(crate) use watch::run_watch;

use std::path::Path;

use crate::chart::{BoxElement, DashboardPage};
use crate::output::{
    print_axis, print_error, print_separator, print_summary_header, print_summary_row,
    render_strip, strip_offset,
};

/// Summary table with one box strip per row, all strips on a shared scale
pub(super) fn print_box_table(label: &str, boxes: &[BoxElement]) {
    let label_width = boxes
        .iter()
        .map(|b| b.period.chars().count())
        .max()
        .unwrap_or(0)
        .max(label.len());
    let (lo, hi) = value_range(boxes);

    print_summary_header(label, label_width);
    print_separator(label_width, true);
    for b in boxes {
        let strip = render_strip(&b.geometry, lo, hi);
        print_summary_row(&b.period, label_width, &b.summary, Some(&strip));
    }
    print_axis(lo, hi, strip_offset(label_width));
}

/// Smallest and largest value any box draws, outliers included
fn value_range(boxes: &[BoxElement]) -> (f64, f64) {
    boxes
        .iter()
        .flat_map(|b| {
            let g = &b.geometry;
            [g.low, g.high, b.summary.min, b.summary.max]
                .into_iter()
                .chain(g.outliers.iter().copied())
        })
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Render and save the page; a failure is reported but does not end the mode
pub(super) fn write_page(page: &DashboardPage, path: &Path) -> bool {
    match page.save(path) {
        Ok(()) => true,
        Err(e) => {
            print_error(&format!("Failed to write {}: {}", path.display(), e.user_message()));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::BoxGeometry;
    use crate::stats::summarize;

    fn element(period: &str, samples: &[f64], outliers: &[f64]) -> BoxElement {
        let summary = summarize(samples).unwrap();
        BoxElement {
            period: period.to_string(),
            summary,
            geometry: BoxGeometry {
                low: summary.min,
                q1: summary.q1,
                median: summary.median,
                q3: summary.q3,
                high: summary.max,
                outliers: outliers.to_vec(),
            },
            tooltip: String::new(),
        }
    }

    #[test]
    fn test_value_range_includes_outliers() {
        let boxes = [
            element("a", &[10.0, 11.0, 12.0], &[100.0]),
            element("b", &[5.0, 6.0], &[]),
        ];
        assert_eq!(value_range(&boxes), (5.0, 100.0));
    }
}
