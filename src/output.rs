//! Terminal output: tables, box strips and value formatting

use chrono::{DateTime, NaiveDateTime};
use colored::*;

use crate::chart::BoxGeometry;
use crate::stats::FiveNumberSummary;

/// Width of the ASCII box strip drawn next to each table row
pub(crate) const STRIP_WIDTH: usize = 40;

const COLUMN_WIDTH: usize = 9;

fn style_label(label: &str) -> ColoredString {
    label.bold()
}

pub(crate) fn print_error(msg: &str) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

pub(crate) fn print_warning(msg: &str) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

/// Crawl duration for tables and tooltips: `45.0s`, `2m 5s`
pub(crate) fn format_time(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }
    let (mins, secs) = split_minutes(seconds);
    format!("{}m {}s", mins, secs)
}

/// Crawl duration for axis ticks; whole minutes drop the seconds segment
pub(crate) fn format_time_axis(seconds: f64) -> String {
    if seconds < 60.0 {
        return format_time(seconds);
    }
    match split_minutes(seconds) {
        (mins, 0) => format!("{}m", mins),
        (mins, secs) => format!("{}m {}s", mins, secs),
    }
}

fn split_minutes(seconds: f64) -> (u64, u64) {
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds - mins as f64 * 60.0).round() as u64;
    // 119.6s rounds up into the next minute
    if secs == 60 { (mins + 1, 0) } else { (mins, secs) }
}

/// Yen with thousands separators, e.g. `¥12,800`
pub(crate) fn format_price(price: f64) -> String {
    let rounded = price.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

/// `MM/DD HH:MM` for RFC 3339 or naive ISO timestamps; anything else is shown as-is
pub(crate) fn format_timestamp(timestamp: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.format("%m/%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, pattern) {
            return dt.format("%m/%d %H:%M").to_string();
        }
    }
    timestamp.to_string()
}

/// Column where the box strip of a summary row starts
pub(crate) fn strip_offset(label_width: usize) -> usize {
    label_width + 6 + 5 * COLUMN_WIDTH + 2
}

pub(crate) fn print_separator(label_width: usize, with_strip: bool) {
    let width = if with_strip {
        strip_offset(label_width) + STRIP_WIDTH
    } else {
        label_width + 6 + 5 * COLUMN_WIDTH
    };
    println!("{}", "-".repeat(width));
}

pub(crate) fn print_summary_header(label: &str, label_width: usize) {
    print!("{:<label_width$}", label, label_width = label_width);
    print!(" {:>5}", "N");
    for column in ["MIN", "Q1", "MED", "Q3", "MAX"] {
        print!("{:>width$}", column, width = COLUMN_WIDTH);
    }
    println!();
}

pub(crate) fn print_summary_row(
    label: &str,
    label_width: usize,
    summary: &FiveNumberSummary,
    strip: Option<&str>,
) {
    print!("{:<label_width$}", label, label_width = label_width);
    print!(" {:>5}", summary.count);
    for value in [
        summary.min,
        summary.q1,
        summary.median,
        summary.q3,
        summary.max,
    ] {
        print!("{:>width$}", format_time(value), width = COLUMN_WIDTH);
    }
    if let Some(strip) = strip {
        print!("  {}", strip);
    }
    println!();
}

pub(crate) fn print_store_heading(store: &str) {
    println!("{}", style_label(&format!("[{}]", store)));
}

/// Draw `|---[==|==]---|` scaled to `lo..hi`
pub(crate) fn render_strip(geometry: &BoxGeometry, lo: f64, hi: f64) -> String {
    let mut cells = vec![' '; STRIP_WIDTH];
    let span = (hi - lo).max(f64::EPSILON);
    let pos = |v: f64| -> usize {
        let ratio = ((v - lo) / span).clamp(0.0, 1.0);
        (ratio * (STRIP_WIDTH - 1) as f64).round() as usize
    };

    // Backend statistics are not guaranteed to be ordered
    let mut marks = [
        pos(geometry.low),
        pos(geometry.q1),
        pos(geometry.median),
        pos(geometry.q3),
        pos(geometry.high),
    ];
    marks.sort_unstable();
    let [low, q1, median, q3, high] = marks;
    for cell in &mut cells[low..=high] {
        *cell = '-';
    }
    for cell in &mut cells[q1..=q3] {
        *cell = '=';
    }
    cells[low] = '|';
    cells[high] = '|';
    cells[q1] = '[';
    cells[q3] = ']';
    cells[median] = '#';
    for outlier in &geometry.outliers {
        cells[pos(*outlier)] = 'o';
    }
    cells.into_iter().collect()
}

/// Tick row aligned under the strips of a table
pub(crate) fn print_axis(lo: f64, hi: f64, indent: usize) {
    let mut row = vec![' '; STRIP_WIDTH + 12];
    let ticks = axis_ticks(lo, hi, 4);
    let span = (hi - lo).max(f64::EPSILON);
    for tick in ticks {
        let at = (((tick - lo) / span).clamp(0.0, 1.0) * (STRIP_WIDTH - 1) as f64).round() as usize;
        let label = format_time_axis(tick);
        let start = at.min(row.len().saturating_sub(label.len()));
        if row[start..start + label.len()].iter().any(|c| *c != ' ') {
            continue;
        }
        for (i, ch) in label.chars().enumerate() {
            row[start + i] = ch;
        }
    }
    let row: String = row.into_iter().collect();
    println!("{}{}", " ".repeat(indent), row.trim_end());
}

/// Evenly spaced ticks on a 1/2/5 x 10^k step
pub(crate) fn axis_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if hi <= lo || target == 0 {
        return vec![lo];
    }
    let raw_step = (hi - lo) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let mut ticks = Vec::new();
    let mut tick = (lo / step).ceil() * step;
    while tick <= hi + step * 1e-9 {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

pub(crate) fn print_legend() {
    println!("N: number of crawls in the period");
    println!("MIN/Q1/MED/Q3/MAX: crawl time five-number summary");
    println!("Strip: |--- whiskers, [==] Q1..Q3, # median, o outlier");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_sub_minute() {
        assert_eq!(format_time(45.0), "45.0s");
        assert_eq!(format_time(0.0), "0.0s");
        assert_eq!(format_time(12.34), "12.3s");
    }

    #[test]
    fn test_format_time_minutes() {
        assert_eq!(format_time(125.0), "2m 5s");
        assert_eq!(format_time(120.0), "2m 0s");
        assert_eq!(format_time(60.0), "1m 0s");
    }

    #[test]
    fn test_format_time_rounds_into_next_minute() {
        assert_eq!(format_time(119.6), "2m 0s");
    }

    #[test]
    fn test_format_time_axis_drops_zero_seconds() {
        assert_eq!(format_time_axis(120.0), "2m");
        assert_eq!(format_time_axis(125.0), "2m 5s");
        assert_eq!(format_time_axis(45.0), "45.0s");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "¥0");
        assert_eq!(format_price(980.0), "¥980");
        assert_eq!(format_price(12800.0), "¥12,800");
        assert_eq!(format_price(1234567.4), "¥1,234,567");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-01-05T09:30:00+09:00"), "01/05 09:30");
        assert_eq!(format_timestamp("2024-01-05T09:30:00.123456"), "01/05 09:30");
        assert_eq!(format_timestamp("2024-01-05 18:00:00"), "01/05 18:00");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_axis_ticks_nice_steps() {
        assert_eq!(axis_ticks(0.0, 100.0, 4), vec![0.0, 50.0, 100.0]);
        assert_eq!(axis_ticks(0.0, 40.0, 4), vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(axis_ticks(5.0, 5.0, 4), vec![5.0]);
    }

    #[test]
    fn test_render_strip_marks() {
        let geometry = BoxGeometry {
            low: 0.0,
            q1: 10.0,
            median: 20.0,
            q3: 30.0,
            high: 39.0,
            outliers: vec![],
        };
        let strip = render_strip(&geometry, 0.0, 39.0);
        assert_eq!(strip.chars().count(), STRIP_WIDTH);
        assert!(strip.starts_with('|'));
        assert!(strip.ends_with('|'));
        assert_eq!(strip.matches('#').count(), 1);
        assert!(strip.find('[').unwrap() < strip.find('#').unwrap());
        assert!(strip.find('#').unwrap() < strip.find(']').unwrap());
    }

    #[test]
    fn test_render_strip_unordered_stats() {
        let geometry = BoxGeometry {
            low: 30.0,
            q1: 35.0,
            median: 20.0,
            q3: 5.0,
            high: 10.0,
            outliers: vec![f64::NAN],
        };
        let strip = render_strip(&geometry, 0.0, 39.0);
        assert_eq!(strip.chars().count(), STRIP_WIDTH);
        assert_eq!(strip.matches('#').count(), 1);
        assert!(strip.find('[').unwrap() < strip.find(']').unwrap());
    }
}
