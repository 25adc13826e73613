//! Price history line chart (one per item card)

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{
        AxisLabel, AxisType, Color, ItemStyle, LineStyle, SplitLine, TextStyle, Tooltip, Trigger,
    },
    series::Line,
};

use super::colors::{COLOR_BACKGROUND, COLOR_GRID, COLOR_TEXT, store_colors};
use crate::api::HistoryPoint;
use crate::output::{format_price, format_timestamp};

/// Build a price line for one item; points keep the backend's order
pub(crate) fn history_chart(store: &str, item_id: &str, points: &[HistoryPoint]) -> Chart {
    let colors = store_colors(store);
    let labels: Vec<String> = points
        .iter()
        .map(|p| format_timestamp(&p.timestamp))
        .collect();
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();

    let subtitle = match prices_range(points) {
        Some((lo, hi)) => format!("{}  {} - {}", store, format_price(lo), format_price(hi)),
        None => format!("{}  no prices", store),
    };

    Chart::new()
        .background_color(Color::Value(COLOR_BACKGROUND.to_string()))
        .title(
            Title::new()
                .text(item_id)
                .subtext(subtitle)
                .left("center")
                .top("2%")
                .text_style(TextStyle::new().color(COLOR_TEXT).font_size(18))
                .subtext_style(TextStyle::new().color(COLOR_TEXT).font_size(13)),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("4%")
                .right("3%")
                .bottom("8%")
                .top("18%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .boundary_gap(false)
                .data(labels)
                .axis_label(AxisLabel::new().color(COLOR_TEXT).font_size(11)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name("¥")
                .name_text_style(TextStyle::new().color(COLOR_TEXT).font_size(12))
                .axis_label(AxisLabel::new().color(COLOR_TEXT).font_size(11))
                .split_line(
                    SplitLine::new().line_style(LineStyle::new().width(0.5).color(COLOR_GRID)),
                ),
        )
        .series(
            Line::new()
                .name(item_id)
                .data(prices)
                .symbol_size(6)
                .line_style(LineStyle::new().width(2).color(colors.border))
                .item_style(ItemStyle::new().color(colors.fill).border_color(colors.border)),
        )
}

/// Lowest and highest price, `None` without points
pub(crate) fn prices_range(points: &[HistoryPoint]) -> Option<(f64, f64)> {
    points.iter().map(|p| p.price).fold(None, |acc, price| match acc {
        None => Some((price, price)),
        Some((lo, hi)) => Some((lo.min(price), hi.max(price))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: &str, price: f64) -> HistoryPoint {
        HistoryPoint {
            timestamp: timestamp.to_string(),
            price,
        }
    }

    #[test]
    fn test_prices_range() {
        assert_eq!(prices_range(&[]), None);
        let points = [
            point("2024-01-01T00:00:00", 1200.0),
            point("2024-01-02T00:00:00", 980.0),
            point("2024-01-03T00:00:00", 1500.0),
        ];
        assert_eq!(prices_range(&points), Some((980.0, 1500.0)));
    }

    #[test]
    fn test_history_chart_labels_and_colors() {
        let points = [
            point("2024-03-01T08:15:00", 12800.0),
            point("2024-03-02T08:15:00", 11800.0),
        ];
        let chart = history_chart("yodobashi", "sku-1", &points);
        let json = serde_json::to_string(&chart).unwrap();
        assert!(json.contains("03/01 08:15"));
        assert!(json.contains("¥11,800 - ¥12,800"));
        assert!(json.contains(store_colors("yodobashi").border));
    }
}
