//! Chart rendering for crawl-time box plots and price histories

mod boxplot;
mod colors;
mod history;
mod page;

pub(crate) use boxplot::{
    BoxElement, BoxGeometry, SeriesChart, SeriesInput, aggregate_boxes, aggregate_chart,
};
pub(crate) use colors::{TOTAL_COLORS, store_colors};
pub(crate) use history::{history_chart, prices_range};
pub(crate) use page::DashboardPage;

/// Panel heights in the dashboard page
pub(crate) const BOX_PANEL_HEIGHT: u32 = 480;
pub(crate) const HISTORY_PANEL_HEIGHT: u32 = 320;
