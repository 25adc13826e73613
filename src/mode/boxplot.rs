//! Aggregate crawl-time mode: one box per store over the whole range

use std::path::Path;
use std::process::ExitCode;

use tracing::warn;

use crate::api::ApiClient;
use crate::chart::{BOX_PANEL_HEIGHT, BoxElement, DashboardPage, aggregate_boxes, aggregate_chart};
use crate::output::{print_error, print_legend};

use super::{print_box_table, write_page};

pub(crate) async fn run_boxplot(
    client: &ApiClient,
    days: u32,
    html: Option<&Path>,
    quiet: bool,
) -> ExitCode {
    let resp = match client.crawl_time_boxplot(days).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(days, error = %e, "boxplot fetch failed");
            print_error(&e.user_message());
            return ExitCode::FAILURE;
        }
    };
    let boxes = aggregate_boxes(&resp);

    if boxes.is_empty() {
        println!("No crawl data for the last {} days", days);
    } else {
        println!("Crawl time by store, last {} days", days);
        println!();
        print_box_table("STORE", &boxes);
        print_outliers(&boxes);
        if !quiet {
            println!();
            print_legend();
        }
    }

    if let Some(path) = html
        && !write_page(&page(&boxes, days), path)
    {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_outliers(boxes: &[BoxElement]) {
    let counts: Vec<String> = boxes
        .iter()
        .filter(|b| !b.geometry.outliers.is_empty())
        .map(|b| format!("{} {}", b.period, b.geometry.outliers.len()))
        .collect();
    if !counts.is_empty() {
        println!("Outliers: {}", counts.join(", "));
    }
}

fn page(boxes: &[BoxElement], days: u32) -> DashboardPage {
    let mut page = DashboardPage::new(format!("Crawl time by store, last {} days", days));
    if boxes.is_empty() {
        page.push_note("Crawl time by store", "No crawl data for this range");
    } else {
        let subtitle = format!("last {} days", days);
        page.push_chart("Crawl time by store", &aggregate_chart(boxes, &subtitle), BOX_PANEL_HEIGHT);
    }
    page
}
