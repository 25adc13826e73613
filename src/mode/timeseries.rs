//! Crawl-time timeseries mode: one box plot per store and period

use std::path::Path;
use std::process::ExitCode;

use crate::api::ApiClient;
use crate::chart::{BOX_PANEL_HEIGHT, DashboardPage};
use crate::orchestrator::{Orchestrator, ViewState, fetch};
use crate::output::{print_error, print_legend, print_store_heading};

use super::{print_box_table, write_page};

/// Fetch once, print the per-store tables and optionally write the dashboard
pub(crate) async fn run_timeseries(
    client: &ApiClient,
    days: u32,
    html: Option<&Path>,
    quiet: bool,
) -> ExitCode {
    let mut view = Orchestrator::new(days);
    let (ticket, result) = fetch(client, view.mount()).await;
    view.apply(ticket, result);

    let ok = present(&view, html, quiet);
    view.unmount();
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Print the view and rewrite the page; false when the view failed
pub(super) fn present(view: &Orchestrator, html: Option<&Path>, quiet: bool) -> bool {
    let mut ok = true;
    match view.state() {
        ViewState::Loading => {
            if !quiet {
                println!("Loading crawl times for the last {} days...", view.days());
            }
        }
        ViewState::Failed(message) => {
            print_error(message);
            ok = false;
        }
        ViewState::Empty => println!("No crawl data for the last {} days", view.days()),
        ViewState::Populated => print_view(view, quiet),
    }

    if let Some(path) = html {
        ok &= write_page(&view_page(view), path);
    }
    ok
}

fn print_view(view: &Orchestrator, quiet: bool) {
    println!("Crawl time per period, last {} days", view.days());
    println!();
    let charts = view
        .total()
        .map(|chart| ("total", chart))
        .into_iter()
        .chain(view.panels());
    for (label, chart) in charts {
        print_store_heading(label);
        print_box_table("PERIOD", chart.boxes());
        println!();
    }
    if !quiet {
        print_legend();
    }
}

fn view_page(view: &Orchestrator) -> DashboardPage {
    let mut page = DashboardPage::new(format!("Crawl time, last {} days", view.days()));
    match view.state() {
        ViewState::Loading => page.push_note("Crawl time", format!("Loading the last {} days...", view.days())),
        ViewState::Failed(message) => page.push_note("Crawl time", message.as_str()),
        ViewState::Empty => page.push_note("Crawl time", "No crawl data for this range"),
        ViewState::Populated => {
            let charts = view.total().into_iter().chain(view.panels().map(|(_, c)| c));
            for chart in charts {
                if let (Some(label), Some(instance)) = (chart.label(), chart.chart()) {
                    page.push_chart(label, instance, BOX_PANEL_HEIGHT);
                }
            }
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_view_writes_placeholder_page() {
        let mut view = Orchestrator::new(14);
        view.mount();
        assert_eq!(view.state(), &ViewState::Loading);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.html");
        assert!(present(&view, Some(&path), true));

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Loading the last 14 days..."));
        assert!(html.contains("panel-0"));
        assert!(!html.contains("panel-1"));
    }
}
