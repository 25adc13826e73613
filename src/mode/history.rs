//! Price history mode: lazily loaded item cards

use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use crate::api::ApiClient;
use crate::chart::{DashboardPage, HISTORY_PANEL_HEIGHT, history_chart, prices_range};
use crate::config::Viewport;
use crate::gate::GateState;
use crate::history::{HistorySection, ItemHistory};
use crate::output::{format_price, format_timestamp, print_error, print_store_heading};

use super::write_page;

pub(crate) struct HistoryOptions<'a> {
    pub(crate) store: &'a str,
    pub(crate) items: &'a [String],
    pub(crate) days: u32,
    pub(crate) page_size: usize,
    /// Scroll offsets (px) visited after the initial render, in order
    pub(crate) scrolls: &'a [u32],
    /// Day range switched to after scrolling
    pub(crate) switch_days: Option<u32>,
    pub(crate) html: Option<&'a Path>,
}

pub(crate) async fn run_history(
    client: &ApiClient,
    opts: &HistoryOptions<'_>,
    viewport: Viewport,
    quiet: bool,
) -> ExitCode {
    let mut section = HistorySection::new(opts.store, opts.items, opts.days, opts.page_size, viewport);
    section.mount(client, 0).await;
    for &top in opts.scrolls {
        section.scroll(client, top).await;
    }
    if let Some(days) = opts.switch_days {
        section.set_days(client, days).await;
    }
    for page in section.pages() {
        debug!(page = page.index, fetches = page.fetch_count(), "history page settled");
    }

    let mut ok = print_section(&section, quiet);
    if let Some(path) = opts.html {
        ok &= write_page(&section_page(&section), path);
    }
    section.unmount();

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Print every page; false when a page failed to load
fn print_section(section: &HistorySection, quiet: bool) -> bool {
    let mut ok = true;
    print_store_heading(section.store());
    if !quiet {
        println!("Price history, last {} days", section.days());
    }
    for page in section.pages() {
        match page.state() {
            GateState::Loaded(items) => {
                for item in items {
                    print_card(item);
                }
            }
            GateState::Error(message) => {
                print_error(&format!("page {}: {}", page.index + 1, message));
                ok = false;
            }
            GateState::Hidden | GateState::Triggered | GateState::Loading => {
                println!(
                    "  page {}: not loaded ({})",
                    page.index + 1,
                    page.items.join(", ")
                );
            }
        }
    }
    ok
}

fn print_card(item: &ItemHistory) {
    let (Some(first), Some(last), Some((lo, hi))) = (
        item.points.first(),
        item.points.last(),
        prices_range(&item.points),
    ) else {
        println!("  {}: no price data", item.item_id);
        return;
    };
    println!(
        "  {}: {} points, latest {}, min {}, max {} ({} - {})",
        item.item_id,
        item.points.len(),
        format_price(last.price),
        format_price(lo),
        format_price(hi),
        format_timestamp(&first.timestamp),
        format_timestamp(&last.timestamp)
    );
}

fn section_page(section: &HistorySection) -> DashboardPage {
    let mut page = DashboardPage::new(format!("Price history: {}", section.store()));
    for history_page in section.pages() {
        match history_page.state() {
            GateState::Loaded(items) => {
                for item in items {
                    if item.points.is_empty() {
                        page.push_note(item.item_id.as_str(), "No price data");
                    } else {
                        let chart = history_chart(section.store(), &item.item_id, &item.points);
                        page.push_chart(item.item_id.as_str(), &chart, HISTORY_PANEL_HEIGHT);
                    }
                }
            }
            GateState::Error(message) => {
                page.push_note(format!("Page {}", history_page.index + 1), message.as_str());
            }
            GateState::Hidden | GateState::Triggered | GateState::Loading => {
                page.push_note(
                    format!("Page {}", history_page.index + 1),
                    format!("Not loaded yet: {}", history_page.items.join(", ")),
                );
            }
        }
    }
    page
}
