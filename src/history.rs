//! Price history section: item cards laid out in pages, each page loaded lazily

use futures::future::join_all;
use tracing::debug;

use crate::api::{ApiClient, HistoryPoint};
use crate::config::Viewport;
use crate::error::Result;
use crate::gate::{GateState, LazyGate, LoadTicket, ViewportObserver, load_collection};

/// Height of one item card in the page layout, in px
pub(crate) const CARD_HEIGHT: u32 = 160;

pub(crate) trait HistorySource {
    async fn item_history(&self, store: &str, item_id: &str, days: u32) -> Result<Vec<HistoryPoint>>;
}

impl HistorySource for ApiClient {
    async fn item_history(&self, store: &str, item_id: &str, days: u32) -> Result<Vec<HistoryPoint>> {
        ApiClient::item_history(self, store, item_id, days).await
    }
}

/// One item's price points; empty when its fetch failed
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ItemHistory {
    pub(crate) item_id: String,
    pub(crate) points: Vec<HistoryPoint>,
}

pub(crate) struct HistoryPage {
    pub(crate) index: usize,
    pub(crate) items: Vec<String>,
    gate: LazyGate<ViewportObserver, Vec<ItemHistory>>,
}

impl HistoryPage {
    pub(crate) fn state(&self) -> &GateState<Vec<ItemHistory>> {
        self.gate.state()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.gate.fetch_count()
    }
}

/// Layout coordinates saturate instead of wrapping
fn to_px(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub(crate) struct HistorySection {
    store: String,
    days: u32,
    pages: Vec<HistoryPage>,
}

impl HistorySection {
    pub(crate) fn new(
        store: &str,
        items: &[String],
        days: u32,
        page_size: usize,
        viewport: Viewport,
    ) -> Self {
        let page_size = page_size.max(1);
        let page_height = CARD_HEIGHT.saturating_mul(to_px(page_size));
        let pages = items
            .chunks(page_size)
            .enumerate()
            .map(|(index, chunk)| {
                let top = to_px(index).saturating_mul(page_height);
                let observer = ViewportObserver::new(top, page_height, viewport.height);
                HistoryPage {
                    index,
                    items: chunk.to_vec(),
                    gate: LazyGate::new(observer, viewport.margin),
                }
            })
            .collect();

        Self {
            store: store.to_string(),
            days,
            pages,
        }
    }

    pub(crate) fn store(&self) -> &str {
        &self.store
    }

    pub(crate) fn days(&self) -> u32 {
        self.days
    }

    pub(crate) fn pages(&self) -> &[HistoryPage] {
        &self.pages
    }

    /// Mount every page at the initial scroll offset and load the ones in range
    pub(crate) async fn mount<S: HistorySource>(&mut self, source: &S, scroll_top: u32) {
        for page in &mut self.pages {
            page.gate.mount(scroll_top);
        }
        self.load_triggered(source).await;
    }

    pub(crate) async fn scroll<S: HistorySource>(&mut self, source: &S, scroll_top: u32) {
        for page in &mut self.pages {
            page.gate.on_scroll(scroll_top);
        }
        self.load_triggered(source).await;
    }

    /// New day range: pages that already loaded reload, hidden pages wait
    pub(crate) async fn set_days<S: HistorySource>(&mut self, source: &S, days: u32) {
        if days == self.days {
            return;
        }
        self.days = days;
        let jobs = self
            .pages
            .iter_mut()
            .enumerate()
            .filter_map(|(i, page)| page.gate.params_changed().map(|ticket| (i, ticket)))
            .collect();
        self.run(source, jobs).await;
    }

    pub(crate) fn unmount(&mut self) {
        for page in &mut self.pages {
            page.gate.unmount();
        }
    }

    async fn load_triggered<S: HistorySource>(&mut self, source: &S) {
        let jobs = self
            .pages
            .iter_mut()
            .enumerate()
            .filter_map(|(i, page)| page.gate.begin_load().map(|ticket| (i, ticket)))
            .collect();
        self.run(source, jobs).await;
    }

    /// Load the given pages concurrently, then apply each result to its gate
    async fn run<S: HistorySource>(&mut self, source: &S, jobs: Vec<(usize, LoadTicket)>) {
        if jobs.is_empty() {
            return;
        }
        let store = self.store.as_str();
        let days = self.days;
        let pages = &self.pages;
        let loads = jobs.iter().map(|&(i, _)| {
            let items = &pages[i].items;
            debug!(store, page = i, items = items.len(), days, "loading history page");
            load_collection(items, move |item: &String| {
                let item = item.clone();
                async move { source.item_history(store, &item, days).await }
            })
        });
        let results = join_all(loads).await;

        for ((i, ticket), result) in jobs.into_iter().zip(results) {
            let result = result
                .map(|loaded| {
                    loaded
                        .into_iter()
                        .map(|(item_id, points)| ItemHistory { item_id, points })
                        .collect()
                })
                .map_err(|e| e.user_message());
            self.pages[i].gate.finish(ticket, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::error::Error;

    /// Records every request; item ids starting with "broken" fail
    struct FakeSource {
        calls: RefCell<Vec<(String, u32)>>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.borrow().clone()
        }
    }

    impl HistorySource for FakeSource {
        async fn item_history(&self, _store: &str, item_id: &str, days: u32) -> Result<Vec<HistoryPoint>> {
            self.calls.borrow_mut().push((item_id.to_string(), days));
            if item_id.starts_with("broken") {
                return Err(Error::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    url: format!("http://localhost/{}", item_id),
                });
            }
            Ok(vec![HistoryPoint {
                timestamp: "2024-01-01T00:00:00".to_string(),
                price: days as f64,
            }])
        }
    }

    fn items(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("sku-{}", i)).collect()
    }

    fn viewport() -> Viewport {
        Viewport {
            height: 400,
            margin: 100,
        }
    }

    #[tokio::test]
    async fn test_only_pages_near_viewport_load() {
        let source = FakeSource::new();
        // Pages of 2 cards are 320px tall: 0..320, 320..640, 640..960
        let mut section = HistorySection::new("amazon", &items(6), 7, 2, viewport());
        section.mount(&source, 0).await;

        assert!(matches!(section.pages()[0].state(), GateState::Loaded(_)));
        assert!(matches!(section.pages()[1].state(), GateState::Loaded(_)));
        assert_eq!(*section.pages()[2].state(), GateState::Hidden);
        assert_eq!(source.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_huge_page_size_saturates_layout() {
        let source = FakeSource::new();
        let mut section = HistorySection::new("amazon", &items(3), 7, 30_000_000, viewport());
        assert_eq!(section.pages().len(), 1);
        assert_eq!(section.pages()[0].items.len(), 3);

        section.mount(&source, 0).await;
        assert!(matches!(section.pages()[0].state(), GateState::Loaded(_)));
        assert_eq!(source.calls().len(), 3);
    }

    #[test]
    fn test_layout_px_saturates() {
        assert_eq!(to_px(5), 5);
        assert_eq!(to_px(usize::MAX), u32::MAX);
        assert_eq!(CARD_HEIGHT.saturating_mul(to_px(30_000_000)), u32::MAX);
    }

    #[tokio::test]
    async fn test_scrolling_loads_each_page_once() {
        let source = FakeSource::new();
        let mut section = HistorySection::new("amazon", &items(6), 7, 2, viewport());
        section.mount(&source, 0).await;
        for top in [200, 300, 400, 300] {
            section.scroll(&source, top).await;
        }

        for page in section.pages() {
            assert!(matches!(page.state(), GateState::Loaded(_)));
            assert_eq!(page.fetch_count(), 1);
        }
        assert_eq!(source.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_failed_item_shows_empty_series() {
        let source = FakeSource::new();
        let list = vec!["sku-1".to_string(), "broken-2".to_string()];
        let mut section = HistorySection::new("rakuten", &list, 7, 3, viewport());
        section.mount(&source, 0).await;

        let GateState::Loaded(loaded) = section.pages()[0].state() else {
            panic!("page should be loaded");
        };
        assert_eq!(loaded[0].points.len(), 1);
        assert_eq!(loaded[1].item_id, "broken-2");
        assert!(loaded[1].points.is_empty());
    }

    #[tokio::test]
    async fn test_page_of_failures_is_an_error() {
        let source = FakeSource::new();
        let list = vec!["broken-1".to_string(), "broken-2".to_string()];
        let mut section = HistorySection::new("rakuten", &list, 7, 3, viewport());
        section.mount(&source, 0).await;
        assert_eq!(
            *section.pages()[0].state(),
            GateState::Error("Failed to load data from the server".to_string())
        );
    }

    #[tokio::test]
    async fn test_day_change_reloads_loaded_pages_only() {
        let source = FakeSource::new();
        let mut section = HistorySection::new("amazon", &items(6), 7, 2, viewport());
        section.mount(&source, 0).await;
        section.set_days(&source, 30).await;

        let reloaded: Vec<(String, u32)> = source
            .calls()
            .into_iter()
            .filter(|(_, days)| *days == 30)
            .collect();
        assert_eq!(reloaded.len(), 4);
        assert_eq!(*section.pages()[2].state(), GateState::Hidden);
        assert_eq!(section.pages()[0].fetch_count(), 2);

        // The hidden page fetches with the new range once it comes into view
        section.scroll(&source, 400).await;
        assert_eq!(source.calls().last().map(|(_, d)| *d), Some(30));
    }

    #[tokio::test]
    async fn test_unmount_stops_loading() {
        let source = FakeSource::new();
        let mut section = HistorySection::new("amazon", &items(6), 7, 2, viewport());
        section.unmount();
        section.scroll(&source, 0).await;
        assert!(source.calls().is_empty());
    }
}
