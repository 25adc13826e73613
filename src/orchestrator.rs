//! Fetch/render lifecycle of the crawl-time timeseries view.
//!
//! Every dependency change (mount, day range, refresh token) issues a
//! [`FetchTicket`]. Only the most recent ticket may apply its response, so a
//! slow request that was superseded never overwrites newer data.

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::api::{ApiClient, PeriodSeries, TimeseriesResponse};
use crate::chart::{SeriesChart, SeriesInput, TOTAL_COLORS, store_colors};
use crate::error::Result;

pub(crate) trait TimeseriesSource {
    async fn crawl_time_timeseries(&self, days: u32) -> Result<TimeseriesResponse>;
}

impl TimeseriesSource for ApiClient {
    async fn crawl_time_timeseries(&self, days: u32) -> Result<TimeseriesResponse> {
        ApiClient::crawl_time_timeseries(self, days).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchTicket {
    generation: u64,
    pub(crate) days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ViewState {
    Loading,
    Empty,
    Populated,
    Failed(String),
}

pub(crate) struct Orchestrator {
    days: u32,
    refresh_token: u64,
    generation: u64,
    mounted: bool,
    state: ViewState,
    total: Option<SeriesChart>,
    panels: IndexMap<String, SeriesChart>,
}

impl Orchestrator {
    pub(crate) fn new(days: u32) -> Self {
        Self {
            days,
            refresh_token: 0,
            generation: 0,
            mounted: false,
            state: ViewState::Loading,
            total: None,
            panels: IndexMap::new(),
        }
    }

    pub(crate) fn mount(&mut self) -> FetchTicket {
        self.mounted = true;
        self.issue()
    }

    /// Change the day range; `None` when unchanged or not mounted
    pub(crate) fn set_days(&mut self, days: u32) -> Option<FetchTicket> {
        if !self.mounted || days == self.days {
            return None;
        }
        self.days = days;
        Some(self.issue())
    }

    /// Bump the refresh token, refetching the current range
    pub(crate) fn refresh(&mut self) -> Option<FetchTicket> {
        if !self.mounted {
            return None;
        }
        self.refresh_token += 1;
        Some(self.issue())
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = ViewState::Loading;
        debug!(
            generation = self.generation,
            days = self.days,
            refresh = self.refresh_token,
            "issuing timeseries fetch"
        );
        FetchTicket {
            generation: self.generation,
            days: self.days,
        }
    }

    /// Apply a finished fetch. Returns false (and changes nothing) when the
    /// ticket was superseded or the view is unmounted.
    pub(crate) fn apply(&mut self, ticket: FetchTicket, result: Result<TimeseriesResponse>) -> bool {
        if !self.mounted || ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                days = ticket.days,
                "discarding stale timeseries response"
            );
            return false;
        }

        match result {
            Ok(resp) => self.render(resp),
            Err(e) => {
                warn!(days = ticket.days, error = %e, "timeseries fetch failed");
                self.total = None;
                self.panels.clear();
                self.state = ViewState::Failed(e.user_message());
            }
        }
        true
    }

    fn render(&mut self, resp: TimeseriesResponse) {
        let subtitle = format!("last {} days", self.days);

        self.total = if has_data(&resp.periods, &resp.total) {
            let input = Rc::new(SeriesInput {
                label: "total".to_string(),
                subtitle: subtitle.clone(),
                periods: resp.periods.clone(),
                series: resp.total,
                color: TOTAL_COLORS.border,
            });
            let mut chart = self.total.take().unwrap_or_else(SeriesChart::new);
            chart.update(&input);
            Some(chart)
        } else {
            None
        };

        let mut panels = IndexMap::new();
        for (store, series) in resp.stores {
            if !has_data(&resp.periods, &series) {
                debug!(store = %store, "skipping store without samples");
                continue;
            }
            let input = Rc::new(SeriesInput {
                label: store.clone(),
                subtitle: subtitle.clone(),
                periods: resp.periods.clone(),
                color: store_colors(&store).border,
                series,
            });
            let mut chart = self.panels.shift_remove(&store).unwrap_or_else(SeriesChart::new);
            chart.update(&input);
            panels.insert(store, chart);
        }
        // Charts of stores that disappeared are disposed on drop
        self.panels = panels;

        self.state = if self.panels.is_empty() && self.total.is_none() {
            ViewState::Empty
        } else {
            ViewState::Populated
        };
        debug!(stores = self.panels.len(), state = ?self.state, "timeseries rendered");
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
        self.total = None;
        self.panels.clear();
    }

    pub(crate) fn state(&self) -> &ViewState {
        &self.state
    }

    pub(crate) fn days(&self) -> u32 {
        self.days
    }

    pub(crate) fn total(&self) -> Option<&SeriesChart> {
        self.total.as_ref()
    }

    pub(crate) fn panels(&self) -> impl Iterator<Item = (&str, &SeriesChart)> {
        self.panels.iter().map(|(store, chart)| (store.as_str(), chart))
    }
}

/// At least one listed period has samples
fn has_data(periods: &[String], series: &PeriodSeries) -> bool {
    periods
        .iter()
        .any(|p| series.get(p).is_some_and(|samples| !samples.is_empty()))
}

/// Run the fetch a ticket describes, handing the ticket back with the result
pub(crate) async fn fetch<S: TimeseriesSource>(
    source: &S,
    ticket: FetchTicket,
) -> (FetchTicket, Result<TimeseriesResponse>) {
    let result = source.crawl_time_timeseries(ticket.days).await;
    (ticket, result)
}
