//! JSON contract of the tracker backend

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Crawl durations in seconds, keyed by period id in response order
pub(crate) type PeriodSeries = IndexMap<String, Vec<f64>>;

/// `GET /price/api/metrics/crawl-time/timeseries-boxplot`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(crate) struct TimeseriesResponse {
    #[serde(default)]
    pub(crate) periods: Vec<String>,
    #[serde(default)]
    pub(crate) total: PeriodSeries,
    #[serde(default)]
    pub(crate) stores: IndexMap<String, PeriodSeries>,
}

/// Box statistics computed by the backend
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct BoxStats {
    pub(crate) min: f64,
    pub(crate) q1: f64,
    pub(crate) median: f64,
    pub(crate) q3: f64,
    pub(crate) max: f64,
    #[serde(default)]
    pub(crate) count: usize,
    #[serde(default)]
    pub(crate) outliers: Vec<f64>,
}

/// `GET /price/api/metrics/crawl-time/boxplot`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(crate) struct AggregateResponse {
    #[serde(default)]
    pub(crate) stores: IndexMap<String, BoxStats>,
    #[serde(default)]
    pub(crate) total: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct HistoryPoint {
    pub(crate) timestamp: String,
    pub(crate) price: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct DeletePreview {
    pub(crate) record_count: u64,
    pub(crate) event_count: u64,
    #[serde(default)]
    pub(crate) prices: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct DeleteResult {
    pub(crate) deleted_records: u64,
    pub(crate) deleted_events: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    pub(crate) record_ids: &'a [i64],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) password: Option<&'a str>,
}
