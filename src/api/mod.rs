//! HTTP client for the price tracker backend

mod models;

pub(crate) use models::{
    AggregateResponse, BoxStats, DeletePreview, DeleteRequest, DeleteResult, HistoryPoint,
    PeriodSeries, TimeseriesResponse,
};

use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

const METRICS_SEGMENTS: [&str; 4] = ["price", "api", "metrics", "crawl-time"];
const ITEMS_SEGMENTS: [&str; 3] = ["price", "api", "items"];

/// Thin typed wrapper over the backend's JSON endpoints
pub(crate) struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.api_base)
            .map_err(|e| Error::Config(format!("invalid API base '{}': {}", config.api_base, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "invalid API base '{}'",
                config.api_base
            )));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { base, http })
    }

    /// Build an endpoint URL; segments are percent-encoded individually
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn metrics_url(&self, name: &str) -> Url {
        self.endpoint(METRICS_SEGMENTS.into_iter().chain([name]))
    }

    fn item_url(&self, store: &str, item_id: &str, action: &str) -> Url {
        self.endpoint(ITEMS_SEGMENTS.into_iter().chain([store, item_id, action]))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, days: u32) -> Result<T> {
        debug!(%url, days, "GET");
        let resp = self
            .http
            .get(url)
            .query(&[("days", days)])
            .send()
            .await?;
        let resp = check_status(resp)?;
        Ok(resp.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: Url, body: &B) -> Result<T> {
        debug!(%url, "POST");
        let resp = self.http.post(url).json(body).send().await?;
        let resp = check_status(resp)?;
        Ok(resp.json().await?)
    }

    pub(crate) async fn crawl_time_boxplot(&self, days: u32) -> Result<AggregateResponse> {
        self.get_json(self.metrics_url("boxplot"), days).await
    }

    pub(crate) async fn crawl_time_timeseries(&self, days: u32) -> Result<TimeseriesResponse> {
        self.get_json(self.metrics_url("timeseries-boxplot"), days)
            .await
    }

    pub(crate) async fn item_history(
        &self,
        store: &str,
        item_id: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>> {
        self.get_json(self.item_url(store, item_id, "history"), days)
            .await
    }

    pub(crate) async fn delete_preview(
        &self,
        store: &str,
        item_id: &str,
        record_ids: &[i64],
    ) -> Result<DeletePreview> {
        let body = DeleteRequest {
            record_ids,
            password: None,
        };
        self.post_json(self.item_url(store, item_id, "delete-preview"), &body)
            .await
    }

    pub(crate) async fn delete_records(
        &self,
        store: &str,
        item_id: &str,
        record_ids: &[i64],
        password: Option<&str>,
    ) -> Result<DeleteResult> {
        let body = DeleteRequest {
            record_ids,
            password,
        };
        self.post_json(self.item_url(store, item_id, "delete"), &body)
            .await
    }
}

/// Map non-2xx answers to errors; 401/403 become authentication failures
fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Authentication(format!("{} returned {}", url, status)));
    }
    Err(Error::Status { status, url })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        let config = Config::new("http://tracker.local:8000/", 5).unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_metrics_url() {
        let url = client().metrics_url("timeseries-boxplot");
        assert_eq!(
            url.as_str(),
            "http://tracker.local:8000/price/api/metrics/crawl-time/timeseries-boxplot"
        );
    }

    #[test]
    fn test_item_url_escapes_segments() {
        let url = client().item_url("yodobashi", "sku 42/a", "history");
        assert_eq!(
            url.as_str(),
            "http://tracker.local:8000/price/api/items/yodobashi/sku%2042%2Fa/history"
        );
    }

    #[test]
    fn test_timeseries_keeps_response_order() {
        let json = r#"{
            "periods": ["2024-01-02", "2024-01-01"],
            "total": {"2024-01-02": [1.0], "2024-01-01": []},
            "stores": {"zeta": {"2024-01-02": [3.0]}, "alpha": {}}
        }"#;
        let resp: TimeseriesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.periods, vec!["2024-01-02", "2024-01-01"]);
        let stores: Vec<&String> = resp.stores.keys().collect();
        assert_eq!(stores, vec!["zeta", "alpha"]);
        let totals: Vec<&String> = resp.total.keys().collect();
        assert_eq!(totals, vec!["2024-01-02", "2024-01-01"]);
    }

    #[test]
    fn test_aggregate_defaults() {
        let json = r#"{
            "stores": {"amazon": {"min": 1, "q1": 2, "median": 3, "q3": 4, "max": 5}},
            "total": null
        }"#;
        let resp: AggregateResponse = serde_json::from_str(json).unwrap();
        let stats = &resp.stores["amazon"];
        assert_eq!(stats.count, 0);
        assert!(stats.outliers.is_empty());
        assert!(resp.total.is_none());
    }

    #[test]
    fn test_delete_request_omits_missing_password() {
        let body = DeleteRequest {
            record_ids: &[1, 2],
            password: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"record_ids":[1,2]}"#);
    }
}
