//! Common test utilities: an in-process fake of the tracker backend

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Notify;

/// Password the fake accepts for the `locked` item
pub const LOCKED_PASSWORD: &str = "hunter2";

/// Longest the `days=7` timeseries response waits for another range to be requested
pub const SLOW_RESPONSE_LIMIT: Duration = Duration::from_secs(10);

#[derive(Clone, Default)]
struct Counters {
    deletes: Arc<AtomicUsize>,
    /// Signalled once any other timeseries range has been requested
    other_range: Arc<Notify>,
}

pub struct FakeBackend {
    pub base: String,
    deletes: Arc<AtomicUsize>,
}

impl FakeBackend {
    /// Number of delete requests that reached the backend
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

/// Serve the fake on an ephemeral port from a background thread
pub fn spawn_backend() -> FakeBackend {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let counters = Counters::default();
    let deletes = Arc::clone(&counters.deletes);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router(counters)).await.unwrap();
        });
    });

    FakeBackend {
        base: format!("http://{}", addr),
        deletes,
    }
}

fn router(counters: Counters) -> Router {
    Router::new()
        .route("/price/api/metrics/crawl-time/boxplot", get(boxplot))
        .route(
            "/price/api/metrics/crawl-time/timeseries-boxplot",
            get(timeseries),
        )
        .route("/price/api/items/{store}/{item_id}/history", get(history))
        .route(
            "/price/api/items/{store}/{item_id}/delete-preview",
            post(delete_preview),
        )
        .route("/price/api/items/{store}/{item_id}/delete", post(delete))
        .with_state(counters)
}

fn days(query: &HashMap<String, String>) -> u64 {
    query
        .get("days")
        .and_then(|d| d.parse().ok())
        .unwrap_or(0)
}

async fn boxplot() -> Json<Value> {
    Json(json!({
        "stores": {
            "amazon": {"min": 12.0, "q1": 20.0, "median": 31.5, "q3": 44.0, "max": 70.0, "count": 42, "outliers": [140.0, 155.0]},
            "rakuten": {"min": 30.0, "q1": 45.0, "median": 62.0, "q3": 80.0, "max": 118.0, "count": 40}
        },
        "total": {"min": 12.0, "q1": 28.0, "median": 48.0, "q3": 66.0, "max": 118.0, "count": 82, "outliers": [140.0, 155.0]}
    }))
}

/// `days=7` answers with `slowmart` only after another range was requested;
/// any other range answers at once
async fn timeseries(
    State(counters): State<Counters>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    if days(&query) == 7 {
        let _ = tokio::time::timeout(SLOW_RESPONSE_LIMIT, counters.other_range.notified()).await;
        return Json(json!({
            "periods": ["2024-01-01"],
            "total": {"2024-01-01": [40.0]},
            "stores": {"slowmart": {"2024-01-01": [40.0]}}
        }));
    }
    counters.other_range.notify_one();
    Json(json!({
        "periods": ["2024-01-01", "2024-01-02", "2024-01-03"],
        "total": {
            "2024-01-01": [10.0, 20.0, 30.0, 40.0],
            "2024-01-02": [],
            "2024-01-03": [65.0, 125.0]
        },
        "stores": {
            "fastmart": {
                "2024-01-01": [10.0, 20.0, 30.0, 40.0],
                "2024-01-03": [65.0, 125.0]
            },
            "emptymart": {"2024-01-01": [], "2024-01-02": []}
        }
    }))
}

async fn history(Path((_store, item_id)): Path<(String, String)>) -> Result<Json<Value>, StatusCode> {
    if item_id == "broken" {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!([
        {"timestamp": "2024-03-01T08:15:00", "price": 12800.0},
        {"timestamp": "2024-03-02T08:15:00", "price": 11800.0},
        {"timestamp": "2024-03-03T08:15:00", "price": 12980.0}
    ])))
}

async fn delete_preview(Json(body): Json<Value>) -> Json<Value> {
    let records = body["record_ids"].as_array().map_or(0, |ids| ids.len());
    Json(json!({"record_count": records, "event_count": 1, "prices": [980.0, 1200.0]}))
}

async fn delete(
    State(counters): State<Counters>,
    Path((_store, item_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    counters.deletes.fetch_add(1, Ordering::SeqCst);
    if item_id == "locked" && body["password"].as_str() != Some(LOCKED_PASSWORD) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let records = body["record_ids"].as_array().map_or(0, |ids| ids.len());
    Ok(Json(json!({"deleted_records": records, "deleted_events": 1})))
}
