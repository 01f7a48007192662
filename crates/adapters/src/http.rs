//! axum HTTP endpoints
//!
//! `POST /data` ingests one reading, `GET /data` pages stored readings
//! newest-first, `GET /` lists the surface. The WebSocket upgrade at `/ws`
//! shares this router.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, instrument};

use contracts::{IngestResult, RawReading, ReadingFilter, ReadingStore};

use crate::state::AppState;
use crate::ws;

const DEFAULT_QUERY_LIMIT: u32 = 100;

/// Build the HTTP/WS router over shared state.
pub fn router<S>(state: AppState<S>) -> Router
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handle_root))
        .route("/data", get(handle_query).post(handle_ingest))
        .route("/ws", get(ws::handle_upgrade::<S>))
        .with_state(state)
}

/// Handle GET / - service banner listing the endpoints
async fn handle_root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "IoT Data Hub",
        "endpoints": {
            "ingest": "POST /data",
            "query": "GET /data",
            "websocket": "/ws",
        },
    }))
}

/// Handle POST /data - ingest one reading
#[instrument(name = "http_ingest", skip(state, raw))]
async fn handle_ingest<S>(
    State(state): State<AppState<S>>,
    Json(raw): Json<RawReading>,
) -> Response
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    let started = std::time::Instant::now();
    let result = state.pipeline.ingest(raw).await;
    observability::record_ingest("http", &result);
    observability::record_ingest_latency_ms(started.elapsed().as_secs_f64() * 1000.0);

    match result {
        IngestResult::Accepted(reading) => (StatusCode::OK, Json(reading)).into_response(),
        IngestResult::Rejected { reason } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": reason.to_string() })),
        )
            .into_response(),
        IngestResult::Failed { error } => {
            error!(error = %error, "Ingest failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "storage failure" })),
            )
                .into_response()
        }
    }
}

/// Query parameters for GET /data
#[derive(Debug, Deserialize)]
struct ReadingQuery {
    device_id: Option<String>,
    sensor_type: Option<String>,
    #[serde(default)]
    skip: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_QUERY_LIMIT
}

/// Handle GET /data - page stored readings, newest first
#[instrument(name = "http_query", skip(state))]
async fn handle_query<S>(
    State(state): State<AppState<S>>,
    Query(params): Query<ReadingQuery>,
) -> Response
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    let filter = ReadingFilter {
        device_id: params.device_id,
        sensor_type: params.sensor_type,
    };

    match state.store.query(&filter, params.skip, params.limit).await {
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(error) => {
            error!(error = %error, "Query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "storage failure" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use contracts::Reading;
    use ingestion::IngestionPipeline;
    use std::sync::Arc;
    use store::SqliteStore;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    async fn test_state() -> (AppState<SqliteStore>, mpsc::Receiver<Reading>) {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let (tx, rx) = mpsc::channel(8);
        let pipeline = Arc::new(IngestionPipeline::new(store.clone(), tx));
        (AppState::new(pipeline, store), rx)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_data(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/data")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_post_data_returns_persisted_reading() {
        let (state, _rx) = test_state().await;
        let router = router(state);

        let response = router
            .oneshot(post_data(
                r#"{"device_id":"dev1","sensor_type":"temp","value":21.5,"unit":"C"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["device_id"], "dev1");
        assert_eq!(body["value"], 21.5);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_post_data_missing_device_id_is_422() {
        let (state, _rx) = test_state().await;
        let router = router(state);

        let response = router
            .oneshot(post_data(r#"{"device_id":"","sensor_type":"temp","value":1.0}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "missing device_id");
    }

    #[tokio::test]
    async fn test_post_data_non_numeric_value_is_422() {
        let (state, _rx) = test_state().await;
        let router = router(state);

        let response = router
            .oneshot(post_data(
                r#"{"device_id":"dev1","sensor_type":"temp","value":"abc"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "invalid value");
    }

    #[tokio::test]
    async fn test_get_data_pages_newest_first() {
        let (state, _rx) = test_state().await;
        let router = router(state.clone());

        for i in 0..3 {
            let body = format!(r#"{{"device_id":"dev1","sensor_type":"temp","value":{i}}}"#);
            let response = router.clone().oneshot(post_data(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = router.oneshot(get("/data?limit=2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 3);
        assert_eq!(rows[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_get_data_filters_by_device() {
        let (state, _rx) = test_state().await;
        let router = router(state);

        for device in ["dev1", "dev2"] {
            let body = format!(r#"{{"device_id":"{device}","sensor_type":"temp","value":1.0}}"#);
            router.clone().oneshot(post_data(&body)).await.unwrap();
        }

        let response = router.oneshot(get("/data?device_id=dev2")).await.unwrap();
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["device_id"], "dev2");
    }

    #[tokio::test]
    async fn test_get_data_empty_store_is_empty_list() {
        let (state, _rx) = test_state().await;
        let router = router(state);

        let response = router.oneshot(get("/data")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let (state, _rx) = test_state().await;
        let router = router(state);

        let response = router.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["endpoints"]["ingest"], "POST /data");
    }

    #[tokio::test]
    async fn test_accepted_reading_reaches_forward_queue() {
        let (state, mut rx) = test_state().await;
        let router = router(state);

        router
            .oneshot(post_data(
                r#"{"device_id":"dev1","sensor_type":"temp","value":21.5}"#,
            ))
            .await
            .unwrap();

        let forwarded = rx.try_recv().unwrap();
        assert_eq!(forwarded.device_id, "dev1");
    }
}
