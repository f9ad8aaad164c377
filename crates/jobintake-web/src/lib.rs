//! Axum transport for the intake pipeline.
//!
//! The core never sees HTTP: this layer only translates an [`Outcome`]
//! into a status code and a JSON body.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jobintake_core::Outcome;
use jobintake_pipeline::IngestPipeline;
use jobintake_storage::JobStore;
use serde_json::Value as JsonValue;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<IngestPipeline>,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            pipeline: Arc::new(IngestPipeline::new(store)),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/jobs", post(process_posting_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(Arc::new(state))
}

pub async fn serve(store: Arc<dyn JobStore>, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app(AppState::new(store))).await?;
    Ok(())
}

async fn healthz_handler() -> &'static str {
    "ok"
}

async fn process_posting_handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<JsonValue>,
) -> Response {
    let outcome = state.pipeline.process_posting(&raw).await;
    let status = match &outcome {
        Outcome::Stored { .. } => StatusCode::CREATED,
        Outcome::Duplicate { .. } => StatusCode::OK,
        Outcome::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Outcome::StorageFailed { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, Json(outcome)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use jobintake_storage::MemoryStore;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_app(store: &MemoryStore) -> Router {
        app(AppState::new(Arc::new(store.clone())))
    }

    fn post_job(payload: JsonValue) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/jobs")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> JsonValue {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn new_posting_returns_created() {
        let store = MemoryStore::new();
        let resp = test_app(&store)
            .oneshot(post_job(json!({
                "job_id": "J1",
                "job_title": "Engineer",
                "company_name": "Acme",
                "job_url": "https://example.com/j1",
            })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "stored");
        assert_eq!(body["external_id"], "J1");
    }

    #[tokio::test]
    async fn duplicate_posting_returns_ok_with_match() {
        let store = MemoryStore::new();
        let app = test_app(&store);
        let payload = json!({
            "job_id": "J1",
            "job_title": "Engineer",
            "company_name": "Acme",
            "job_url": "https://example.com/j1",
        });
        app.clone().oneshot(post_job(payload.clone())).await.unwrap();
        let resp = app.oneshot(post_job(payload)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "duplicate");
        assert_eq!(body["matched_external_id"], "J1");
    }

    #[tokio::test]
    async fn invalid_posting_returns_unprocessable() {
        let store = MemoryStore::new();
        let resp = test_app(&store)
            .oneshot(post_job(json!({"job_id": "J1"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "rejected");
        assert_eq!(store.call_count().await, 0);
    }

    #[tokio::test]
    async fn healthz_responds_ok() {
        let store = MemoryStore::new();
        let resp = test_app(&store)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
