//! Integration tests for the HTTP surface: status mapping, body shapes,
//! and liveness under pool saturation.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use wikitext_server::config::PoolConfig;
use wikitext_server::core::JobPool;
use wikitext_server::parser::{DocumentParser, ParseError, ParsedDocument, Section, WikitextParser};
use wikitext_server::server::{build_router, AppState};

#[derive(Clone)]
struct SleepParser {
    sleep: Duration,
}

impl DocumentParser for SleepParser {
    fn parse(&self, text: &str) -> Result<ParsedDocument, ParseError> {
        std::thread::sleep(self.sleep);
        Ok(ParsedDocument {
            sections: vec![Section {
                title: String::new(),
                text: text.to_string(),
            }],
        })
    }
}

#[derive(Clone)]
struct FailParser;

impl DocumentParser for FailParser {
    fn parse(&self, _text: &str) -> Result<ParsedDocument, ParseError> {
        Err(ParseError::new("malformed markup"))
    }
}

fn app_with<P: DocumentParser>(config: PoolConfig, parser: P) -> (Router, Arc<AppState>) {
    let pool = JobPool::new(config, parser).expect("pool");
    let state = Arc::new(AppState { pool });
    (build_router(Arc::clone(&state)), state)
}

fn wikitext_app() -> (Router, Arc<AppState>) {
    app_with(
        PoolConfig::new()
            .with_max_workers(1)
            .with_job_timeout(Duration::from_secs(5)),
        WikitextParser::new(),
    )
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_returns_200_with_empty_body() {
    let (app, _state) = wikitext_app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn parse_returns_structured_document() {
    let (app, _state) = wikitext_app();

    let response = app
        .oneshot(post_json(json!({
            "wikitext": "== Title ==\nBody text",
            "id": "1",
            "source": "test"
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["document"][0]["title"], "Title");
    assert_eq!(body["document"][0]["text"], "Body text");
}

#[tokio::test]
async fn missing_wikitext_parses_to_single_empty_section() {
    let (app, _state) = wikitext_app();

    let response = app
        .oneshot(post_json(json!({ "id": "2", "source": "test" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["document"], json!([{ "title": "", "text": "" }]));
}

#[tokio::test]
async fn timeout_maps_to_408_with_timeout_body() {
    let (app, _state) = app_with(
        PoolConfig::new()
            .with_max_workers(1)
            .with_job_timeout(Duration::from_millis(100)),
        SleepParser {
            sleep: Duration::from_secs(3),
        },
    );

    let response = app
        .oneshot(post_json(json!({
            "wikitext": "whatever",
            "id": "3",
            "source": "test"
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    let body = body_json(response).await;
    let message = body["timeout"].as_str().expect("timeout message");
    assert!(message.contains("timed out"));
}

#[tokio::test]
async fn parse_failure_maps_to_500_with_error_body() {
    let (app, _state) = app_with(
        PoolConfig::new().with_max_workers(1),
        FailParser,
    );

    let response = app
        .oneshot(post_json(json!({
            "wikitext": "whatever",
            "id": "4",
            "source": "test"
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("malformed markup"));
}

#[tokio::test]
async fn health_responds_while_workers_are_saturated() {
    let (app, state) = app_with(
        PoolConfig::new()
            .with_max_workers(1)
            .with_job_timeout(Duration::from_secs(10)),
        SleepParser {
            sleep: Duration::from_secs(5),
        },
    );

    // Saturate the single worker and queue one more job behind it.
    let _busy = state.pool.submit("busy").expect("submit");
    let _queued = state.pool.submit("queued").expect("submit");
    tokio::time::sleep(Duration::from_millis(100)).await;

    for _ in 0..2 {
        let probe = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"));
        let response = tokio::time::timeout(Duration::from_millis(500), probe)
            .await
            .expect("health must not queue behind jobs")
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn stats_reports_pool_counters() {
    let (app, state) = wikitext_app();

    let outcome = state.pool.submit("== A ==\nb").expect("submit");
    let _ = outcome.outcome().await;

    let response = app
        .oneshot(Request::get("/stats").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["workers"], 1);
    assert_eq!(body["submitted_jobs"], 1);
    assert_eq!(body["completed_jobs"], 1);
}

#[tokio::test]
async fn shutdown_maps_to_503() {
    let (app, state) = wikitext_app();
    state.pool.shutdown();

    let response = app
        .oneshot(post_json(json!({
            "wikitext": "late",
            "id": "5",
            "source": "test"
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("error").contains("shut down"));
}
