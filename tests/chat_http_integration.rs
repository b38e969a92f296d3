//! HTTP integration tests for the chat API.
//!
//! Drives the real axum router with scripted adapters behind the turn
//! engine, using `tower::ServiceExt::oneshot` so no socket is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use askstream::adapters::ai::{MockChatModel, ScriptedTurn};
use askstream::adapters::http::{chat_router, ChatAppState};
use askstream::adapters::memory::InMemoryCheckpointStore;
use askstream::adapters::search::MockSearchProvider;
use askstream::application::TurnEngine;
use askstream::domain::{ToolCall, WEB_SEARCH_TOOL};
use askstream::ports::{ModelError, SearchResult};

fn app(model: MockChatModel, search: MockSearchProvider) -> Router {
    let engine = TurnEngine::new(
        Arc::new(model),
        Arc::new(search),
        Arc::new(InMemoryCheckpointStore::new()),
    );
    chat_router(ChatAppState::new(Arc::new(engine)))
}

async fn get(router: Router, uri: &str) -> axum::response::Response {
    router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collects the response body and parses every `data:` SSE frame as JSON,
/// ignoring keep-alive comments.
async fn sse_frames(response: axum::response::Response) -> Vec<Value> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    text.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|frame| serde_json::from_str(frame).unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_healthy() {
    let response = get(app(MockChatModel::new(), MockSearchProvider::new()), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "Backend service is running");
}

#[tokio::test]
async fn new_conversation_streams_checkpoint_first_and_end_last() {
    let model = MockChatModel::new().with_turn(ScriptedTurn::respond(vec!["Hello!"], vec![]));
    let response = get(app(model, MockSearchProvider::new()), "/chat_stream/hi").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );

    let frames = sse_frames(response).await;
    assert_eq!(frames[0]["type"], "checkpoint");
    assert!(frames[0]["checkpoint_id"].is_string());
    assert_eq!(frames[1]["type"], "content");
    assert_eq!(frames[1]["content"], "Hello!");
    assert_eq!(frames.last().unwrap()["type"], "end");
}

#[tokio::test]
async fn resumed_conversation_has_no_checkpoint_frame() {
    let model = MockChatModel::new().with_turn(ScriptedTurn::respond(vec!["Again."], vec![]));
    let id = uuid::Uuid::new_v4();
    let uri = format!("/chat_stream/hi?checkpoint_id={id}");
    let response = get(app(model, MockSearchProvider::new()), &uri).await;

    let frames = sse_frames(response).await;
    assert!(frames.iter().all(|f| f["type"] != "checkpoint"));
    assert_eq!(frames.last().unwrap()["type"], "end");
}

#[tokio::test]
async fn invalid_checkpoint_id_is_rejected() {
    let response = get(
        app(MockChatModel::new(), MockSearchProvider::new()),
        "/chat_stream/hi?checkpoint_id=not-a-uuid",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn search_turn_emits_start_before_results() {
    let model = MockChatModel::new()
        .with_turn(ScriptedTurn::respond(
            vec![],
            vec![ToolCall::new(
                "call_1",
                WEB_SEARCH_TOOL,
                json!({ "query": "paris weather" }),
            )],
        ))
        .with_turn(ScriptedTurn::respond(vec!["Sunny."], vec![]));
    let search = MockSearchProvider::new().with_results(vec![SearchResult::new(
        "Paris Weather",
        "https://weather.example/paris",
        "Sunny, 24C",
    )]);

    let response = get(app(model, search), "/chat_stream/weather").await;
    let frames = sse_frames(response).await;

    let types: Vec<&str> = frames
        .iter()
        .map(|f| f["type"].as_str().unwrap())
        .collect();
    let start = types.iter().position(|t| *t == "search_start").unwrap();
    let results = types.iter().position(|t| *t == "search_results").unwrap();
    assert!(start < results);
    assert_eq!(frames[start]["query"], "paris weather");
    assert_eq!(
        frames[results]["urls"],
        json!(["https://weather.example/paris"])
    );
    assert_eq!(*types.last().unwrap(), "end");
}

#[tokio::test]
async fn model_failure_streams_error_then_end() {
    let model = MockChatModel::new()
        .with_turn(ScriptedTurn::Fail(ModelError::unavailable("upstream 503")));

    let response = get(app(model, MockSearchProvider::new()), "/chat_stream/hi").await;
    // The failure happens after headers are sent; it travels in-stream.
    assert_eq!(response.status(), StatusCode::OK);

    let frames = sse_frames(response).await;
    let types: Vec<&str> = frames
        .iter()
        .map(|f| f["type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"error"));
    assert_eq!(types.last().unwrap(), &"end");
    // Nothing follows the terminal pair.
    assert_eq!(
        types.iter().filter(|t| **t == "end").count(),
        1,
        "exactly one end frame"
    );
}
