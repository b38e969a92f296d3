//! HTTP handlers for the chat streaming endpoints.
//!
//! The stream handler resolves the conversation id (generating a fresh one
//! when the request carries no `checkpoint_id`), drives the turn engine, and
//! streams translated events as SSE frames. Failures before the stream
//! starts map to normal HTTP statuses; failures after are carried inside the
//! stream as `error` + `end` events.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{translate_events, StreamEvent, TurnEngine};
use crate::domain::conversation::ConversationId;

/// Shared application state for the chat handlers.
///
/// Built once at startup and handed to the router; there is no ambient
/// global state.
#[derive(Clone)]
pub struct ChatAppState {
    pub engine: Arc<TurnEngine>,
}

impl ChatAppState {
    /// Creates a new ChatAppState.
    pub fn new(engine: Arc<TurnEngine>) -> Self {
        Self { engine }
    }
}

/// Errors returned before the event stream starts.
#[derive(Debug, Error)]
pub enum ChatApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

/// Response body for the health endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// GET /health - liveness check.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Backend service is running".to_string(),
    })
}

/// Query parameters for the stream endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatStreamParams {
    /// Conversation to resume; absent starts a new one.
    pub checkpoint_id: Option<String>,
}

/// GET /chat_stream/{message} - stream one conversation turn as SSE.
///
/// # Errors
/// - 400 Bad Request: `checkpoint_id` is not a valid conversation id
pub async fn chat_stream(
    State(state): State<ChatAppState>,
    Path(message): Path<String>,
    Query(params): Query<ChatStreamParams>,
) -> Result<impl IntoResponse, ChatApiError> {
    let (conversation_id, is_new) = match params.checkpoint_id {
        Some(raw) => {
            let id: ConversationId = raw.parse().map_err(|_| {
                ChatApiError::BadRequest("Invalid checkpoint_id format".to_string())
            })?;
            (id, false)
        }
        None => (ConversationId::new(), true),
    };

    tracing::info!(%conversation_id, is_new, "starting chat stream");

    let turn_events = state.engine.stream_turn(conversation_id, message);
    let wire_events = translate_events(is_new.then_some(conversation_id), turn_events);

    let sse = Sse::new(to_sse_frames(wire_events)).keep_alive(KeepAlive::default());

    // SSE responses must never be cached by intermediaries.
    Ok(([(header::CACHE_CONTROL, "no-cache")], sse))
}

/// Serializes wire events into SSE `data:` frames.
fn to_sse_frames(
    events: impl Stream<Item = StreamEvent> + Send + 'static,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    events.map(|event| {
        let frame = Event::default().json_data(&event).unwrap_or_else(|error| {
            // StreamEvent serialization cannot realistically fail; if it
            // ever does, the client still gets a well-formed error frame.
            tracing::error!(%error, "failed to serialize stream event");
            Event::default().data(r#"{"type":"error","message":"event serialization failed"}"#)
        });
        Ok(frame)
    })
}
