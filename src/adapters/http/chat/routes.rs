//! Axum routes for the chat streaming endpoints.
//!
//! Endpoints:
//! - GET /health - liveness check
//! - GET /chat_stream/{message}?checkpoint_id=<optional> - SSE event stream

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{chat_stream, health_check, ChatAppState};

/// Creates the chat routes.
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/chat_stream/{message}", get(chat_stream))
}

/// Combined router with CORS and request tracing, ready to serve.
pub fn chat_router(state: ChatAppState) -> Router {
    chat_routes()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockChatModel;
    use crate::adapters::memory::InMemoryCheckpointStore;
    use crate::adapters::search::MockSearchProvider;
    use crate::application::TurnEngine;
    use std::sync::Arc;

    #[test]
    fn chat_routes_creates_valid_router() {
        let _routes = chat_routes();
    }

    #[test]
    fn chat_router_creates_combined_router() {
        let engine = TurnEngine::new(
            Arc::new(MockChatModel::new()),
            Arc::new(MockSearchProvider::new()),
            Arc::new(InMemoryCheckpointStore::new()),
        );
        let _router = chat_router(ChatAppState::new(Arc::new(engine)));
    }
}
