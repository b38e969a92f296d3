//! HTTP adapters - axum routes and SSE transport.

pub mod chat;

pub use chat::{chat_router, ChatAppState};
