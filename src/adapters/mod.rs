//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `ai` - chat model clients (OpenAI-compatible API, scripted mock)
//! - `search` - web-search providers (Tavily, scripted mock)
//! - `postgres` - durable checkpoint store
//! - `memory` - in-memory checkpoint store for tests and development
//! - `http` - axum routes and SSE transport

pub mod ai;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod search;
