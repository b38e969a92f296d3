//! Askstream - Conversational Search Backend
//!
//! Streams LLM responses over SSE, letting the model invoke a web-search
//! tool mid-turn, and persists conversation history per checkpoint id.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
