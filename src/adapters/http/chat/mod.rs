//! Chat streaming endpoints.

mod handlers;
mod routes;

pub use handlers::{chat_stream, health_check, ChatAppState, ChatApiError, HealthResponse};
pub use routes::{chat_router, chat_routes};
