//! Chat Model Port - Interface for streaming LLM completions.
//!
//! Abstracts the language-model provider so the turn controller can stream
//! completions (including tool-call requests) without coupling to a specific
//! API. Adapters translate between the provider wire format and our domain
//! types.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::domain::conversation::{ChatMessage, ToolCall};

/// Stream of incremental model events.
pub type ModelEventStream = Pin<Box<dyn Stream<Item = Result<ModelEvent, ModelError>> + Send>>;

/// Port for streaming chat completions from an LLM provider.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends the full message history and returns a stream of events.
    ///
    /// The stream yields zero or more `ContentDelta` events as tokens
    /// arrive, terminated by exactly one `Completed` event carrying the
    /// assembled assistant message (content plus any requested tool calls).
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ModelEventStream, ModelError>;
}

/// Incremental event from a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// A fragment of assistant text, in arrival order.
    ContentDelta(String),
    /// The response finished; carries the full assistant turn.
    Completed(AssistantTurn),
}

/// A finished assistant response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssistantTurn {
    /// Complete assistant text (concatenation of all deltas).
    pub content: String,
    /// Tool invocations the model requested, in request order.
    pub tool_calls: Vec<ToolCall>,
}

/// Error from the model provider.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("authentication with the model provider failed")]
    AuthenticationFailed,

    #[error("model provider rate limited the request, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("model request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    #[error("invalid model request: {0}")]
    InvalidRequest(String),

    #[error("model provider unavailable: {0}")]
    Unavailable(String),

    #[error("network error calling model provider: {0}")]
    Network(String),

    #[error("malformed model response: {0}")]
    Parse(String),
}

impl ModelError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns true if retrying the request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Unavailable(_) | Self::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ModelError::network("reset").is_retryable());
        assert!(ModelError::unavailable("503").is_retryable());
        assert!(ModelError::RateLimited { retry_after_secs: 5 }.is_retryable());
        assert!(ModelError::Timeout { timeout_secs: 30 }.is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!ModelError::AuthenticationFailed.is_retryable());
        assert!(!ModelError::InvalidRequest("bad".into()).is_retryable());
        assert!(!ModelError::parse("junk").is_retryable());
    }
}
