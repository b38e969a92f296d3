//! Mock chat model for testing.
//!
//! Provides a scripted implementation of the ChatModel port, allowing tests
//! to run the turn loop without calling a real model API.
//!
//! # Example
//!
//! ```ignore
//! let model = MockChatModel::new()
//!     .with_turn(ScriptedTurn::respond(vec!["Hel", "lo"], vec![]));
//!
//! let stream = model.stream_chat(&history).await?;
//! ```

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::conversation::{ChatMessage, ToolCall};
use crate::ports::{AssistantTurn, ChatModel, ModelError, ModelEvent, ModelEventStream};

/// One scripted model response, consumed in order.
#[derive(Debug, Clone)]
pub enum ScriptedTurn {
    /// Stream the given deltas, then complete with the given tool calls.
    Respond {
        deltas: Vec<String>,
        tool_calls: Vec<ToolCall>,
    },
    /// Fail the call before streaming starts.
    Fail(ModelError),
    /// Stream the given deltas, then fail mid-stream.
    FailMidStream {
        deltas: Vec<String>,
        error: ModelError,
    },
}

impl ScriptedTurn {
    /// Convenience constructor for a streamed response.
    pub fn respond(deltas: Vec<&str>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Respond {
            deltas: deltas.into_iter().map(String::from).collect(),
            tool_calls,
        }
    }
}

/// Scripted mock chat model.
///
/// Records every call's message history for verification.
#[derive(Clone, Default)]
pub struct MockChatModel {
    turns: Arc<Mutex<VecDeque<ScriptedTurn>>>,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockChatModel {
    /// Creates a mock with no scripted turns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a scripted turn.
    pub fn with_turn(self, turn: ScriptedTurn) -> Self {
        self.turns.lock().unwrap().push_back(turn);
        self
    }

    /// Returns the message histories this mock was called with.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ModelEventStream, ModelError> {
        self.calls.lock().unwrap().push(messages.to_vec());

        let turn = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptedTurn::Respond {
                deltas: Vec::new(),
                tool_calls: Vec::new(),
            });

        match turn {
            ScriptedTurn::Fail(error) => Err(error),
            ScriptedTurn::Respond { deltas, tool_calls } => {
                let content = deltas.concat();
                let events = deltas
                    .into_iter()
                    .map(|d| Ok(ModelEvent::ContentDelta(d)))
                    .chain(std::iter::once(Ok(ModelEvent::Completed(AssistantTurn {
                        content,
                        tool_calls,
                    }))));
                Ok(Box::pin(stream::iter(events)))
            }
            ScriptedTurn::FailMidStream { deltas, error } => {
                let events = deltas
                    .into_iter()
                    .map(|d| Ok(ModelEvent::ContentDelta(d)))
                    .chain(std::iter::once(Err(error)));
                Ok(Box::pin(stream::iter(events)))
            }
        }
    }
}
