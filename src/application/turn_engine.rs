//! Turn engine - the model/tool orchestration loop.
//!
//! One turn: send the full history to the model, stream its deltas, and if
//! the finished assistant message requests tool invocations, execute them in
//! request order, append one tool-result message per invocation, and call the
//! model again with the extended history. The loop ends when the model
//! produces a response with no pending tool calls, bounded by
//! `max_tool_rounds` to guard against tool-call cycles.
//!
//! The engine owns the checkpoint store: history is loaded before the first
//! model call and the turn's new messages are appended after the turn
//! completes.

use std::sync::Arc;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use thiserror::Error;

use crate::domain::conversation::{ChatMessage, ConversationId, ToolCall, ToolKind};
use crate::ports::{
    ChatModel, CheckpointStore, ModelError, ModelEvent, SearchError, SearchProvider, SearchResult,
    StoreError,
};

/// Events produced while driving one conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// A fragment of assistant text, in arrival order.
    AssistantDelta(String),
    /// The assistant finished a message that requests tool invocations.
    ToolRoundStarted { calls: Vec<ToolCall> },
    /// A search invocation completed with its results.
    SearchFinished {
        call_id: String,
        results: Vec<SearchResult>,
    },
    /// The turn is complete and the history has been persisted.
    TurnComplete,
}

/// Errors that can occur while driving a turn.
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("search tool failed: {0}")]
    Search(#[from] SearchError),

    #[error("checkpoint store failed: {0}")]
    Store(#[from] StoreError),

    #[error("turn exceeded the maximum of {0} tool rounds")]
    ToolRoundLimit(u32),
}

/// Tuning knobs for the turn engine.
#[derive(Debug, Clone)]
pub struct TurnEngineConfig {
    /// Maximum tool round-trips per turn.
    pub max_tool_rounds: u32,
    /// Result bound passed to the search provider.
    pub max_search_results: u8,
}

impl Default for TurnEngineConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 4,
            max_search_results: 2,
        }
    }
}

/// Drives the model/tool loop for one turn of a conversation.
#[derive(Clone)]
pub struct TurnEngine {
    model: Arc<dyn ChatModel>,
    search: Arc<dyn SearchProvider>,
    store: Arc<dyn CheckpointStore>,
    config: TurnEngineConfig,
}

impl TurnEngine {
    /// Creates a new engine with default configuration.
    pub fn new(
        model: Arc<dyn ChatModel>,
        search: Arc<dyn SearchProvider>,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            model,
            search,
            store,
            config: TurnEngineConfig::default(),
        }
    }

    /// Creates an engine with custom configuration.
    pub fn with_config(
        model: Arc<dyn ChatModel>,
        search: Arc<dyn SearchProvider>,
        store: Arc<dyn CheckpointStore>,
        config: TurnEngineConfig,
    ) -> Self {
        Self {
            model,
            search,
            store,
            config,
        }
    }

    /// Runs one turn for `conversation_id` with the user's new message,
    /// returning a lazy stream of [`TurnEvent`]s.
    ///
    /// Nothing happens until the stream is polled; dropping the stream
    /// cancels any in-flight model or tool call at its next await point.
    pub fn stream_turn(
        &self,
        conversation_id: ConversationId,
        user_message: String,
    ) -> impl Stream<Item = Result<TurnEvent, TurnError>> + Send + 'static {
        let model = Arc::clone(&self.model);
        let search = Arc::clone(&self.search);
        let store = Arc::clone(&self.store);
        let config = self.config.clone();

        try_stream! {
            let mut messages = store.load(&conversation_id).await?;
            let user_msg = ChatMessage::user(user_message);
            messages.push(user_msg.clone());

            // Messages produced this turn, appended to the store at the end.
            let mut new_messages = vec![user_msg];
            let mut rounds: u32 = 0;

            loop {
                let mut model_stream = model.stream_chat(&messages).await?;

                let mut turn = None;
                while let Some(event) = model_stream.next().await {
                    match event? {
                        ModelEvent::ContentDelta(delta) => {
                            yield TurnEvent::AssistantDelta(delta);
                        }
                        ModelEvent::Completed(finished) => {
                            turn = Some(finished);
                        }
                    }
                }
                let turn = turn.ok_or_else(|| {
                    ModelError::parse("model stream ended without a completed response")
                })?;

                let assistant_msg =
                    ChatMessage::assistant_with_tools(turn.content, turn.tool_calls.clone());
                messages.push(assistant_msg.clone());
                new_messages.push(assistant_msg);

                if turn.tool_calls.is_empty() {
                    break;
                }

                rounds += 1;
                if rounds > config.max_tool_rounds {
                    Err(TurnError::ToolRoundLimit(config.max_tool_rounds))?;
                }

                yield TurnEvent::ToolRoundStarted {
                    calls: turn.tool_calls.clone(),
                };

                for call in &turn.tool_calls {
                    let tool_msg = match call.kind() {
                        ToolKind::WebSearch => {
                            let query = call.string_arg("query").unwrap_or_default();
                            let results =
                                search.search(query, config.max_search_results).await?;
                            let content = serde_json::to_string(&results)
                                .map_err(|e| StoreError::serialization(e.to_string()))?;

                            yield TurnEvent::SearchFinished {
                                call_id: call.id.clone(),
                                results,
                            };

                            ChatMessage::tool(content, &call.id, &call.name)
                        }
                        // Unknown tool names get a defined fallback result so
                        // the model can recover, rather than a silent drop.
                        ToolKind::Unrecognized => {
                            tracing::warn!(tool = %call.name, "model requested an unknown tool");
                            ChatMessage::tool(
                                format!("Tool '{}' is not available.", call.name),
                                &call.id,
                                &call.name,
                            )
                        }
                    };
                    messages.push(tool_msg.clone());
                    new_messages.push(tool_msg);
                }
            }

            store.append(&conversation_id, &new_messages).await?;
            yield TurnEvent::TurnComplete;
        }
    }
}
