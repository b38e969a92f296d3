//! Outbound stream protocol and turn-event translation.
//!
//! Defines the wire events sent to clients over SSE and the translator that
//! maps [`TurnEvent`]s onto them, preserving emission order:
//!
//! - A brand-new conversation emits `checkpoint` first, before any model
//!   events; resumed conversations emit no `checkpoint`.
//! - Assistant deltas become `content` events.
//! - A finished assistant message requesting search becomes `search_start`
//!   with the first search call's query (only the first is surfaced).
//! - A completed search becomes `search_results` with the result urls.
//! - The stream always ends with exactly one `end`; failures emit one
//!   `error` first and suppress all further events.

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::application::turn_engine::{TurnError, TurnEvent};
use crate::domain::conversation::{ConversationId, ToolKind};
use crate::ports::SearchResult;

/// Events sent to the client, serialized as `data: <json>` SSE frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// First event of a new conversation; carries the id to resume with.
    Checkpoint { checkpoint_id: String },
    /// Incremental assistant text.
    Content { content: String },
    /// The model decided to search; emitted before the search runs.
    SearchStart { query: String },
    /// Urls of the completed search's results.
    SearchResults { urls: Vec<String> },
    /// Terminal failure notice; always followed by `end`.
    Error { message: String },
    /// Terminal marker; emitted exactly once per stream.
    End,
}

/// Translates turn events into wire events.
///
/// `new_conversation` carries the freshly generated id when the request did
/// not name an existing conversation.
pub fn translate_events<S>(
    new_conversation: Option<ConversationId>,
    events: S,
) -> impl Stream<Item = StreamEvent> + Send
where
    S: Stream<Item = Result<TurnEvent, TurnError>> + Send + 'static,
{
    stream! {
        if let Some(id) = new_conversation {
            yield StreamEvent::Checkpoint {
                checkpoint_id: id.to_string(),
            };
        }

        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if let Some(wire) = translate_one(event) {
                        yield wire;
                    }
                }
                Err(error) => {
                    tracing::error!(%error, "turn failed mid-stream");
                    yield StreamEvent::Error {
                        message: error.to_string(),
                    };
                    yield StreamEvent::End;
                    return;
                }
            }
        }

        yield StreamEvent::End;
    }
}

/// Maps one turn event to at most one wire event.
fn translate_one(event: TurnEvent) -> Option<StreamEvent> {
    match event {
        TurnEvent::AssistantDelta(content) => Some(StreamEvent::Content { content }),
        TurnEvent::ToolRoundStarted { calls } => {
            // Only the first search call of the round is surfaced.
            let first_search = calls
                .iter()
                .find(|call| call.kind() == ToolKind::WebSearch)?;
            Some(StreamEvent::SearchStart {
                query: first_search.string_arg("query").unwrap_or_default().into(),
            })
        }
        TurnEvent::SearchFinished { results, .. } => Some(StreamEvent::SearchResults {
            urls: extract_urls(&results),
        }),
        // `end` is emitted once when the whole stream finishes.
        TurnEvent::TurnComplete => None,
    }
}

/// Pulls the urls out of a result list, skipping entries without one.
fn extract_urls(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| !r.url.is_empty())
        .map(|r| r.url.clone())
        .collect()
}
