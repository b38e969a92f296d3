//! End-to-end pipeline tests: turn engine driving scripted adapters, with
//! the output run through the wire-event translator. These exercise the full
//! path a request takes below the HTTP layer.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::json;

use askstream::adapters::ai::{MockChatModel, ScriptedTurn};
use askstream::adapters::memory::InMemoryCheckpointStore;
use askstream::adapters::search::MockSearchProvider;
use askstream::application::{translate_events, StreamEvent, TurnEngine};
use askstream::domain::{ChatMessage, ConversationId, ToolCall, WEB_SEARCH_TOOL};
use askstream::ports::{CheckpointStore, ModelError, SearchResult};

fn search_call(id: &str, query: &str) -> ToolCall {
    ToolCall::new(id, WEB_SEARCH_TOOL, json!({ "query": query }))
}

async fn run_turn(
    engine: &TurnEngine,
    new_conversation: Option<ConversationId>,
    conversation_id: ConversationId,
    message: &str,
) -> Vec<StreamEvent> {
    let turn_events = engine.stream_turn(conversation_id, message.to_string());
    translate_events(new_conversation, turn_events)
        .collect()
        .await
}

#[tokio::test]
async fn search_turn_streams_the_full_protocol_in_order() {
    let model = MockChatModel::new()
        .with_turn(ScriptedTurn::respond(
            vec![],
            vec![search_call("call_1", "rust 1.80 release date")],
        ))
        .with_turn(ScriptedTurn::respond(vec!["It was ", "July 2024."], vec![]));
    let search = MockSearchProvider::new().with_results(vec![SearchResult::new(
        "Rust Blog",
        "https://blog.rust-lang.org/2024/07/25/Rust-1.80.0.html",
        "Announcing Rust 1.80.0",
    )]);
    let store: Arc<dyn CheckpointStore> = Arc::new(InMemoryCheckpointStore::new());
    let engine = TurnEngine::new(Arc::new(model), Arc::new(search), Arc::clone(&store));
    let id = ConversationId::new();

    let events = run_turn(&engine, Some(id), id, "when was rust 1.80 released?").await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Checkpoint {
                checkpoint_id: id.to_string()
            },
            StreamEvent::SearchStart {
                query: "rust 1.80 release date".into()
            },
            StreamEvent::SearchResults {
                urls: vec!["https://blog.rust-lang.org/2024/07/25/Rust-1.80.0.html".into()]
            },
            StreamEvent::Content {
                content: "It was ".into()
            },
            StreamEvent::Content {
                content: "July 2024.".into()
            },
            StreamEvent::End,
        ]
    );

    // user, assistant(+call), tool result, final assistant.
    let history = store.load(&id).await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn resumed_turn_omits_checkpoint_and_sees_prior_history() {
    let model = MockChatModel::new()
        .with_turn(ScriptedTurn::respond(vec!["First answer."], vec![]))
        .with_turn(ScriptedTurn::respond(vec!["Second answer."], vec![]));
    let store: Arc<dyn CheckpointStore> = Arc::new(InMemoryCheckpointStore::new());
    let engine = TurnEngine::new(
        Arc::new(model.clone()),
        Arc::new(MockSearchProvider::new()),
        Arc::clone(&store),
    );
    let id = ConversationId::new();

    let first = run_turn(&engine, Some(id), id, "one").await;
    assert!(matches!(first[0], StreamEvent::Checkpoint { .. }));

    let second = run_turn(&engine, None, id, "two").await;
    assert_eq!(
        second,
        vec![
            StreamEvent::Content {
                content: "Second answer.".into()
            },
            StreamEvent::End,
        ]
    );

    // The resumed turn's model call starts from the persisted history.
    assert_eq!(
        model.calls()[1],
        vec![
            ChatMessage::user("one"),
            ChatMessage::assistant("First answer."),
            ChatMessage::user("two"),
        ]
    );
}

#[tokio::test]
async fn model_failure_ends_the_stream_with_error_then_end() {
    let model = MockChatModel::new().with_turn(ScriptedTurn::FailMidStream {
        deltas: vec!["partial".to_string()],
        error: ModelError::network("connection reset"),
    });
    let engine = TurnEngine::new(
        Arc::new(model),
        Arc::new(MockSearchProvider::new()),
        Arc::new(InMemoryCheckpointStore::new()),
    );
    let id = ConversationId::new();

    let events = run_turn(&engine, Some(id), id, "hi").await;

    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], StreamEvent::Checkpoint { .. }));
    assert_eq!(
        events[1],
        StreamEvent::Content {
            content: "partial".into()
        }
    );
    assert!(matches!(events[2], StreamEvent::Error { .. }));
    assert_eq!(events[3], StreamEvent::End);
}

#[tokio::test]
async fn unknown_tool_round_is_invisible_on_the_wire() {
    let model = MockChatModel::new()
        .with_turn(ScriptedTurn::respond(
            vec![],
            vec![ToolCall::new("call_1", "calculator", json!({ "a": 1 }))],
        ))
        .with_turn(ScriptedTurn::respond(vec!["I cannot calculate."], vec![]));
    let engine = TurnEngine::new(
        Arc::new(model),
        Arc::new(MockSearchProvider::new()),
        Arc::new(InMemoryCheckpointStore::new()),
    );
    let id = ConversationId::new();

    let events = run_turn(&engine, None, id, "2+2?").await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Content {
                content: "I cannot calculate.".into()
            },
            StreamEvent::End,
        ]
    );
}
