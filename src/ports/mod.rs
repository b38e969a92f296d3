//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `ChatModel` - streaming LLM completions with tool-call support
//! - `SearchProvider` - the web-search tool capability
//! - `CheckpointStore` - per-conversation history persistence

mod chat_model;
mod checkpoint_store;
mod search_provider;

pub use chat_model::{AssistantTurn, ChatModel, ModelError, ModelEvent, ModelEventStream};
pub use checkpoint_store::{CheckpointStore, StoreError};
pub use search_provider::{SearchError, SearchProvider, SearchResult};
