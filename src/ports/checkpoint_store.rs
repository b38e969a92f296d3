//! Checkpoint Store Port - Persistence of conversation histories.
//!
//! Each conversation id maps to an independent, isolated history. The store
//! offers load and append semantics only; this backend never deletes
//! histories (retention is the store's responsibility).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{ChatMessage, ConversationId};

/// Port for persisting conversation histories per conversation id.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Loads the recorded history for a conversation.
    ///
    /// Returns an empty history for ids that have never been written.
    async fn load(&self, id: &ConversationId) -> Result<Vec<ChatMessage>, StoreError>;

    /// Appends messages to a conversation's history in order.
    async fn append(
        &self,
        id: &ConversationId,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError>;
}

/// Error from the checkpoint store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("checkpoint store database error: {0}")]
    Database(String),

    #[error("failed to serialize conversation state: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}
