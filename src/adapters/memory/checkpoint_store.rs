//! In-memory implementation of CheckpointStore.
//!
//! Histories are kept per conversation id in a map behind a mutex. Useful
//! for tests and local development; state is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::conversation::{ChatMessage, ConversationId};
use crate::ports::{CheckpointStore, StoreError};

/// In-memory checkpoint store.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    histories: Mutex<HashMap<ConversationId, Vec<ChatMessage>>>,
}

impl InMemoryCheckpointStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of conversations recorded.
    pub fn conversation_count(&self) -> usize {
        self.histories.lock().unwrap().len()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, id: &ConversationId) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(
        &self,
        id: &ConversationId,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError> {
        self.histories
            .lock()
            .unwrap()
            .entry(*id)
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }
}
