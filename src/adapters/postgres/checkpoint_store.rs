//! PostgreSQL implementation of CheckpointStore.
//!
//! Conversation histories live in two tables keyed by conversation id:
//! a snapshot table holding the full history as JSONB, and a writes table
//! recording each appended message individually. The snapshot is what
//! `load` reads; the writes table preserves the append history.
//!
//! Table names come from [`DatabaseConfig`](crate::config::DatabaseConfig)
//! and are interpolated into the statements at construction time; they are
//! operator configuration, never request input.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{ChatMessage, ConversationId};
use crate::ports::{CheckpointStore, StoreError};

/// PostgreSQL checkpoint store.
#[derive(Clone)]
pub struct PostgresCheckpointStore {
    pool: PgPool,
    checkpoints_table: String,
    writes_table: String,
}

impl PostgresCheckpointStore {
    /// Creates a store over the given pool with default table names.
    pub fn new(pool: PgPool) -> Self {
        Self::with_tables(pool, "conversation_checkpoints", "conversation_writes")
    }

    /// Creates a store with custom table names.
    pub fn with_tables(
        pool: PgPool,
        checkpoints_table: impl Into<String>,
        writes_table: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            checkpoints_table: checkpoints_table.into(),
            writes_table: writes_table.into(),
        }
    }

    /// Creates the backing tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let statements = [
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    conversation_id UUID PRIMARY KEY,
                    messages JSONB NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL
                )
                "#,
                self.checkpoints_table
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    id BIGSERIAL PRIMARY KEY,
                    conversation_id UUID NOT NULL,
                    message JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL
                )
                "#,
                self.writes_table
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {0}_conversation_idx ON {0} (conversation_id, id)",
                self.writes_table
            ),
        ];

        for statement in &statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::database(format!("Failed to create schema: {}", e)))?;
        }

        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for PostgresCheckpointStore {
    async fn load(&self, id: &ConversationId) -> Result<Vec<ChatMessage>, StoreError> {
        let query = format!(
            "SELECT messages FROM {} WHERE conversation_id = $1",
            self.checkpoints_table
        );

        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to load checkpoint: {}", e)))?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };

        let messages: serde_json::Value = row
            .try_get("messages")
            .map_err(|e| StoreError::database(format!("Failed to read snapshot column: {}", e)))?;

        serde_json::from_value(messages)
            .map_err(|e| StoreError::serialization(format!("Malformed stored history: {}", e)))
    }

    async fn append(
        &self,
        id: &ConversationId,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError> {
        if messages.is_empty() {
            return Ok(());
        }

        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::database(format!("Failed to start transaction: {}", e)))?;

        // Record each message in the writes table.
        let insert_write = format!(
            "INSERT INTO {} (conversation_id, message, created_at) VALUES ($1, $2, $3)",
            self.writes_table
        );
        for message in messages {
            let payload = serde_json::to_value(message)
                .map_err(|e| StoreError::serialization(e.to_string()))?;
            sqlx::query(&insert_write)
                .bind(id.as_uuid())
                .bind(payload)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::database(format!("Failed to insert write: {}", e)))?;
        }

        // Extend the snapshot under a row lock so concurrent turns on the
        // same conversation cannot lose appends.
        let select_snapshot = format!(
            "SELECT messages FROM {} WHERE conversation_id = $1 FOR UPDATE",
            self.checkpoints_table
        );
        let existing = sqlx::query(&select_snapshot)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::database(format!("Failed to lock snapshot: {}", e)))?;

        let mut history: Vec<ChatMessage> = match existing {
            Some(row) => {
                let value: serde_json::Value = row.try_get("messages").map_err(|e| {
                    StoreError::database(format!("Failed to read snapshot column: {}", e))
                })?;
                serde_json::from_value(value).map_err(|e| {
                    StoreError::serialization(format!("Malformed stored history: {}", e))
                })?
            }
            None => Vec::new(),
        };
        history.extend_from_slice(messages);

        let snapshot = serde_json::to_value(&history)
            .map_err(|e| StoreError::serialization(e.to_string()))?;
        let upsert = format!(
            r#"
            INSERT INTO {} (conversation_id, messages, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (conversation_id)
            DO UPDATE SET messages = EXCLUDED.messages, updated_at = EXCLUDED.updated_at
            "#,
            self.checkpoints_table
        );
        sqlx::query(&upsert)
            .bind(id.as_uuid())
            .bind(snapshot)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::database(format!("Failed to upsert snapshot: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }
}
