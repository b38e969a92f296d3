//! Domain layer containing conversation types.
//!
//! # Module Organization
//!
//! - `conversation` - Conversation identifiers, message history, tool calls

pub mod conversation;

pub use conversation::{
    ChatMessage, ConversationId, MessageRole, ToolCall, ToolKind, WEB_SEARCH_TOOL,
};
