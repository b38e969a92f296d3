//! Conversation history types.
//!
//! A conversation is an append-only, chronologically ordered sequence of
//! [`ChatMessage`] values keyed by a [`ConversationId`]. Messages are never
//! mutated or removed once recorded; resuming a conversation extends the
//! sequence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire name of the web-search tool exposed to the model.
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Opaque identifier correlating a client's requests to one persisted
/// message history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(Uuid);

impl ConversationId {
    /// Creates a new random ConversationId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ConversationId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ConversationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A single message in a conversation history.
///
/// Assistant messages may request zero or more tool invocations; exactly one
/// tool message answers each requested invocation before the next assistant
/// turn is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    /// Text sent by the end user.
    User { content: String },
    /// Model output, possibly requesting tool invocations.
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of a tool invocation, correlated by `tool_call_id`.
    Tool {
        content: String,
        tool_call_id: String,
        tool_name: String,
    },
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Creates an assistant message with no tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Creates an assistant message that requests tool invocations.
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Creates a tool-result message answering the given call.
    pub fn tool(
        content: impl Into<String>,
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
    ) -> Self {
        Self::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
        }
    }

    /// Returns the role of this message.
    pub fn role(&self) -> MessageRole {
        match self {
            Self::User { .. } => MessageRole::User,
            Self::Assistant { .. } => MessageRole::Assistant,
            Self::Tool { .. } => MessageRole::Tool,
        }
    }

    /// Returns the textual content of this message.
    pub fn content(&self) -> &str {
        match self {
            Self::User { content }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content,
        }
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

/// A structured request, emitted by the model, to call an external
/// capability with named arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlates the request to its eventual tool-result message.
    pub id: String,
    /// Tool name as emitted by the model.
    pub name: String,
    /// Named arguments as a JSON object.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Resolves the tool kind this call dispatches to.
    pub fn kind(&self) -> ToolKind {
        ToolKind::from_name(&self.name)
    }

    /// Returns a string argument by name, if present.
    pub fn string_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Known tool kinds, matched exhaustively at dispatch time.
///
/// Unrecognized names map to [`ToolKind::Unrecognized`] and get a defined
/// fallback result rather than being silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// The single in-scope tool: web search.
    WebSearch,
    /// Any tool name this backend does not implement.
    Unrecognized,
}

impl ToolKind {
    /// Maps a wire tool name to a known kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            WEB_SEARCH_TOOL => Self::WebSearch,
            _ => Self::Unrecognized,
        }
    }
}
