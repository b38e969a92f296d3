//! OpenAI chat adapter - Implementation of ChatModel for the OpenAI API.
//!
//! Streams completions via SSE and supports function/tool calling: the
//! `web_search` tool is advertised on every request and incoming
//! `tool_calls` deltas are accumulated by index until the finish chunk.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiChatConfig::new(api_key)
//!     .with_model("gpt-4o")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let model = OpenAiChatModel::new(config);
//! ```

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::{ChatMessage, ToolCall, WEB_SEARCH_TOOL};
use crate::ports::{AssistantTurn, ChatModel, ModelError, ModelEvent, ModelEventStream};

/// Configuration for the OpenAI chat adapter.
#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gpt-4o").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures of the initial request.
    pub max_retries: u32,
}

impl OpenAiChatConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat completions client.
pub struct OpenAiChatModel {
    config: OpenAiChatConfig,
    client: Client,
}

impl OpenAiChatModel {
    /// Creates a new adapter with the given configuration.
    pub fn new(config: OpenAiChatConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts a history to the OpenAI wire format.
    fn to_wire_request(&self, messages: &[ChatMessage]) -> WireRequest {
        let messages = messages.iter().map(to_wire_message).collect();

        WireRequest {
            model: self.config.model.clone(),
            messages,
            tools: vec![web_search_tool_definition()],
            stream: true,
        }
    }

    /// Sends the streaming request, retrying transient failures with
    /// exponential backoff.
    async fn send_streaming_request(
        &self,
        messages: &[ChatMessage],
    ) -> Result<Response, ModelError> {
        let wire_request = self.to_wire_request(messages);
        let mut retry_count = 0;

        loop {
            let result = self
                .client
                .post(self.completions_url())
                .header("Authorization", format!("Bearer {}", self.config.api_key()))
                .header("Content-Type", "application/json")
                .json(&wire_request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        ModelError::Timeout {
                            timeout_secs: self.config.timeout.as_secs() as u32,
                        }
                    } else if e.is_connect() {
                        ModelError::network(format!("Connection failed: {}", e))
                    } else {
                        ModelError::network(e.to_string())
                    }
                });

            let error = match result {
                Ok(response) => match handle_response_status(response).await {
                    Ok(response) => return Ok(response),
                    Err(err) => err,
                },
                Err(err) => err,
            };

            if !error.is_retryable() || retry_count >= self.config.max_retries {
                return Err(error);
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            let delay = Duration::from_secs(1 << retry_count);
            tracing::debug!(%error, retry_count, "retrying model request");
            sleep(delay).await;
            retry_count += 1;
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ModelEventStream, ModelError> {
        let response = self.send_streaming_request(messages).await?;
        let mut bytes_stream = response.bytes_stream();

        let stream = try_stream! {
            let mut accumulator = StreamAccumulator::new();
            // SSE lines can straddle network chunk boundaries.
            let mut buffer = String::new();

            while let Some(chunk) = bytes_stream.next().await {
                let bytes =
                    chunk.map_err(|e| ModelError::network(format!("Stream error: {}", e)))?;
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim_end_matches('\r').to_string();
                    buffer.drain(..=newline);

                    for event in accumulator.push_line(&line)? {
                        yield event;
                    }
                }
            }

            if let Some(event) = accumulator.finish() {
                yield event;
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Maps HTTP status errors to model errors.
async fn handle_response_status(response: Response) -> Result<Response, ModelError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 => Err(ModelError::AuthenticationFailed),
        429 => Err(ModelError::RateLimited {
            retry_after_secs: parse_retry_after(&error_body),
        }),
        400 => Err(ModelError::InvalidRequest(error_body)),
        500..=599 => Err(ModelError::unavailable(format!(
            "Server error {}: {}",
            status, error_body
        ))),
        _ => Err(ModelError::network(format!(
            "Unexpected status {}: {}",
            status, error_body
        ))),
    }
}

/// Parses retry-after from an error response body.
fn parse_retry_after(error_body: &str) -> u32 {
    // OpenAI sometimes includes "try again in Xs" in the error message.
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
        if let Some(s) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = s.find("try again in ") {
                let rest = &s[idx + 13..];
                if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                    if let Ok(secs) = rest[..num_end].parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
    }
    30 // Default retry after
}

/// The `web_search` function definition advertised to the model.
fn web_search_tool_definition() -> WireTool {
    WireTool {
        kind: "function".to_string(),
        function: WireFunction {
            name: WEB_SEARCH_TOOL.to_string(),
            description: "Search the web for current information.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        },
    }
}

/// Converts a domain message to the wire format.
///
/// Assistant tool-call arguments are JSON-encoded strings on the wire.
fn to_wire_message(message: &ChatMessage) -> WireMessage {
    match message {
        ChatMessage::User { content } => WireMessage {
            role: "user".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => WireMessage {
            role: "assistant".to_string(),
            content: Some(content.clone()),
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls.iter().map(to_wire_tool_call).collect())
            },
            tool_call_id: None,
        },
        ChatMessage::Tool {
            content,
            tool_call_id,
            ..
        } => WireMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.clone()),
        },
    }
}

fn to_wire_tool_call(call: &ToolCall) -> WireToolCall {
    WireToolCall {
        id: call.id.clone(),
        kind: "function".to_string(),
        function: WireFunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        },
    }
}

// ----- Streaming accumulation -----

/// Accumulates SSE data lines into model events.
///
/// Content deltas are forwarded as they arrive; tool-call deltas are merged
/// by index until the finish chunk, which yields the completed turn.
struct StreamAccumulator {
    content: String,
    tool_calls: Vec<ToolCallDraft>,
    completed: bool,
}

#[derive(Default)]
struct ToolCallDraft {
    id: String,
    name: String,
    arguments: String,
}

impl StreamAccumulator {
    fn new() -> Self {
        Self {
            content: String::new(),
            tool_calls: Vec::new(),
            completed: false,
        }
    }

    /// Consumes one SSE line, producing any events it completes.
    fn push_line(&mut self, line: &str) -> Result<Vec<ModelEvent>, ModelError> {
        let Some(data) = line.strip_prefix("data: ") else {
            return Ok(Vec::new());
        };

        if data == "[DONE]" {
            // Finish normally arrives with a finish_reason chunk first;
            // treat a bare [DONE] as completion for lenient providers.
            return Ok(self.finish().into_iter().collect());
        }

        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        let chunk: WireStreamChunk = serde_json::from_str(data)
            .map_err(|e| ModelError::parse(format!("Failed to parse SSE chunk: {}", e)))?;

        let mut events = Vec::new();
        if let Some(choice) = chunk.choices.into_iter().next() {
            if let Some(content) = choice.delta.content {
                if !content.is_empty() {
                    self.content.push_str(&content);
                    events.push(ModelEvent::ContentDelta(content));
                }
            }

            for delta in choice.delta.tool_calls.unwrap_or_default() {
                let index = delta.index;
                if self.tool_calls.len() <= index {
                    self.tool_calls.resize_with(index + 1, ToolCallDraft::default);
                }
                let draft = &mut self.tool_calls[index];
                if let Some(id) = delta.id {
                    draft.id.push_str(&id);
                }
                if let Some(function) = delta.function {
                    if let Some(name) = function.name {
                        draft.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        draft.arguments.push_str(&arguments);
                    }
                }
            }

            if choice.finish_reason.is_some() {
                events.extend(self.complete()?);
            }
        }

        Ok(events)
    }

    /// Yields the completed turn if the stream ended without one.
    fn finish(&mut self) -> Option<ModelEvent> {
        if self.completed {
            return None;
        }
        // Tool-call drafts without a finish chunk are best-effort parsed;
        // unparseable argument fragments become empty objects.
        self.complete().ok().and_then(|mut events| events.pop())
    }

    fn complete(&mut self) -> Result<Vec<ModelEvent>, ModelError> {
        if self.completed {
            return Ok(Vec::new());
        }
        self.completed = true;

        let mut tool_calls = Vec::with_capacity(self.tool_calls.len());
        for draft in self.tool_calls.drain(..) {
            let arguments = if draft.arguments.trim().is_empty() {
                json!({})
            } else {
                serde_json::from_str(&draft.arguments).map_err(|e| {
                    ModelError::parse(format!("Malformed tool-call arguments: {}", e))
                })?
            };
            tool_calls.push(ToolCall::new(draft.id, draft.name, arguments));
        }

        Ok(vec![ModelEvent::Completed(AssistantTurn {
            content: std::mem::take(&mut self.content),
            tool_calls,
        })])
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    tools: Vec<WireTool>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    choices: Vec<WireStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    delta: WireStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct WireStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCallDelta {
    index: usize,
    id: Option<String>,
    function: Option<WireFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct WireFunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}
