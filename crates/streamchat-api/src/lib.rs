//! Streaming chat-completions client with tool execution.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint over SSE,
//! forwards assistant text fragments to a caller-supplied sink as they
//! arrive, and runs requested tools between rounds. The caller owns the
//! conversation store; this crate only reads it and reports the messages
//! a turn produced.

pub mod sse;

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;

use streamchat_models::{ChatRequest, Message, StreamChunk, ToolCall};
use streamchat_tools::ToolRegistry;

use crate::sse::{absorb_tool_call_deltas, drain_sse_events, PartialToolCall, DONE_MARKER};

/// Default endpoint: Google's OpenAI-compatibility layer for Gemini.
pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// Upper bound on tool rounds within a single turn.
pub const MAX_TOOL_ITERATIONS: usize = 8;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("stream transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("stream consumer rejected a fragment: {0}")]
    Sink(String),
    #[error("tool loop did not settle within {0} iterations")]
    ToolIterations(usize),
}

/// Consumer of assistant text fragments as they stream in. Implementations
/// typically forward each fragment to a live display. Returning an error
/// interrupts the stream; text accumulated up to that point is still
/// committed by the caller.
#[async_trait]
pub trait StreamSink: Send {
    async fn on_fragment(&mut self, fragment: &str) -> anyhow::Result<()>;
}

/// Client for a hosted OpenAI-compatible chat-completions API
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one conversational turn against the API.
    ///
    /// Streams the assistant reply, executing requested tools and re-issuing
    /// the request until a round completes without tool calls. Every message
    /// the turn produces (assistant text, assistant tool-call records, tool
    /// results) is pushed onto `out` in order, including on failure, so an
    /// interrupted stream never silently discards accumulated partial text.
    pub async fn run_turn(
        &self,
        history: &[Message],
        registry: &ToolRegistry,
        sink: &mut dyn StreamSink,
        out: &mut Vec<Message>,
    ) -> Result<(), ApiError> {
        let mut working = history.to_vec();

        for _ in 0..MAX_TOOL_ITERATIONS {
            let request = self.build_request(&working, registry);
            let mut content = String::new();
            let mut partial_calls = Vec::new();

            if let Err(e) = self
                .stream_round(&request, sink, &mut content, &mut partial_calls)
                .await
            {
                if !content.is_empty() {
                    out.push(Message::assistant(content));
                }
                return Err(e);
            }

            let tool_calls: Vec<ToolCall> = partial_calls
                .into_iter()
                .filter(|c| !c.name.is_empty())
                .map(PartialToolCall::finish)
                .collect();

            if tool_calls.is_empty() {
                out.push(Message::assistant(content));
                return Ok(());
            }

            let mut assistant = Message::assistant(content);
            assistant.tool_calls = Some(tool_calls.clone());
            working.push(assistant.clone());
            out.push(assistant);

            for call in tool_calls {
                let result = registry
                    .execute(&call.function.name, &call.function.arguments)
                    .await;
                let text = if result.success {
                    result.content
                } else {
                    result
                        .error
                        .unwrap_or_else(|| "tool execution failed".to_string())
                };
                let message = Message::tool(text, call.id, call.function.name);
                working.push(message.clone());
                out.push(message);
            }
        }

        Err(ApiError::ToolIterations(MAX_TOOL_ITERATIONS))
    }

    fn build_request(&self, messages: &[Message], registry: &ToolRegistry) -> ChatRequest {
        let tools = registry.definitions();
        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some("auto".to_string())
        };
        ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            tools,
            tool_choice,
            stream: Some(true),
        }
    }

    /// One streaming request/response round. Assistant text deltas are
    /// appended to `content` and forwarded to the sink; tool-call fragments
    /// accumulate in `calls`.
    async fn stream_round(
        &self,
        request: &ChatRequest,
        sink: &mut dyn StreamSink,
        content: &mut String,
        calls: &mut Vec<PartialToolCall>,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(ApiError::Status { status, body });
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk_result) = stream.next().await {
            let bytes = chunk_result?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            for data in drain_sse_events(&mut buffer) {
                if data.trim() == DONE_MARKER {
                    return Ok(());
                }

                // Malformed interleavings (keep-alives, vendor extras) are
                // skipped rather than failing the stream.
                let Ok(chunk) = serde_json::from_str::<StreamChunk>(&data) else {
                    continue;
                };

                if let Some(choice) = chunk.choices.first() {
                    if let Some(text) = &choice.delta.content {
                        if !text.is_empty() {
                            content.push_str(text);
                            sink.on_fragment(text)
                                .await
                                .map_err(|e| ApiError::Sink(e.to_string()))?;
                        }
                    }
                    if let Some(deltas) = &choice.delta.tool_calls {
                        absorb_tool_call_deltas(calls, deltas);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use streamchat_tools::DateTimeTool;

    #[test]
    fn request_without_tools_omits_tool_choice() {
        let client = ChatClient::new(DEFAULT_API_URL, "key", "gemini-2.0-flash");
        let request = client.build_request(&[Message::system("s")], &ToolRegistry::new());
        assert!(request.tools.is_empty());
        assert!(request.tool_choice.is_none());
        assert_eq!(request.stream, Some(true));
    }

    #[test]
    fn request_with_tools_sets_auto_choice() {
        let client = ChatClient::new(DEFAULT_API_URL, "key", "gemini-2.0-flash");
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(DateTimeTool));

        let request = client.build_request(&[Message::system("s")], &registry);
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tool_choice.as_deref(), Some("auto"));
    }
}
