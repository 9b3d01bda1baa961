//! Server-sent-events plumbing for the streaming chat endpoint.

use streamchat_models::{FunctionCall, ToolCall, ToolCallDelta};

/// Marker payload ending an SSE stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Pull complete events out of the buffer and return their `data:` payloads.
/// An incomplete trailing event (no blank-line terminator yet) stays in the
/// buffer for the next read.
pub fn drain_sse_events(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Some(end) = buffer.find("\n\n") {
        let event: String = buffer.drain(..end + 2).collect();
        for line in event.lines() {
            if let Some(data) = line.trim().strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
    }
    payloads
}

/// A tool call under assembly from streamed fragments. The id and name
/// arrive once; arguments are concatenated across chunks.
#[derive(Debug, Clone, Default)]
pub struct PartialToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl PartialToolCall {
    pub fn finish(self) -> ToolCall {
        ToolCall {
            id: self.id,
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: self.name,
                arguments: self.arguments,
            },
        }
    }
}

/// Merge a chunk's tool-call fragments into the calls being assembled,
/// keyed by the fragment index.
pub fn absorb_tool_call_deltas(calls: &mut Vec<PartialToolCall>, deltas: &[ToolCallDelta]) {
    for delta in deltas {
        if delta.index >= calls.len() {
            calls.resize_with(delta.index + 1, PartialToolCall::default);
        }
        let slot = &mut calls[delta.index];
        if let Some(id) = &delta.id {
            if slot.id.is_empty() {
                slot.id = id.clone();
            }
        }
        if let Some(function) = &delta.function {
            if let Some(name) = &function.name {
                if slot.name.is_empty() {
                    slot.name = name.clone();
                }
            }
            if let Some(arguments) = &function.arguments {
                slot.arguments.push_str(arguments);
            }
        }
    }
}
