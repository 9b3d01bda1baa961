use serde::{Deserialize, Serialize};
use uuid::Uuid;

use streamchat_models::Message;

/// Session ID type
pub type SessionId = Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    /// One user message per submission
    SendMessage { content: String },
    /// Explicit reset back to the initial system-message-only state
    ResetConversation,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Sent on connect with the current conversation so the client can render it
    SessionJoined {
        session_id: SessionId,
        history: Vec<Message>,
    },
    /// One streamed fragment of the in-progress assistant reply
    AssistantMessageChunk { chunk: String },
    /// The turn finished and the transcript was written
    AssistantMessageComplete,
    /// The conversation was reset to its initial state
    ConversationReset,
    /// Visible failure notice; partial assistant text already sent stands
    TurnError { error: String },
}

/// Summary of a session for the REST listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub created_at: String,
    pub last_activity: String,
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn client_messages_round_trip_through_the_tagged_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"SendMessage","data":{"content":"hi"}}"#).unwrap();
        match msg {
            ClientMessage::SendMessage { content } => assert_eq!(content, "hi"),
            other => panic!("unexpected message: {:?}", other),
        }

        let reset: ClientMessage = serde_json::from_str(r#"{"type":"ResetConversation"}"#).unwrap();
        assert!(matches!(reset, ClientMessage::ResetConversation));
    }

    #[test]
    fn chunk_message_serializes_with_type_tag() {
        let json = serde_json::to_value(ServerMessage::AssistantMessageChunk {
            chunk: "tok".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "AssistantMessageChunk");
        assert_eq!(json["data"]["chunk"], "tok");
    }
}
