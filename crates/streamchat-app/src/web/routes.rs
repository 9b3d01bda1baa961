use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use streamchat_api::{ChatClient, StreamSink};
use streamchat_tools::ToolRegistry;

use crate::web::{
    protocol::{ClientMessage, ServerMessage, SessionId},
    session_manager::{Session, SessionManager},
};

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub session_manager: Arc<SessionManager>,
    pub chat_client: Arc<ChatClient>,
    pub registry: Arc<ToolRegistry>,
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // API routes
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", delete(close_session))
        // WebSocket endpoint
        .route("/ws/:session_id", get(websocket_handler))
        // Chat page
        .route("/", get(serve_index))
        .with_state(state)
}

/// GET /api/sessions - List all active sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.session_manager.list_sessions().await;
    Json(serde_json::json!({ "sessions": sessions }))
}

/// POST /api/sessions - Create a new session
async fn create_session(State(state): State<AppState>) -> Json<serde_json::Value> {
    let session_id = state.session_manager.create_session().await;
    Json(serde_json::json!({
        "session_id": session_id,
        "websocket_url": format!("/ws/{}", session_id),
    }))
}

/// DELETE /api/sessions/:id - Close a session
async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .session_manager
        .remove_session(&id)
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /ws/:session_id - WebSocket endpoint
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, state, session_id))
}

/// Handle one WebSocket connection to a session
async fn handle_websocket(socket: WebSocket, state: AppState, session_id: SessionId) {
    let session = match state.session_manager.get_session(&session_id).await {
        Some(session) => session,
        None => {
            eprintln!("WebSocket: session {} not found", session_id);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Writer task: serialize server messages onto the socket
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if ws_sender.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Send the current conversation so the client can render it
    {
        let chat = session.chat.lock().await;
        let _ = tx.send(ServerMessage::SessionJoined {
            session_id,
            history: chat.history().to_vec(),
        });
    }

    while let Some(Ok(frame)) = ws_receiver.next().await {
        let text = match frame {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        let client_message = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(message) => message,
            Err(e) => {
                let _ = tx.send(ServerMessage::TurnError {
                    error: format!("Unrecognized message: {}", e),
                });
                continue;
            }
        };

        match client_message {
            ClientMessage::SendMessage { content } => {
                handle_turn(&state, &session, &tx, content).await;
            }
            ClientMessage::ResetConversation => {
                session.chat.lock().await.reset();
                let _ = tx.send(ServerMessage::ConversationReset);
            }
        }
        session.touch().await;
    }

    writer.abort();
}

/// Forwards streamed assistant fragments to the connected client
struct WsSink<'a> {
    tx: &'a mpsc::UnboundedSender<ServerMessage>,
}

#[async_trait::async_trait]
impl StreamSink for WsSink<'_> {
    async fn on_fragment(&mut self, fragment: &str) -> anyhow::Result<()> {
        self.tx
            .send(ServerMessage::AssistantMessageChunk {
                chunk: fragment.to_string(),
            })
            .map_err(|_| anyhow::anyhow!("client disconnected"))
    }
}

/// One complete turn: append the user message, truncate, stream the reply,
/// append what the turn produced, truncate again, write the transcript.
/// A streaming failure still persists whatever partial text accumulated.
async fn handle_turn(
    state: &AppState,
    session: &Arc<Session>,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    content: String,
) {
    let mut chat = session.chat.lock().await;
    chat.push_user(content);

    let mut sink = WsSink { tx };
    let mut turn = Vec::new();
    let result = state
        .chat_client
        .run_turn(chat.history(), &state.registry, &mut sink, &mut turn)
        .await;

    chat.extend_turn(turn);
    chat.commit_transcript();

    match result {
        Ok(()) => {
            let _ = tx.send(ServerMessage::AssistantMessageComplete);
        }
        Err(e) => {
            eprintln!("[Turn error] session {}: {}", session.id, e);
            let _ = tx.send(ServerMessage::TurnError {
                error: e.to_string(),
            });
        }
    }
}

/// GET / - Serve the chat page
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../../web/index.html"))
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::NotFound(message) = self;
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}
