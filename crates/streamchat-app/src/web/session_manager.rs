use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::session::ChatSession;
use crate::web::protocol::{SessionId, SessionInfo};

/// A chat session. The conversation is behind a Mutex: one logical flow
/// drives a session at a time, the lock just serializes reconnects.
pub struct Session {
    pub id: SessionId,
    pub chat: Mutex<ChatSession>,
    pub created_at: DateTime<Utc>,
    pub last_activity: Mutex<DateTime<Utc>>,
}

impl Session {
    pub fn new(id: SessionId, chat: ChatSession) -> Self {
        let now = Utc::now();
        Self {
            id,
            chat: Mutex::new(chat),
            created_at: now,
            last_activity: Mutex::new(now),
        }
    }

    pub async fn touch(&self) {
        *self.last_activity.lock().await = Utc::now();
    }

    pub async fn info(&self) -> SessionInfo {
        let last_activity = *self.last_activity.lock().await;
        let chat = self.chat.lock().await;
        SessionInfo {
            session_id: self.id,
            created_at: self.created_at.to_rfc3339(),
            last_activity: last_activity.to_rfc3339(),
            message_count: chat.history().len(),
        }
    }
}

/// Owns all active sessions. Each session gets an independent conversation
/// and an independent transcript-file binding; nothing is shared across
/// sessions.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    config: AppConfig,
}

impl SessionManager {
    pub fn new(config: AppConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub async fn create_session(&self) -> SessionId {
        let id = Uuid::new_v4();
        let chat = ChatSession::new(
            &self.config.system_prompt,
            self.config.max_tokens,
            &self.config.log_dir,
        );
        let session = Arc::new(Session::new(id, chat));
        self.sessions.write().await.insert(id, session);
        id
    }

    pub async fn get_session(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(sessions.len());
        for session in sessions {
            infos.push(session.info().await);
        }
        infos
    }

    pub async fn remove_session(&self, id: &SessionId) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| anyhow::anyhow!("Session {} not found", id))
    }
}
