use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use streamchat_api::ChatClient;
use streamchat_tools::ToolRegistry;

use crate::config::AppConfig;
use crate::web::{routes, session_manager::SessionManager};

/// Web server instance
pub struct WebServer {
    config: AppConfig,
    state: routes::AppState,
}

impl WebServer {
    pub fn new(config: AppConfig, chat_client: Arc<ChatClient>, registry: Arc<ToolRegistry>) -> Self {
        let session_manager = Arc::new(SessionManager::new(config.clone()));
        Self {
            state: routes::AppState {
                session_manager,
                chat_client,
                registry,
            },
            config,
        }
    }

    /// Start the web server
    pub async fn start(self) -> Result<()> {
        let app = routes::create_router(self.state).layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

        println!(
            "{} http://{}",
            "🌐 streamchat listening on".bright_cyan(),
            self.config.bind_addr
        );
        println!("   WebSocket endpoint: ws://{}/ws/{{session_id}}", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
