use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use streamchat::config::{AppConfig, Cli};
use streamchat::web::WebServer;
use streamchat_api::ChatClient;
use streamchat_tools::{DateTimeTool, ToolRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DateTimeTool));

    let chat_client = Arc::new(ChatClient::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.model.clone(),
    ));

    println!(
        "{} model {} | max_tokens {} | transcripts in {}",
        "streamchat".bright_cyan().bold(),
        config.model.bright_green(),
        config.max_tokens,
        config.log_dir.display()
    );

    WebServer::new(config, chat_client, Arc::new(registry))
        .start()
        .await
}
