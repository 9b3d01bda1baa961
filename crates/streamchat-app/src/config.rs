use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use streamchat_api::DEFAULT_API_URL;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Approximate token ceiling for conversation history. Must comfortably
/// exceed the system prompt's own estimate; the truncation policy never
/// evicts the system message.
pub const DEFAULT_MAX_TOKENS: usize = 3000;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. You have access to a \
    get_date_and_time tool; use it whenever the user asks about the current date \
    or time instead of guessing. Keep your answers concise.";

/// CLI arguments for streamchat
#[derive(Parser, Debug)]
#[command(name = "streamchat")]
#[command(about = "Streaming chatbot demo over a hosted LLM API")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// API key for the hosted model endpoint
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat-completions endpoint URL
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    /// Model name passed through to the endpoint
    #[arg(long, env = "MODEL_NAME")]
    pub model: Option<String>,

    /// Approximate token budget for conversation history
    #[arg(long, env = "MAX_TOKENS")]
    pub max_tokens: Option<usize>,

    /// Address to bind the web interface on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Directory for per-session transcript files
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}

/// Resolved application configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub system_prompt: String,
    pub log_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let api_key = cli
            .api_key
            .context("API_KEY is not set; export it or put it in a .env file")?;

        let max_tokens = cli.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        anyhow::ensure!(max_tokens > 0, "MAX_TOKENS must be greater than zero");

        Ok(Self {
            api_key,
            api_url: cli.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: cli.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            system_prompt: SYSTEM_PROMPT.to_string(),
            log_dir: cli.log_dir,
            bind_addr: cli.bind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("streamchat").chain(args.iter().copied()))
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let mut parsed = cli(&[]);
        parsed.api_key = None;
        assert!(AppConfig::from_cli(parsed).is_err());
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let mut parsed = cli(&["--max-tokens", "0"]);
        parsed.api_key = Some("k".into());
        assert!(AppConfig::from_cli(parsed).is_err());
    }

    #[test]
    fn defaults_fill_in_everything_but_the_key() {
        let mut parsed = cli(&[]);
        parsed.api_key = Some("k".into());
        parsed.api_url = None;
        parsed.model = None;
        parsed.max_tokens = None;
        let config = AppConfig::from_cli(parsed).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }
}
