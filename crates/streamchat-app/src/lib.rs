//! streamchat application: configuration, per-session state, and the web UI.

pub mod config;
pub mod session;
pub mod web;

pub use config::{AppConfig, Cli};
pub use session::{ChatSession, TranscriptWriter};
