//! Per-session conversation state and transcript persistence.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use streamchat_models::Message;
use streamchat_policy::{truncate_if_needed, WordCountEstimator};

/// Writes the full conversation to one JSON file per session.
///
/// The filename is derived from the wall clock on first write and stays
/// bound until `detach`, so every write within a session overwrites the
/// same file. Write failures are reported to stderr and swallowed: a
/// failed log write never aborts a turn, the in-memory conversation
/// stays authoritative.
pub struct TranscriptWriter {
    log_dir: PathBuf,
    path: Option<PathBuf>,
}

impl TranscriptWriter {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            path: None,
        }
    }

    /// File currently bound for this session, if any write has happened.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the bound filename; the next write picks a fresh one.
    /// Files already written stay where they are.
    pub fn detach(&mut self) {
        self.path = None;
    }

    pub fn write(&mut self, messages: &[Message]) {
        if let Err(e) = self.try_write(messages) {
            eprintln!("[Transcript error] {:#}", e);
        }
    }

    fn try_write(&mut self, messages: &[Message]) -> Result<()> {
        fs::create_dir_all(&self.log_dir).with_context(|| {
            format!("Failed to create log directory {}", self.log_dir.display())
        })?;

        let path = match &self.path {
            Some(path) => path.clone(),
            None => {
                let stamp = Local::now().format("%Y%m%d-%H%M%S");
                let path = self.log_dir.join(format!("chatlog_{}.json", stamp));
                self.path = Some(path.clone());
                path
            }
        };

        let json = serde_json::to_string_pretty(messages)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;
        Ok(())
    }
}

/// Explicit per-session context: the conversation, its transcript file
/// binding, and the truncation budget. Created with a single system
/// message; reset restores exactly that state.
pub struct ChatSession {
    messages: Vec<Message>,
    transcript: TranscriptWriter,
    system_prompt: String,
    max_tokens: usize,
    estimator: WordCountEstimator,
}

impl ChatSession {
    pub fn new(
        system_prompt: impl Into<String>,
        max_tokens: usize,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            messages: vec![Message::system(system_prompt.clone())],
            transcript: TranscriptWriter::new(log_dir),
            system_prompt,
            max_tokens,
            estimator: WordCountEstimator,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn transcript_path(&self) -> Option<&Path> {
        self.transcript.path()
    }

    /// Append the user's message and re-apply the token budget.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
        self.enforce_budget();
    }

    /// Append the messages a completed (or interrupted) turn produced and
    /// re-apply the token budget.
    pub fn extend_turn(&mut self, turn: Vec<Message>) {
        self.messages.extend(turn);
        self.enforce_budget();
    }

    /// Persist the current conversation to the session's transcript file.
    pub fn commit_transcript(&mut self) {
        self.transcript.write(&self.messages);
    }

    /// Restore the initial single-system-message state and detach the
    /// transcript filename so the next write picks a fresh one.
    pub fn reset(&mut self) {
        self.messages = vec![Message::system(self.system_prompt.clone())];
        self.transcript.detach();
    }

    fn enforce_budget(&mut self) {
        let messages = std::mem::take(&mut self.messages);
        self.messages = truncate_if_needed(messages, self.max_tokens, &self.estimator);
    }
}
