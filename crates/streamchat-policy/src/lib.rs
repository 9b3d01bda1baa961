//! Token-budget truncation for conversation history.
//!
//! The conversation is kept at or below a configured token ceiling by
//! evicting the oldest non-system messages first. The message at index 0 is
//! the system instruction and is never removed, so when it alone exceeds the
//! budget the result still exceeds the budget. Callers must size the ceiling
//! to accommodate the system prompt.

use streamchat_models::Message;

/// Token counting seam. The default implementation is a cheap
/// whitespace-word approximation; implementors can substitute an exact
/// tokenizer without touching the eviction algorithm.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

/// Approximates token count as the number of whitespace-separated words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCountEstimator;

impl TokenEstimator for WordCountEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Estimated token total for a whole conversation, system message included.
pub fn conversation_tokens(estimator: &dyn TokenEstimator, messages: &[Message]) -> usize {
    messages
        .iter()
        .map(|m| estimator.estimate(&m.content))
        .sum()
}

/// Enforce the token budget by FIFO eviction over the non-system suffix.
///
/// Returns the conversation unchanged when it already fits (or is empty),
/// so repeated application is a fixed point. Otherwise removes messages at
/// index 1, oldest first, until the estimate fits or only the system
/// message remains.
pub fn truncate_if_needed(
    mut messages: Vec<Message>,
    max_tokens: usize,
    estimator: &dyn TokenEstimator,
) -> Vec<Message> {
    if messages.is_empty() {
        return messages;
    }

    let mut total = conversation_tokens(estimator, &messages);
    if total <= max_tokens {
        return messages;
    }

    // Total is computed once; evictions decrement it incrementally.
    while total > max_tokens && messages.len() > 1 {
        let removed = messages.remove(1);
        total -= estimator.estimate(&removed.content);
    }

    messages
}
