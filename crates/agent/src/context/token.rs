//! Token estimation and history trimming.
//!
//! Uses a character-based heuristic: ~4 characters per token, counted in
//! Unicode scalar values. Close enough for budgeting against BPE tokenizers
//! and, more importantly, deterministic.

use tfpilot_core::message::Message;

/// Fixed cost of one message for role name, delimiters and formatting.
pub const PER_MESSAGE_OVERHEAD: usize = 4;

/// Estimate the token count for a string.
///
/// One token per 4 characters, rounded down, but never 0 for non-empty text.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.chars().count() / 4).max(1)
}

/// Estimate tokens for a single message including per-message overhead.
pub fn estimate_message_tokens(message: &Message) -> usize {
    PER_MESSAGE_OVERHEAD
        + estimate_tokens(message.role().as_str())
        + estimate_tokens(message.content())
}

/// Estimate tokens for a slice of messages.
pub fn estimate_messages_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}

/// Drop the oldest history messages until `fixed` plus history fits `max_tokens`.
///
/// `fixed` is never altered. When `fixed` alone is over budget the result is
/// empty; detecting that case is the caller's job. The result is always a
/// contiguous suffix of `history`.
pub fn trim_history(fixed: &[Message], history: &[Message], max_tokens: usize) -> Vec<Message> {
    let fixed_tokens = estimate_messages_tokens(fixed);
    let mut total = fixed_tokens + estimate_messages_tokens(history);
    let mut start = 0;

    while start < history.len() && total > max_tokens {
        total -= estimate_message_tokens(&history[start]);
        start += 1;
    }

    history[start..].to_vec()
}
