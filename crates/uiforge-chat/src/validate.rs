//! User message checks.

/// Longest accepted user message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Validate a user message, returning it trimmed.
///
/// Rejects blank input and anything over [`MAX_MESSAGE_CHARS`].
pub fn validate_message(content: &str) -> Result<&str, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    let chars = trimmed.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(format!(
            "Message is too long ({chars} characters, max {MAX_MESSAGE_CHARS})"
        ));
    }
    Ok(trimmed)
}
