//! Chat-completions wire format.
//!
//! Request bodies serialize straight into the OpenRouter payload; replies are
//! decoded by [`decode_completion`], which is kept separate from the HTTP
//! call so it can be tested on canned bodies.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Messages ───────────────────────────────────────────────────────

/// Author of a chat message.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One chat message as sent to the model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }
}

// ── Request ────────────────────────────────────────────────────────

/// Request body. `max_tokens == 0` and `None` fields are left out.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_unset")]
    pub max_tokens: u32,
    /// Sent whenever set, including `0.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

fn is_unset(max_tokens: &u32) -> bool {
    *max_tokens == 0
}

/// Constraint on the reply shape.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// JSON matching a named schema.
    JsonSchema { json_schema: NamedSchema },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NamedSchema {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

impl ResponseFormat {
    /// Strict schema-constrained output.
    pub fn json_schema(name: impl Into<String>, schema: serde_json::Value) -> Self {
        ResponseFormat::JsonSchema {
            json_schema: NamedSchema {
                name: name.into(),
                strict: true,
                schema,
            },
        }
    }
}

// ── Reply ──────────────────────────────────────────────────────────

/// First choice of a decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

/// Token usage reported by the provider.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Deserialize)]
struct ReplyBody {
    #[serde(default)]
    choices: Vec<ReplyChoice>,
    error: Option<ReplyError>,
    usage: Option<UsageInfo>,
}

#[derive(Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ReplyError {
    message: String,
}

/// Decode a 2xx reply body.
///
/// An `error` object inside a successful response is still an error. A body
/// with no choices decodes to a completion without content.
pub fn decode_completion(body: &str) -> Result<ChatCompletion, String> {
    let reply: ReplyBody =
        serde_json::from_str(body).map_err(|e| format!("failed to parse response: {e}"))?;

    if let Some(err) = reply.error {
        return Err(format!("OpenRouter API error: {}", err.message));
    }
    if let Some(usage) = &reply.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    let (content, finish_reason) = match reply.choices.into_iter().next() {
        Some(choice) => (choice.message.content, choice.finish_reason),
        None => (None, None),
    };
    Ok(ChatCompletion {
        content,
        usage: reply.usage,
        finish_reason,
    })
}
