//! Conversational UI component generation on top of a chat-completions API.
//!
//! `uiforge` turns a natural-language UI request into runnable React
//! component code. Every user turn goes through one [`Generator::run()`]
//! call, which decides whether to ask **one** clarifying question or to
//! generate code right away, keeps the conversation inside the model's
//! context window, and extracts typed, filenamed code blocks from the
//! model's markdown reply.
//!
//! # Getting started
//!
//! ```ignore
//! use uiforge::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let api_key = std::env::var("OPENROUTER_KEY").map_err(|e| e.to_string())?;
//!     let client = OpenRouterClient::new(api_key)?;
//!
//!     // Fails fast when no tokenizer exists for the configured model.
//!     let generator = Generator::new(&client, GeneratorConfig::default())?;
//!
//!     let history: Vec<Turn> = Vec::new();
//!     let result = generator.run("a pricing card with three tiers", &history, 0).await?;
//!     for artifact in &result.artifacts {
//!         println!("{} ({})", artifact.filename, artifact.language);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`generator`] | [`Generator`](generator::Generator): classify, trim, generate, parse |
//! | [`classifier`] | Ask-or-generate policy with a hard clarifying-round ceiling |
//! | [`context`] | [`TokenCounter`](context::TokenCounter) and [`HistoryTrimmer`](context::HistoryTrimmer) |
//! | [`parser`] | Fenced code block extraction into [`CodeArtifact`](turn::CodeArtifact)s |
//! | [`completion`] | [`CompletionService`](completion::CompletionService) seam and its OpenRouter implementation |
//! | [`api`] | OpenRouter client, wire types, and transport retry |
//!
//! # Guarantees
//!
//! 1. **Forward progress.** After `max_ask_rounds` clarifying questions the
//!    classifier stops consulting the model and always generates.
//!
//! 2. **Classification never blocks.** Any failure while classifying
//!    degrades to generation. Only a failed *generation* call surfaces as
//!    an error.
//!
//! 3. **Bounded context.** History sent to the model is the longest recent
//!    suffix that fits the configured token budget.

pub mod api;
pub mod classifier;
pub mod completion;
pub mod config;
pub mod context;
pub mod generator;
pub mod parser;
pub mod prelude;
pub mod prompt;
pub mod turn;

use schemars::JsonSchema;

pub use api::client::OpenRouterClient;
pub use api::wire::{ChatCompletion, ChatRequest, Message, MessageRole, ResponseFormat, UsageInfo};
pub use generator::Generator;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for code generation.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Default model for the ask-or-generate decision.
pub const DEFAULT_CLASSIFIER_MODEL: &str = "openai/gpt-4o-mini";

// ── Schema generation ──────────────────────────────────────────────

/// JSON Schema for `T`, as a `serde_json::Value`, for structured replies.
///
/// # Example
///
/// ```
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct Verdict {
///     action: String,
///     question: String,
/// }
///
/// let schema = uiforge::json_schema_for::<Verdict>();
/// assert_eq!(schema["type"], "object");
/// let required = schema["required"].as_array().unwrap();
/// assert!(required.contains(&"action".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}
