//! Convenience re-exports for common `uiforge` types.
//!
//! ```ignore
//! use uiforge::prelude::*;
//! ```
//!
//! Covers the client, the generator and its config, and the turn data
//! model. Prompt text and schema helpers stay in their modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::api::retry::RetryConfig;
pub use crate::{Message, MessageRole, OpenRouterClient};

// ── Generation ──────────────────────────────────────────────────────
pub use crate::completion::{CompletionRequest, CompletionService, OutputMode, SamplingConfig};
pub use crate::config::GeneratorConfig;
pub use crate::generator::Generator;

// ── Context management ──────────────────────────────────────────────
pub use crate::context::{CountTokens, HistoryTrimmer, TokenCounter};

// ── Turns ───────────────────────────────────────────────────────────
pub use crate::turn::{
    Classification, CodeArtifact, GenerationResult, Turn, TurnAction, TurnRole,
};
