//! Context window management for replayed conversation history.
//!
//! 1. **[`tokens`]**: [`TokenCounter`] gives a model-specific token count
//!    backed by a real BPE tokenizer. A missing tokenizer is a startup error,
//!    never a silent approximation.
//!
//! 2. **[`trim`]**: [`HistoryTrimmer`] keeps the longest recent suffix of
//!    turns that fits the history budget. Turns are dropped whole, never split.

pub mod tokens;
pub mod trim;

pub use tokens::{CountTokens, TokenCounter};
pub use trim::{HistoryTrimmer, TrimReport};
