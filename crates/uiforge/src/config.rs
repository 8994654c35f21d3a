//! Generator configuration with production defaults.
//!
//! Every value here is a fixed per-process constant: the context budget
//! split, the clarifying-round ceiling, the classifier prompt window, and
//! the decoding settings for both calls. Users never influence them per
//! request.
//!
//! # Examples
//!
//! ```
//! use uiforge::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::default()
//!     .with_generation_model("openai/gpt-4o")
//!     .with_max_ask_rounds(1);
//! assert_eq!(config.history_budget(), 128_000 - 4_096 - 2_500);
//! ```

use crate::completion::SamplingConfig;
use crate::{DEFAULT_CLASSIFIER_MODEL, DEFAULT_MODEL};

/// Configuration for a [`Generator`](crate::generator::Generator).
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model that writes the components. Default: `"openai/gpt-4o"`.
    pub generation_model: String,
    /// Model that makes the ask-or-generate call. Default: `"openai/gpt-4o-mini"`.
    pub classifier_model: String,
    /// Model whose tokenizer sizes the context. Default: `"gpt-4o"`.
    pub tokenizer_model: String,
    /// Context window of the generation model in tokens. Default: `128_000`.
    pub context_window: usize,
    /// Tokens kept free for the reply. Default: `4_096`.
    pub response_reserve: usize,
    /// Tokens set aside for the system prompt and few-shot example. Default: `2_500`.
    pub system_reserve: usize,
    /// Per-turn allowance for role and formatting markers. Default: `4`.
    pub turn_overhead: usize,
    /// Clarifying questions allowed per session. Default: `2`.
    pub max_ask_rounds: u32,
    /// Recent turns shown to the classifier. Default: `6`.
    pub classifier_history_turns: usize,
    /// Character cap per turn in the classifier prompt. Default: `300`.
    pub classifier_turn_chars: usize,
    /// Default: `0.0`.
    pub classifier_temperature: f32,
    /// Default: `150`.
    pub classifier_max_tokens: u32,
    /// Generation temperature. Default: `0.3`.
    pub temperature: f32,
    /// Generation output cap. Default: `4_096`.
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generation_model: DEFAULT_MODEL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            tokenizer_model: "gpt-4o".to_string(),
            context_window: 128_000,
            response_reserve: 4_096,
            system_reserve: 2_500,
            turn_overhead: 4,
            max_ask_rounds: 2,
            classifier_history_turns: 6,
            classifier_turn_chars: 300,
            classifier_temperature: 0.0,
            classifier_max_tokens: 150,
            temperature: 0.3,
            max_tokens: 4_096,
        }
    }
}

impl GeneratorConfig {
    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    pub fn with_classifier_model(mut self, model: impl Into<String>) -> Self {
        self.classifier_model = model.into();
        self
    }

    pub fn with_tokenizer_model(mut self, model: impl Into<String>) -> Self {
        self.tokenizer_model = model.into();
        self
    }

    pub fn with_context_window(mut self, tokens: usize) -> Self {
        self.context_window = tokens;
        self
    }

    pub fn with_max_ask_rounds(mut self, rounds: u32) -> Self {
        self.max_ask_rounds = rounds;
        self
    }

    /// Tokens available for replayed history:
    /// `context_window - response_reserve - system_reserve`, floored at zero.
    pub fn history_budget(&self) -> usize {
        self.context_window
            .saturating_sub(self.response_reserve)
            .saturating_sub(self.system_reserve)
    }

    pub fn generation_sampling(&self) -> SamplingConfig {
        SamplingConfig {
            model: self.generation_model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn classifier_sampling(&self) -> SamplingConfig {
        SamplingConfig {
            model: self.classifier_model.clone(),
            temperature: self.classifier_temperature,
            max_tokens: self.classifier_max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_constants() {
        let config = GeneratorConfig::default();
        assert_eq!(config.max_ask_rounds, 2);
        assert_eq!(config.classifier_history_turns, 6);
        assert_eq!(config.classifier_turn_chars, 300);
        assert_eq!(config.max_tokens, 4096);
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.history_budget(), 121_404);
    }

    #[test]
    fn history_budget_saturates_at_zero() {
        let config = GeneratorConfig::default().with_context_window(5_000);
        assert_eq!(config.history_budget(), 0);
    }

    #[test]
    fn sampling_configs_use_their_own_models() {
        let config = GeneratorConfig::default()
            .with_generation_model("big")
            .with_classifier_model("small");
        assert_eq!(config.generation_sampling().model, "big");
        assert_eq!(config.classifier_sampling().model, "small");
        assert_eq!(config.classifier_sampling().max_tokens, 150);
        assert_eq!(config.classifier_sampling().temperature, 0.0);
    }
}
