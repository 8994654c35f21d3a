//! Model-specific token counting.
//!
//! Encoders are loaded once per model name and shared read-only for the rest
//! of the process. Construction is the only fallible step: if the configured
//! model has no known tokenizer, [`TokenCounter::for_model`] fails and the
//! caller should refuse to start. An approximate budget would overflow the
//! context window silently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Anything that can size a piece of text in tokens.
///
/// Implementations must be deterministic and non-decreasing as text grows.
pub trait CountTokens: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Process-wide encoder cache, keyed by normalized model name.
static ENCODERS: OnceLock<Mutex<HashMap<String, Arc<CoreBPE>>>> = OnceLock::new();

/// BPE token counter for one model. Cheap to clone.
#[derive(Clone)]
pub struct TokenCounter {
    model: String,
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl TokenCounter {
    /// Resolve the tokenizer for `model`.
    ///
    /// Provider prefixes are ignored (`"openai/gpt-4o"` resolves as
    /// `"gpt-4o"`). Returns `Err` when the model has no known tokenizer.
    pub fn for_model(model: &str) -> Result<Self, String> {
        let name = normalize_model(model);
        let cache = ENCODERS.get_or_init(|| Mutex::new(HashMap::new()));
        let mut encoders = cache
            .lock()
            .map_err(|_| "tokenizer cache lock poisoned".to_string())?;

        if let Some(bpe) = encoders.get(name) {
            return Ok(Self {
                model: name.to_string(),
                bpe: Arc::clone(bpe),
            });
        }

        let bpe = tiktoken_rs::get_bpe_from_model(name)
            .map_err(|e| format!("no tokenizer available for model '{model}': {e}"))?;
        let bpe = Arc::new(bpe);
        encoders.insert(name.to_string(), Arc::clone(&bpe));
        debug!("Loaded tokenizer for {name}");

        Ok(Self {
            model: name.to_string(),
            bpe,
        })
    }

    /// The normalized model name this counter encodes for.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CountTokens for TokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

fn normalize_model(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model).trim()
}
