//! The completion service seam.
//!
//! The classifier and the generator never talk HTTP directly. They build a
//! [`CompletionRequest`] and hand it to a [`CompletionService`], which returns
//! the raw reply text. [`OpenRouterClient`] is the production implementation;
//! tests substitute scripted services.

use std::future::Future;
use std::pin::Pin;

use crate::{ChatRequest, Message, OpenRouterClient, ResponseFormat};

/// Boxed future returned by [`CompletionService::complete`].
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;

/// Decoding settings for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Shape the reply is constrained to.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMode {
    /// Free-form markdown.
    Text,
    /// JSON matching `schema`.
    Structured {
        name: String,
        schema: serde_json::Value,
    },
}

/// Everything a completion call needs, in prompt order.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction plus any few-shot exchange.
    pub preamble: Vec<Message>,
    pub history: Vec<Message>,
    pub user: String,
    pub sampling: SamplingConfig,
    pub output: OutputMode,
}

impl CompletionRequest {
    /// Flatten into the message list sent to the model.
    pub fn into_messages(self) -> Vec<Message> {
        let mut messages = self.preamble;
        messages.extend(self.history);
        messages.push(Message::user(self.user));
        messages
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.output, OutputMode::Structured { .. })
    }
}

/// An opaque text completion provider.
///
/// Uses a boxed future so the trait stays dyn-compatible.
pub trait CompletionService: Send + Sync {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture<'_>;
}

impl CompletionService for OpenRouterClient {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture<'_> {
        Box::pin(async move {
            let body = to_chat_request(request);
            let completion = self.chat(&body).await?;
            match completion.content {
                Some(text) if !text.trim().is_empty() => Ok(text),
                _ => Err(format!(
                    "empty LLM response (finish_reason={})",
                    completion.finish_reason.as_deref().unwrap_or("none")
                )),
            }
        })
    }
}

fn to_chat_request(request: CompletionRequest) -> ChatRequest {
    let sampling = request.sampling.clone();
    let response_format = match &request.output {
        OutputMode::Text => None,
        OutputMode::Structured { name, schema } => {
            Some(ResponseFormat::json_schema(name.clone(), schema.clone()))
        }
    };
    ChatRequest {
        model: sampling.model,
        messages: request.into_messages(),
        max_tokens: sampling.max_tokens,
        temperature: Some(sampling.temperature),
        response_format,
    }
}
