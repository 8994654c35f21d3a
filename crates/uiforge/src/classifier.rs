//! Ask-or-generate classification.
//!
//! Decides per turn whether the assistant should ask one clarifying question
//! or generate code now. Two layers enforce "don't interrogate the user":
//!
//! 1. A hard ceiling: once `max_ask_rounds` questions have been asked in the
//!    session, the answer is [`Classification::Generate`] and the completion
//!    service is not consulted. This is the only guarantee callers and tests
//!    should rely on.
//! 2. The policy prompt, which tells the model not to ask twice. Advisory only.
//!
//! Every failure path (transport error, empty reply, undecodable JSON,
//! unknown action, missing, extra, or non-string fields) resolves to `Generate`.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Message;
use crate::completion::{CompletionRequest, CompletionService, OutputMode};
use crate::config::GeneratorConfig;
use crate::json_schema_for;
use crate::prompt::{CLASSIFIER_SYSTEM_PROMPT, classifier_user_prompt};
use crate::turn::{Classification, Turn};

/// Schema name sent with the structured-output request.
const DECISION_SCHEMA_NAME: &str = "turn_decision";

/// Reply shape requested from the completion service and decoded from it.
///
/// The derived schema is sent in strict mode, so both fields are required
/// strings and nothing else is allowed.
#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct DecisionReply {
    /// `"ask"` or `"generate"`.
    action: String,
    /// The clarifying question, or an empty string.
    question: String,
}

/// Makes the ask-or-generate call for one turn.
pub struct TurnClassifier<'a> {
    service: &'a dyn CompletionService,
    config: &'a GeneratorConfig,
}

impl<'a> TurnClassifier<'a> {
    pub fn new(service: &'a dyn CompletionService, config: &'a GeneratorConfig) -> Self {
        Self { service, config }
    }

    /// Classify `user_input` given prior turns and the session's ask count.
    ///
    /// Infallible by contract: every failure degrades to `Generate`.
    pub async fn classify(
        &self,
        user_input: &str,
        history: &[Turn],
        ask_rounds_done: u32,
    ) -> Classification {
        if ask_rounds_done >= self.config.max_ask_rounds {
            debug!(
                "Ask ceiling reached ({ask_rounds_done}/{}), generating",
                self.config.max_ask_rounds
            );
            return Classification::Generate;
        }

        let request = self.build_request(user_input, history);
        let decision = match self.service.complete(request).await {
            Ok(raw) => decode_decision(&raw),
            Err(e) => Err(format!("classifier call failed: {e}")),
        };

        match decision {
            Ok(classification) => {
                debug!("Classified turn as {}", classification.action());
                classification
            }
            Err(e) => {
                warn!("{e}. Falling back to generate.");
                Classification::Generate
            }
        }
    }

    /// Structured-output request carrying the recent conversation window.
    pub fn build_request(&self, user_input: &str, history: &[Turn]) -> CompletionRequest {
        CompletionRequest {
            preamble: vec![Message::system(CLASSIFIER_SYSTEM_PROMPT)],
            history: Vec::new(),
            user: classifier_user_prompt(
                user_input,
                history,
                self.config.classifier_history_turns,
                self.config.classifier_turn_chars,
            ),
            sampling: self.config.classifier_sampling(),
            output: OutputMode::Structured {
                name: DECISION_SCHEMA_NAME.to_string(),
                schema: decision_schema(),
            },
        }
    }
}

/// JSON Schema for the two-field decision payload.
pub fn decision_schema() -> serde_json::Value {
    let mut schema = json_schema_for::<DecisionReply>();
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

/// Decode a raw classifier reply.
///
/// `Err` means the reply is unusable and the caller should generate.
pub fn decode_decision(raw: &str) -> Result<Classification, String> {
    let reply: DecisionReply = serde_json::from_str(raw.trim())
        .map_err(|e| format!("classifier reply does not match the decision schema ({e})"))?;

    match reply.action.as_str() {
        "generate" => Ok(Classification::Generate),
        "ask" => {
            let question = reply.question.trim();
            if question.is_empty() {
                return Err("classifier asked an empty question".to_string());
            }
            Ok(Classification::Ask {
                question: question.to_string(),
            })
        }
        other => Err(format!("classifier returned unknown action '{other}'")),
    }
}
