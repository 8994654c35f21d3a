//! Conversation data model: turns in, structured turn results out.

use serde::{Deserialize, Serialize};

use crate::Message;

/// Who authored a [`Turn`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// One persisted message of a conversation, oldest first.
///
/// Turns are supplied by the caller and never mutated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    /// The chat message this turn replays as.
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(&self.content),
            TurnRole::Assistant => Message::assistant(&self.content),
        }
    }
}

/// Outcome of the ask-or-generate decision.
///
/// `Ask` always carries a non-empty question; the classifier never builds
/// one otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Ask { question: String },
    Generate,
}

impl Classification {
    pub fn action(&self) -> TurnAction {
        match self {
            Classification::Ask { .. } => TurnAction::Ask,
            Classification::Generate => TurnAction::Generate,
        }
    }
}

/// What the assistant did on a turn.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TurnAction {
    Ask,
    #[default]
    Generate,
}

impl std::fmt::Display for TurnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnAction::Ask => write!(f, "ask"),
            TurnAction::Generate => write!(f, "generate"),
        }
    }
}

/// One named code file extracted from a generation reply.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CodeArtifact {
    pub language: String,
    /// Declared in the block or derived from the language; never empty.
    pub filename: String,
    /// Block body with surrounding whitespace removed.
    pub code: String,
}

/// Structured result of one user turn, ready to be stored as an assistant
/// message.
///
/// Build it through [`GenerationResult::ask`] or
/// [`GenerationResult::generated`]; both keep the action-specific fields
/// consistent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GenerationResult {
    pub action: TurnAction,
    pub content: String,
    pub artifacts: Vec<CodeArtifact>,
    pub token_count: usize,
    /// Exactly one entry for `Ask`, empty for `Generate`.
    pub questions: Vec<String>,
}

impl GenerationResult {
    pub fn ask(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            action: TurnAction::Ask,
            content: question.clone(),
            artifacts: Vec::new(),
            token_count: 0,
            questions: vec![question],
        }
    }

    pub fn generated(content: String, artifacts: Vec<CodeArtifact>, token_count: usize) -> Self {
        Self {
            action: TurnAction::Generate,
            content,
            artifacts,
            token_count,
            questions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;

    #[test]
    fn ask_result_shape() {
        let result = GenerationResult::ask("Which sections should the page have?");
        assert_eq!(result.action, TurnAction::Ask);
        assert!(result.artifacts.is_empty());
        assert_eq!(result.token_count, 0);
        assert_eq!(result.questions, vec![result.content.clone()]);
    }

    #[test]
    fn generated_result_has_no_questions() {
        let result = GenerationResult::generated("no code here".into(), vec![], 3);
        assert_eq!(result.action, TurnAction::Generate);
        assert!(result.questions.is_empty());
        assert_eq!(result.token_count, 3);
    }

    #[test]
    fn turn_replays_as_matching_message() {
        assert_eq!(Turn::user("hi").to_message().role, MessageRole::User);
        assert_eq!(
            Turn::assistant("hello").to_message().role,
            MessageRole::Assistant
        );
    }

    #[test]
    fn action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TurnAction::Ask).unwrap(), "\"ask\"");
        let parsed: TurnAction = serde_json::from_str("\"generate\"").unwrap();
        assert_eq!(parsed, TurnAction::Generate);
    }
}
