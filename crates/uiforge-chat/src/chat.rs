//! One user turn against a stored session.
//!
//! Ordering matters here: the message is validated before any session file
//! is created, the user message is saved before the generation call, and
//! the assistant message is saved only when generation succeeds.

use tracing::{info, warn};
use uiforge::Generator;
use uiforge::turn::GenerationResult;

use crate::store::{SessionRecord, SessionStore, ask_rounds, history_before};
use crate::validate::validate_message;

/// Shown when a generation call fails; details go to the log.
pub const GENERATION_FAILED: &str = "Could not generate a response, try again.";

/// Why a turn did not produce a stored assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// Reading or writing the session failed.
    Storage(String),
    /// The completion service failed. The user message is already stored.
    Generation(String),
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnError::Storage(e) => write!(f, "{e}"),
            TurnError::Generation(_) => write!(f, "{GENERATION_FAILED}"),
        }
    }
}

/// Validate `raw`, then load session `id` or create a new one.
///
/// Nothing is written when validation fails.
pub fn begin_turn<'m>(
    store: &SessionStore,
    id: Option<&str>,
    raw: &'m str,
) -> Result<(SessionRecord, &'m str), String> {
    let content = validate_message(raw)?;
    let record = open_session(store, id)?;
    Ok((record, content))
}

/// Load session `id`, or create a new one when `id` is `None`.
pub fn open_session(store: &SessionStore, id: Option<&str>) -> Result<SessionRecord, String> {
    match id {
        Some(id) => store
            .load(id)?
            .ok_or_else(|| format!("Session {id} not found")),
        None => store.create_session(),
    }
}

/// Run one validated user message through `generator`, persisting both
/// sides of the exchange.
pub async fn run_turn(
    store: &SessionStore,
    record: &mut SessionRecord,
    generator: &Generator<'_>,
    content: &str,
) -> Result<GenerationResult, TurnError> {
    let index = record.append_user(content);
    store.save(record).map_err(TurnError::Storage)?;

    let history = history_before(record, index);
    let rounds = ask_rounds(record);

    let result = match generator.run(content, &history, rounds).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Generation failed in session {}: {e}", record.id);
            return Err(TurnError::Generation(e));
        }
    };

    record.append_assistant(&result);
    store.save(record).map_err(TurnError::Storage)?;
    info!(
        "Session {}: {} turn, {} message(s) stored",
        record.id,
        result.action,
        record.messages.len()
    );
    Ok(result)
}
