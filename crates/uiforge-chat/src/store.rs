//! File-backed chat sessions.
//!
//! Each session is one `<id>.json` file under the store directory holding
//! the [`SessionRecord`] with all of its messages. Writes go through a
//! temp file and a rename so a crash never leaves a half-written session.
//!
//! The store also derives the two inputs a generator turn needs: the
//! history preceding the new user message ([`history_before`]) and the
//! number of clarifying questions already asked ([`ask_rounds`]).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uiforge::turn::{CodeArtifact, GenerationResult, Turn, TurnAction, TurnRole};
use uuid::Uuid;

/// Title given to sessions before their first user message.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Characters of the first user message used as the session title.
const TITLE_CHARS: usize = 60;

// ── Records ────────────────────────────────────────────────────────

/// A conversation and its messages, oldest first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

/// One persisted message.
///
/// User messages carry only content; assistant messages also carry the
/// action taken and its artifacts or question.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    #[serde(default)]
    pub artifacts: Vec<CodeArtifact>,
    /// `None` on user messages.
    #[serde(default)]
    pub action: Option<TurnAction>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub token_count: usize,
    pub created_at: DateTime<Utc>,
}

// ── SessionStore ───────────────────────────────────────────────────

/// Directory of session files.
///
/// ```text
/// sessions_dir/
///   0b6f...e1.json
///   9a42...7c.json
/// ```
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Open a store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, String> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create sessions dir {}: {e}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Create and persist an empty session titled [`DEFAULT_TITLE`].
    pub fn create_session(&self) -> Result<SessionRecord, String> {
        let now = Utc::now();
        let record = SessionRecord {
            id: Uuid::new_v4(),
            title: DEFAULT_TITLE.to_string(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };
        self.save(&record)?;
        debug!("Created session {}", record.id);
        Ok(record)
    }

    /// Atomic write: serialize to a temp file, then rename into place.
    pub fn save(&self, record: &SessionRecord) -> Result<(), String> {
        let final_path = self.session_path(record.id);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", record.id));

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| format!("Failed to serialize session: {e}"))?;
        std::fs::write(&tmp_path, json)
            .map_err(|e| format!("Failed to write temp session: {e}"))?;
        std::fs::rename(&tmp_path, &final_path)
            .map_err(|e| format!("Failed to rename session: {e}"))?;
        Ok(())
    }

    /// Load a session by id. Returns `None` if it doesn't exist.
    pub fn load(&self, id: &str) -> Result<Option<SessionRecord>, String> {
        let id = parse_id(id)?;
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let json =
            std::fs::read_to_string(&path).map_err(|e| format!("Failed to read session: {e}"))?;
        let record: SessionRecord =
            serde_json::from_str(&json).map_err(|e| format!("Failed to parse session: {e}"))?;
        Ok(Some(record))
    }

    /// All readable sessions, most recently updated first.
    pub fn list(&self) -> Result<Vec<SessionRecord>, String> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| format!("Failed to read sessions dir: {e}"))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read entry: {e}"))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str::<SessionRecord>(&json) {
                    Ok(r) => records.push(r),
                    Err(e) => warn!("Skipping malformed session at {}: {e}", path.display()),
                },
                Err(e) => warn!("Skipping unreadable session at {}: {e}", path.display()),
            }
        }
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// Delete a session. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, String> {
        let path = self.session_path(parse_id(id)?);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|e| format!("Failed to delete session: {e}"))?;
        Ok(true)
    }
}

// ── Record updates ─────────────────────────────────────────────────

impl SessionRecord {
    /// Append a user message and return its index.
    ///
    /// The first user message of an untitled session becomes its title.
    pub fn append_user(&mut self, content: &str) -> usize {
        let now = Utc::now();
        if self.title == DEFAULT_TITLE && !self.messages.iter().any(|m| m.role == TurnRole::User) {
            self.title = content.chars().take(TITLE_CHARS).collect();
        }
        self.messages.push(StoredMessage {
            id: Uuid::new_v4(),
            role: TurnRole::User,
            content: content.to_string(),
            artifacts: Vec::new(),
            action: None,
            questions: Vec::new(),
            token_count: 0,
            created_at: now,
        });
        self.updated_at = now;
        self.messages.len() - 1
    }

    /// Append the assistant message for a finished turn.
    pub fn append_assistant(&mut self, result: &GenerationResult) {
        let now = Utc::now();
        self.messages.push(StoredMessage {
            id: Uuid::new_v4(),
            role: TurnRole::Assistant,
            content: result.content.clone(),
            artifacts: result.artifacts.clone(),
            action: Some(result.action),
            questions: result.questions.clone(),
            token_count: result.token_count,
            created_at: now,
        });
        self.updated_at = now;
    }
}

// ── Generator inputs ───────────────────────────────────────────────

/// Turns preceding the message at `index`, oldest first.
pub fn history_before(record: &SessionRecord, index: usize) -> Vec<Turn> {
    record
        .messages
        .iter()
        .take(index)
        .map(|m| Turn {
            role: m.role,
            content: m.content.clone(),
        })
        .collect()
}

/// Number of assistant messages that asked a clarifying question.
pub fn ask_rounds(record: &SessionRecord) -> u32 {
    let asks = record
        .messages
        .iter()
        .filter(|m| m.role == TurnRole::Assistant && m.action == Some(TurnAction::Ask))
        .count();
    u32::try_from(asks).unwrap_or(u32::MAX)
}

fn parse_id(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id.trim()).map_err(|e| format!("Invalid session id '{id}': {e}"))
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sessions")).unwrap();
        (dir, store)
    }

    #[test]
    fn new_store_creates_directory() {
        let (_dir, store) = store();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn create_save_load_roundtrip() {
        let (_dir, store) = store();
        let mut record = store.create_session().unwrap();
        assert_eq!(record.title, DEFAULT_TITLE);

        record.append_user("a pricing card");
        record.append_assistant(&GenerationResult::ask("How many tiers?"));
        store.save(&record).unwrap();

        let loaded = store.load(&record.id.to_string()).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn missing_session_returns_none() {
        let (_dir, store) = store();
        let id = Uuid::new_v4().to_string();
        assert!(store.load(&id).unwrap().is_none());
        assert!(!store.delete(&id).unwrap());
    }

    #[test]
    fn malformed_id_is_an_error() {
        let (_dir, store) = store();
        assert!(store.load("../etc/passwd").is_err());
        assert!(store.delete("not-a-uuid").is_err());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let (_dir, store) = store();
        let record = store.create_session().unwrap();
        let tmp = store.dir().join(format!(".{}.json.tmp", record.id));
        assert!(!tmp.exists());
        assert!(store.session_path(record.id).exists());
    }

    #[test]
    fn list_orders_by_last_update_and_skips_garbage() {
        let (_dir, store) = store();
        let mut older = store.create_session().unwrap();
        let mut newer = store.create_session().unwrap();
        older.updated_at = Utc::now() - chrono::Duration::hours(2);
        newer.updated_at = Utc::now() - chrono::Duration::hours(1);
        store.save(&older).unwrap();
        store.save(&newer).unwrap();
        std::fs::write(store.dir().join("broken.json"), "{ nope").unwrap();
        std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        let ids: Vec<Uuid> = store.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn delete_removes_the_file() {
        let (_dir, store) = store();
        let record = store.create_session().unwrap();
        let id = record.id.to_string();
        assert!(store.delete(&id).unwrap());
        assert!(store.load(&id).unwrap().is_none());
    }

    #[test]
    fn first_user_message_titles_the_session() {
        let (_dir, store) = store();
        let mut record = store.create_session().unwrap();
        let long = "x".repeat(80);
        record.append_user(&long);
        assert_eq!(record.title.chars().count(), 60);

        record.append_user("second message");
        assert_eq!(record.title, "x".repeat(60));
    }

    #[test]
    fn history_and_ask_rounds_follow_stored_messages() {
        let (_dir, store) = store();
        let mut record = store.create_session().unwrap();

        let first = record.append_user("a dashboard");
        assert!(history_before(&record, first).is_empty());
        record.append_assistant(&GenerationResult::ask("What should it track?"));

        let second = record.append_user("sales");
        let history = history_before(&record, second);
        assert_eq!(
            history,
            vec![
                Turn::user("a dashboard"),
                Turn::assistant("What should it track?")
            ]
        );
        assert_eq!(ask_rounds(&record), 1);

        record.append_assistant(&GenerationResult::generated(
            "```tsx\nx\n```".into(),
            Vec::new(),
            3,
        ));
        assert_eq!(ask_rounds(&record), 1);
        assert_eq!(record.messages[3].action, Some(TurnAction::Generate));
        assert!(record.messages[0].action.is_none());
    }
}
