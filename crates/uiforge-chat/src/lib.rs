//! Terminal chat front end for uiforge.
//!
//! `uiforge-chat` keeps conversations on disk and feeds them through
//! [`uiforge::Generator`] one turn at a time. The library half holds the
//! pieces the binary is built from:
//!
//! - [`chat`]: one user turn, from validation to the stored reply.
//! - [`store`]: one JSON file per session, written atomically, plus the
//!   history and ask-round derivations the generator needs.
//! - [`validate`]: user message checks applied before anything is stored.
//! - [`emit`]: writes generated artifacts into an output directory.
//!
//! # Binary
//!
//! ```sh
//! # Interactive session
//! uiforge-chat chat --emit ./out
//!
//! # One turn in an existing session
//! uiforge-chat send --session 6f1c... "make the header sticky"
//!
//! # Housekeeping
//! uiforge-chat sessions
//! uiforge-chat show 6f1c...
//! uiforge-chat delete 6f1c...
//! ```

pub mod chat;
pub mod emit;
pub mod store;
pub mod validate;

pub use chat::{GENERATION_FAILED, TurnError, begin_turn, open_session, run_turn};
pub use emit::emit_artifacts;
pub use store::{SessionRecord, SessionStore, StoredMessage};
pub use validate::validate_message;
