//! Talking to OpenRouter.
//!
//! - [`wire`]: request and reply payloads, and reply decoding.
//! - [`client`]: the HTTP client.
//! - [`retry`]: which failures are retried and how long to wait. Retries
//!   live here, below the decision logic: the classifier and generator each
//!   make exactly one logical call per turn.

pub mod client;
pub mod retry;
pub mod wire;

pub use retry::{FailureKind, RetryConfig, is_permanent_error, is_transient_error};
