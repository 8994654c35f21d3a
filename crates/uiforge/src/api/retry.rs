//! Backoff for the OpenRouter transport.
//!
//! Only failures that can succeed on a second try are repeated: rate limits,
//! gateway and server errors, dropped connections, timeouts. Rejections of
//! the request itself (bad schema, bad key, unknown model) surface at once.

use std::time::Duration;

/// Per-attempt scale applied when `jitter` is on, cycled by attempt number.
const JITTER_FACTORS: [f64; 4] = [0.75, 0.9, 0.6, 0.85];

/// How a transport error should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth another attempt after a delay.
    Transient,
    /// The request was rejected; repeating it changes nothing.
    Rejected,
    /// Neither pattern matched (decode errors, empty bodies).
    Other,
}

impl FailureKind {
    /// Classify an error string produced by the client.
    ///
    /// Rejection wins over transience so that, for example, an HTTP 400 whose
    /// body mentions a timeout is never retried.
    pub fn of(error: &str) -> Self {
        if REJECTED_STATUSES
            .iter()
            .any(|code| error.contains(&format!("HTTP {code}")))
        {
            return FailureKind::Rejected;
        }
        if TRANSIENT_STATUSES
            .iter()
            .any(|code| error.contains(&format!("HTTP {code}")))
        {
            return FailureKind::Transient;
        }
        let lower = error.to_lowercase();
        if TRANSIENT_MARKERS.iter().any(|m| lower.contains(m)) {
            FailureKind::Transient
        } else {
            FailureKind::Other
        }
    }
}

/// Whether `error` is worth another attempt.
pub fn is_transient_error(error: &str) -> bool {
    FailureKind::of(error) == FailureKind::Transient
}

/// Whether `error` is a rejection of the request that a retry cannot fix.
pub fn is_permanent_error(error: &str) -> bool {
    FailureKind::of(error) == FailureKind::Rejected
}

const TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];
const REJECTED_STATUSES: [u16; 5] = [400, 401, 403, 404, 422];
const TRANSIENT_MARKERS: [&str; 6] = [
    "request failed:",
    "connection reset",
    "connection refused",
    "timed out",
    "timeout",
    "broken pipe",
];

/// Backoff policy for completion calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first. `0` disables retry.
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// No single wait exceeds this.
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default backoff with `retries` extra attempts.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// Wait before retry `attempt`, counting from zero.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = (self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent))
            .min(self.max_delay.as_secs_f64());
        let scale = if self.jitter {
            JITTER_FACTORS[attempt as usize % JITTER_FACTORS.len()]
        } else {
            1.0
        };
        Duration::from_secs_f64(secs * scale)
    }

    /// Whether a failure on attempt `attempt` (zero-based) gets another try.
    pub fn should_retry(&self, attempt: u32, error: &str) -> bool {
        attempt < self.max_retries && is_transient_error(error)
    }
}
