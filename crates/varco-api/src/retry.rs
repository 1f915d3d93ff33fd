// Retry policy for cloud requests.
//
// One policy object applied uniformly: each call site supplies a
// classification function mapping an error to a retry decision, instead
// of duplicating per-branch continue/return logic in every request loop.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, FailureClass};

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    /// The error is terminal; surface it immediately.
    Fatal,
    /// Retry without waiting.
    Immediate,
    /// Retry after the policy's fixed delay. Used for connection and
    /// TLS drops, which need a moment for the upstream to reset.
    Delayed,
}

/// Bounded retry with a fixed inter-attempt delay for connection-class
/// failures.
///
/// On exhaustion the last error is returned, except that an exhausted
/// run of timeouts collapses into [`Error::Timeout`] so callers see one
/// terminal timeout rather than the final per-request failure.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

/// Default attempt count. Three, because single-attempt calls against
/// this upstream fail often enough to flap availability.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const RETRY_DELAY: Duration = Duration::from_secs(1);

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt bound and the default delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: RETRY_DELAY,
        }
    }

    /// Run `op` until it succeeds, `classify` declares an error fatal,
    /// or `max_attempts` is reached.
    pub async fn run<T, Fut>(
        &self,
        label: &str,
        classify: impl Fn(&Error) -> Retry,
        mut op: impl FnMut() -> Fut,
    ) -> Result<T, Error>
    where
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let decision = classify(&err);
            if decision == Retry::Fatal {
                return Err(err);
            }
            if attempt >= self.max_attempts {
                if err.failure_class() == FailureClass::Timeout {
                    return Err(Error::Timeout {
                        attempts: self.max_attempts,
                    });
                }
                return Err(err);
            }

            warn!(
                error = %err,
                attempt,
                max_attempts = self.max_attempts,
                "{label} failed, retrying"
            );
            if decision == Retry::Delayed {
                tokio::time::sleep(self.delay).await;
            }
        }
    }
}

// ── Per-call classifications ─────────────────────────────────────────

/// Token acquisition and account listing: retry anything transient,
/// including HTTP errors; a malformed payload or unusable token
/// response fails fast.
pub fn lookup_classification(err: &Error) -> Retry {
    match err.failure_class() {
        FailureClass::Malformed | FailureClass::Auth => Retry::Fatal,
        FailureClass::Connection => Retry::Delayed,
        _ => Retry::Immediate,
    }
}

/// Diagnosis polls: server errors are treated as transient alongside
/// timeouts and connection drops; 4xx and malformed payloads are
/// terminal.
pub fn diagnosis_classification(err: &Error) -> Retry {
    match err.failure_class() {
        FailureClass::Timeout | FailureClass::ServerError | FailureClass::Other => Retry::Immediate,
        FailureClass::Connection => Retry::Delayed,
        FailureClass::ClientError | FailureClass::Malformed | FailureClass::Auth => Retry::Fatal,
    }
}

/// Action commands (open/close/stop): any HTTP error status means the
/// command reached the cloud and was rejected -- never retried, so a
/// gate is not driven twice. Only transport-level failures retry.
pub fn command_classification(err: &Error) -> Retry {
    match err.failure_class() {
        FailureClass::Timeout | FailureClass::Other => Retry::Immediate,
        FailureClass::Connection => Retry::Delayed,
        FailureClass::ServerError
        | FailureClass::ClientError
        | FailureClass::Malformed
        | FailureClass::Auth => Retry::Fatal,
    }
}
