use thiserror::Error;

/// Top-level error type for the `varco-api` crate.
///
/// Covers every failure mode across the u-Control cloud surfaces:
/// token auth, account/device listing, and command dispatch.
/// `varco-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange failed in a non-retryable way (e.g. the response
    /// parsed but carried no `access_token` field).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS
    /// handshake drop, per-request timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Every attempt of a retried request timed out.
    #[error("Request timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response from the cloud, with a body excerpt.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Coarse failure classification driving the retry policy.
///
/// The upstream is known to drop TLS connections under load, so
/// connection-class failures are retried with a short delay while
/// client-side errors (bad auth, bad request) are always terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Per-request timeout.
    Timeout,
    /// Connection-level failure: refused, reset, DNS, TLS handshake.
    Connection,
    /// HTTP 5xx.
    ServerError,
    /// HTTP 4xx.
    ClientError,
    /// Unparseable payload or URL.
    Malformed,
    /// Unusable token response.
    Auth,
    /// Any other request failure.
    Other,
}

impl Error {
    /// Classify this error for retry decisions.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Transport(e) if e.is_timeout() => FailureClass::Timeout,
            Self::Transport(e) if e.is_connect() => FailureClass::Connection,
            Self::Transport(_) => FailureClass::Other,
            Self::Timeout { .. } => FailureClass::Timeout,
            Self::Tls(_) => FailureClass::Connection,
            Self::Api { status, .. } if *status >= 500 => FailureClass::ServerError,
            Self::Api { .. } => FailureClass::ClientError,
            Self::Authentication { .. } => FailureClass::Auth,
            Self::Deserialization { .. } | Self::InvalidUrl(_) => FailureClass::Malformed,
        }
    }

    /// Returns `true` if this is a transient error worth retrying
    /// in at least one call context.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.failure_class(),
            FailureClass::Timeout
                | FailureClass::Connection
                | FailureClass::ServerError
                | FailureClass::Other
        )
    }
}
