// ── Core error types ──
//
// User-facing errors from varco-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly; the
// `From<varco_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Device '{name}' not found on the account")]
    DeviceNotFound { name: String },

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {message}")]
    Api { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<varco_api::Error> for CoreError {
    fn from(err: varco_api::Error) -> Self {
        match err {
            varco_api::Error::Authentication { message } => Self::AuthenticationFailed { message },
            varco_api::Error::Timeout { .. } => Self::Timeout,
            varco_api::Error::Transport(ref e) if e.is_timeout() => Self::Timeout,
            other => Self::Api {
                message: other.to_string(),
            },
        }
    }
}
