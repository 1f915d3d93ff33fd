// ── Per-device configuration ──
//
// Describes one cover device: identity, credentials, and network
// tuning. The CLI (or any other host) constructs a `CoverConfig` and
// hands it in; core never reads config files.

use std::time::Duration;

use varco_api::Credentials;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request attempt count. Three, because the upstream drops TLS
/// connections often enough that single attempts flap availability.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Configuration for a single cover device.
#[derive(Debug, Clone)]
pub struct CoverConfig {
    /// Display name of the cover.
    pub name: String,
    /// Device name as registered on the cloud account; resolved to an
    /// automation UUID at initialization.
    pub device: String,
    /// Username/password or a pre-issued access token.
    pub credentials: Credentials,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Attempts per retried request.
    pub retry_count: u32,
    /// Skip the immediate refresh after initialization.
    pub skip_initial_refresh: bool,
}

impl CoverConfig {
    /// Create a config with default tuning.
    pub fn new(
        name: impl Into<String>,
        device: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            name: name.into(),
            device: device.into(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            skip_initial_refresh: false,
        }
    }
}
