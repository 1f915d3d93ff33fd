// varco-core: Gate state machine and device controller between varco-api
// and consumers (CLI, host runtimes).

pub mod availability;
pub mod classify;
pub mod config;
pub mod controller;
pub mod error;

// ── Primary re-exports ──────────────────────────────────────────────
pub use availability::{AvailabilityTracker, MAX_CONSECUTIVE_FAILURES};
pub use classify::{GateState, classify};
pub use config::CoverConfig;
pub use controller::{CoverController, MIN_REFRESH_INTERVAL, Phase};
pub use error::CoreError;

// Re-export the api types consumers need to build a config.
pub use varco_api::{Credentials, TelemetrySnapshot};
