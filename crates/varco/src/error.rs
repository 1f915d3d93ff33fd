//! CLI error types with miette diagnostics.
//!
//! Maps core and api errors into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use varco_api::FailureClass;
use varco_core::CoreError;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const COMMAND: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("No device configured")]
    #[diagnostic(
        code(varco::no_device),
        help(
            "Pass --device (-d), set VARCO_DEVICE, or add a profile to {path}.\n\
             The device name must match the automation name on the cloud account exactly."
        )
    )]
    NoDevice { path: String },

    #[error("No credentials configured")]
    #[diagnostic(
        code(varco::no_credentials),
        help(
            "Pass --username (the password is prompted), or --access-token.\n\
             Both can also live in the profile or VARCO_* environment variables."
        )
    )]
    NoCredentials,

    #[error("Configuration loading failed")]
    #[diagnostic(code(varco::config))]
    Config(#[source] Box<figment::Error>),

    // ── Device lifecycle ─────────────────────────────────────────────
    #[error("Initialization failed")]
    #[diagnostic(
        code(varco::init_failed),
        help("Check credentials and the device name; run `varco auth-test` for a step-by-step check.")
    )]
    InitFailed(#[source] CoreError),

    #[error("'{action}' command failed")]
    #[diagnostic(
        code(varco::command_failed),
        help("The cloud did not acknowledge the command. Run `varco status -v` to inspect the device.")
    )]
    CommandFailed { action: &'static str },

    // ── Passthrough ──────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(varco::api))]
    Api(#[from] varco_api::Error),

    #[error(transparent)]
    #[diagnostic(code(varco::io))]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoDevice { .. } | Self::NoCredentials | Self::Config(_) => exit_code::USAGE,
            Self::InitFailed(CoreError::AuthenticationFailed { .. }) => exit_code::AUTH,
            Self::InitFailed(CoreError::DeviceNotFound { .. }) => exit_code::NOT_FOUND,
            Self::InitFailed(CoreError::Timeout) => exit_code::TIMEOUT,
            Self::InitFailed(_) => exit_code::CONNECTION,
            Self::CommandFailed { .. } => exit_code::COMMAND,
            Self::Api(err) => match err.failure_class() {
                FailureClass::Auth | FailureClass::ClientError => exit_code::AUTH,
                FailureClass::Timeout => exit_code::TIMEOUT,
                FailureClass::Connection | FailureClass::ServerError => exit_code::CONNECTION,
                _ => exit_code::GENERAL,
            },
            Self::Io(_) => exit_code::GENERAL,
        }
    }
}
