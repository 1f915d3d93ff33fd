//! Clap derive structures for the `varco` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// varco -- control BFT u-Control cloud gates from the command line
#[derive(Debug, Parser)]
#[command(
    name = "varco",
    version,
    about = "Control a u-Control cloud gate from the command line",
    long_about = "Open, close, stop, and watch a BFT u-Control gate device.\n\n\
        Credentials and the device name come from a TOML profile,\n\
        VARCO_* environment variables, or the flags below.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile from the config file
    #[arg(long, short = 'p', env = "VARCO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device name as registered on the cloud account
    #[arg(long, short = 'd', env = "VARCO_DEVICE", global = true)]
    pub device: Option<String>,

    /// Display name for the cover (defaults to the device name)
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Account username
    #[arg(long, short = 'u', env = "VARCO_USERNAME", global = true)]
    pub username: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(long, env = "VARCO_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Pre-issued access token (skips the password grant)
    #[arg(long, env = "VARCO_ACCESS_TOKEN", global = true, hide_env = true)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "VARCO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Attempts per retried request
    #[arg(long, env = "VARCO_RETRIES", global = true)]
    pub retries: Option<u32>,

    /// Output format
    #[arg(long, short = 'o', default_value = "plain", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one value per line
    Plain,
    /// Pretty-printed JSON
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Step-by-step connectivity check: token, discovery, telemetry
    #[command(name = "auth-test")]
    AuthTest,

    /// Show the current gate state
    #[command(alias = "st")]
    Status,

    /// Open the gate
    Open,

    /// Close the gate
    Close,

    /// Stop the gate where it is
    Stop,

    /// Poll the gate and print state transitions
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls
    #[arg(long, short = 'i', default_value = "5")]
    pub interval: u64,
}
