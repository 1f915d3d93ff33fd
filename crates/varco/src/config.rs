//! Profile loading for the varco CLI.
//!
//! TOML profiles merged via figment; CLI flags and VARCO_* environment
//! variables (wired through clap) win over the file. Secrets may live
//! in the config file, the environment, or an interactive prompt.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;

use varco_core::{CoverConfig, Credentials};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// A named device profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    /// Device name as registered on the cloud account.
    pub device: Option<String>,

    /// Display name (defaults to the device name).
    pub name: Option<String>,

    /// Account username.
    pub username: Option<String>,

    /// Account password (plaintext -- prefer the env var or the prompt).
    pub password: Option<String>,

    /// Pre-issued access token.
    pub access_token: Option<String>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Attempts per retried request.
    pub retry_count: Option<u32>,

    /// Skip the immediate refresh after initialization.
    #[serde(default)]
    pub skip_initial_refresh: bool,
}

/// Path of the config file (`~/.config/varco/config.toml` on Linux).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "varco")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("varco.toml"))
}

/// Load the config file, tolerating its absence.
pub fn load_config() -> Result<Config, CliError> {
    let path = std::env::var_os("VARCO_CONFIG")
        .map_or_else(config_path, PathBuf::from);

    let figment = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("VARCO_CONFIG_"));

    Ok(figment.extract()?)
}

// ── Resolution ──────────────────────────────────────────────────────

/// Build a [`CoverConfig`] from the config file, the selected profile,
/// and CLI overrides.
pub fn resolve(global: &GlobalOpts) -> Result<CoverConfig, CliError> {
    let config = load_config()?;

    let profile_name = global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone());
    let profile = profile_name
        .as_deref()
        .and_then(|name| config.profiles.get(name))
        .cloned()
        .unwrap_or_default();

    let device = global
        .device
        .clone()
        .or_else(|| profile.device.clone())
        .ok_or_else(|| CliError::NoDevice {
            path: config_path().display().to_string(),
        })?;

    let name = global
        .name
        .clone()
        .or_else(|| profile.name.clone())
        .unwrap_or_else(|| device.clone());

    let credentials = resolve_credentials(global, &profile)?;

    let mut cover = CoverConfig::new(name, device, credentials);
    if let Some(secs) = global.timeout.or(profile.timeout) {
        cover.timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = global.retries.or(profile.retry_count) {
        cover.retry_count = retries;
    }
    cover.skip_initial_refresh = profile.skip_initial_refresh;

    Ok(cover)
}

/// Resolve credentials: an access token wins over username/password;
/// a missing password is prompted for interactively.
fn resolve_credentials(global: &GlobalOpts, profile: &Profile) -> Result<Credentials, CliError> {
    if let Some(token) = global
        .access_token
        .clone()
        .or_else(|| profile.access_token.clone())
    {
        return Ok(Credentials::Token(SecretString::from(token)));
    }

    let Some(username) = global.username.clone().or_else(|| profile.username.clone()) else {
        return Err(CliError::NoCredentials);
    };

    let password = match global.password.clone().or_else(|| profile.password.clone()) {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Password for {username}: "))?,
    };

    Ok(Credentials::Password {
        username,
        password: SecretString::from(password),
    })
}
