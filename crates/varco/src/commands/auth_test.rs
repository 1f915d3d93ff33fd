//! Step-by-step connectivity check against the cloud.
//!
//! Runs the same three phases the controller runs at startup -- token
//! exchange, device discovery, one diagnosis -- but reports each phase
//! individually so a misconfigured account is easy to pin down.

use owo_colors::OwoColorize;
use tracing::warn;

use varco_api::{AccessToken, CloudClient, Credentials, RetryPolicy, TransportConfig};
use varco_core::{CoreError, classify};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cover = config::resolve(global)?;
    let client = CloudClient::new(
        &TransportConfig::new(cover.timeout),
        RetryPolicy::new(cover.retry_count),
    )?;

    // ── 1. Authentication ────────────────────────────────────────────
    println!("{}", "1. Authentication".bold());
    let (token, obtained) = match &cover.credentials {
        Credentials::Token(secret) => {
            println!("   using configured access token");
            (AccessToken::from(secret.clone()), false)
        }
        Credentials::Password { username, password } => {
            println!("   requesting token for {username}");
            let token = client.acquire_token(username, password).await?;
            match token.expires_in() {
                Some(secs) => println!("   {} token obtained (expires in {secs}s)", "ok".green()),
                None => println!("   {} token obtained", "ok".green()),
            }
            (token, true)
        }
    };

    // ── 2. Device discovery ──────────────────────────────────────────
    println!("{}", "2. Device discovery".bold());
    let automations = client.list_automations(&token).await?;
    println!("   found {} automation(s)", automations.len());

    let mut device_id = None;
    for automation in &automations {
        let name = automation.info.name.as_deref().unwrap_or("<unnamed>");
        if name == cover.device {
            device_id = Some(automation.uuid.clone());
            println!("   {name} ({})  {}", automation.uuid, "<- target".green());
        } else {
            println!("   {name} ({})", automation.uuid);
        }
    }

    let Some(device_id) = device_id else {
        release_token(&client, &token, &cover.credentials, obtained).await;
        return Err(CliError::InitFailed(CoreError::DeviceNotFound {
            name: cover.device,
        }));
    };

    // ── 3. Telemetry ─────────────────────────────────────────────────
    println!("{}", "3. Telemetry".bold());
    match client.diagnosis(&token, &device_id).await? {
        Some(snapshot) => {
            println!(
                "   engine 1: position {}%, velocity {}",
                snapshot.first_engine_pos, snapshot.first_engine_vel
            );
            println!(
                "   engine 2: position {}%, velocity {}",
                snapshot.second_engine_pos, snapshot.second_engine_vel
            );
            println!("   gate state: {}", classify(&snapshot).bold());
        }
        None => println!(
            "   {} no telemetry (cloud unreachable or persistent upstream errors)",
            "warn".yellow()
        ),
    }

    release_token(&client, &token, &cover.credentials, obtained).await;
    Ok(())
}

/// Revoke a token we acquired just for this test run.
async fn release_token(
    client: &CloudClient,
    token: &AccessToken,
    credentials: &Credentials,
    obtained: bool,
) {
    if !obtained {
        return;
    }
    let Credentials::Password { username, password } = credentials else {
        return;
    };
    if let Err(err) = client.revoke_token(token, username, password).await {
        warn!(error = %err, "unable to remove test token");
    }
}
