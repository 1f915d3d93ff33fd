//! Gate control handlers: status, open/close/stop, and watch.

use std::time::Duration;

use owo_colors::OwoColorize;

use varco_core::{CoverController, GateState};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;

/// A motion command from the CLI.
#[derive(Debug, Clone, Copy)]
pub enum GateCommand {
    Open,
    Close,
    Stop,
}

impl GateCommand {
    fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Stop => "stop",
        }
    }
}

/// Resolve configuration and bring a controller into steady state.
async fn connect(global: &GlobalOpts) -> Result<CoverController, CliError> {
    let cover = config::resolve(global)?;
    let controller = CoverController::new(cover).map_err(CliError::InitFailed)?;
    controller.initialize().await.map_err(CliError::InitFailed)?;
    Ok(controller)
}

pub async fn status(global: &GlobalOpts) -> Result<(), CliError> {
    let controller = connect(global).await?;
    print_status(&controller, &global.output);
    controller.dispose().await;
    Ok(())
}

pub async fn gate_command(global: &GlobalOpts, command: GateCommand) -> Result<(), CliError> {
    let controller = connect(global).await?;

    let ok = match command {
        GateCommand::Open => controller.open().await,
        GateCommand::Close => controller.close().await,
        GateCommand::Stop => controller.stop().await,
    };

    controller.dispose().await;

    if ok {
        println!("{} {}", command.as_str(), "done".green());
        Ok(())
    } else {
        Err(CliError::CommandFailed {
            action: command.as_str(),
        })
    }
}

pub async fn watch(global: &GlobalOpts, args: &WatchArgs) -> Result<(), CliError> {
    let controller = connect(global).await?;

    let mut last = controller.state();
    print_status(&controller, &global.output);

    let mut interval = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = interval.tick() => {
                controller.refresh().await;
                let state = controller.state();
                if state != last {
                    print_transition(&controller, last, state);
                    last = state;
                }
            }
        }
    }

    controller.dispose().await;
    Ok(())
}

// ── Rendering ───────────────────────────────────────────────────────

fn print_status(controller: &CoverController, output: &OutputFormat) {
    match output {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "name": controller.name(),
                "state": controller.state().to_string(),
                "available": controller.is_available(),
                "device_id": controller.device_id(),
                "consecutive_failures": controller.consecutive_failures(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report).unwrap_or_default()
            );
        }
        OutputFormat::Plain => {
            let availability = if controller.is_available() {
                "available".green().to_string()
            } else {
                "unavailable".red().to_string()
            };
            println!(
                "{}: {} ({availability})",
                controller.name(),
                paint_state(controller.state()),
            );
        }
    }
}

fn print_transition(controller: &CoverController, from: GateState, to: GateState) {
    println!(
        "{}: {} -> {}",
        controller.name(),
        paint_state(from),
        paint_state(to),
    );
}

fn paint_state(state: GateState) -> String {
    match state {
        GateState::Open => state.green().to_string(),
        GateState::Closed => state.blue().to_string(),
        GateState::Moving => state.yellow().to_string(),
        GateState::Stopped => state.magenta().to_string(),
        GateState::Unknown => state.red().to_string(),
    }
}
