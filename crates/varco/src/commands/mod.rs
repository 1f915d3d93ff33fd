pub mod auth_test;
pub mod control;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::AuthTest => auth_test::handle(global).await,
        Command::Status => control::status(global).await,
        Command::Open => control::gate_command(global, control::GateCommand::Open).await,
        Command::Close => control::gate_command(global, control::GateCommand::Close).await,
        Command::Stop => control::gate_command(global, control::GateCommand::Stop).await,
        Command::Watch(args) => control::watch(global, &args).await,
    }
}
