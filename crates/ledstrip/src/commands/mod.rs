//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod convert;
pub mod effects;
pub mod simulate;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Effects => effects::handle(global),
        Command::Convert(args) => convert::handle(args, global),
        Command::Simulate(args) => simulate::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}
