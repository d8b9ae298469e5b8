//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod fleet;
pub mod firmware;
pub mod intent;
pub mod log;
pub mod strips;
pub mod util;

use blinky_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a fleet-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Strips(args) => strips::handle(controller, args, global).await,
        Command::Fleet(args) => fleet::handle(controller, args, global).await,
        Command::Firmware(args) => firmware::handle(controller, args, global).await,
        Command::Log(args) => log::handle(controller, args, global).await,
        Command::Describe { device } => intent::describe(controller, device, global).await,
        Command::Intent(args) => intent::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
