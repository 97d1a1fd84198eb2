//! Command handlers, one module per command family.

pub mod config_cmd;
pub mod demo;
pub mod mappings;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a network-facing command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    tracing::debug!(profile = ?global.profile, "dispatching command");
    match cmd {
        Command::Demo(args) => demo::handle(args, global).await,
        Command::Token => mappings::token(global).await,
        Command::Add(args) => mappings::add(args, global).await,
        Command::Delete(args) => mappings::delete(args, global).await,
        Command::DeleteByAgent(args) => mappings::delete_by_agent(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
