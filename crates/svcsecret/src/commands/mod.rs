//! Command handlers, one module per top-level subcommand.

pub mod change;
pub mod config_cmd;
pub mod disable;
pub mod form;
pub mod update;
pub mod util;
pub mod whoami;

use clap::CommandFactory;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Form => form::handle(global).await,
        Command::Update(args) => update::handle(args, global).await,
        Command::Disable(args) => disable::handle(args, global).await,
        Command::Whoami => whoami::handle(global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "svcsecret", &mut std::io::stdout());
            Ok(())
        }
    }
}
