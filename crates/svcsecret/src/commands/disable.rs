//! `disable` handler.

use svcsecret_core::Mode;

use crate::cli::{DisableArgs, GlobalOpts};
use crate::commands::change;
use crate::config;
use crate::error::CliError;

pub async fn handle(args: DisableArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let defaults = config::form_defaults(global)?;
    let form = change::base_form(Mode::Disable, &args.target, &defaults);
    change::run(&form, args.target.dry_run, &defaults.procedure, global).await
}
