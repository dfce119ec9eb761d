//! `whoami` handler.

use svcsecret_core::Session;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(config::resolve(global)?)?;
    let identity = session.identity().await?;

    let out = output::render_single(
        &global.output,
        &identity,
        |id| {
            format!(
                "User: {}\nRole: {}",
                id.user,
                id.role.as_deref().unwrap_or("(none)")
            )
        },
        |id| id.user.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
