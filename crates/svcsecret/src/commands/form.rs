//! Interactive guided form.
//!
//! Step 1 picks the action, Step 2 (update only) the secret type, Step 3
//! collects the fields the selection needs. Values survive a failed
//! validation so the operator only fixes what is missing.

use std::io::{self, IsTerminal};

use dialoguer::{Confirm, Editor, Input, Select};
use secrecy::{ExposeSecret, SecretString};
use strum::IntoEnumIterator;

use svcsecret_core::{Action, ChangeForm, Mode, ProcedureOutcome, RsaKeySlot, SecretType, Session};

use crate::cli::GlobalOpts;
use crate::commands::{change, util::prompt_err};
use crate::config;
use crate::error::CliError;
use crate::output;

const TITLE: &str = "Service Account Secret Management";
const DESCRIPTION: &str = "Update or disable service account secrets by calling the \
    CHANGE_SERVICE_ACCOUNT_SECRET_PROC stored procedure.";

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
        return Err(CliError::NotInteractive);
    }
    let color = output::should_color(&global.color);

    let defaults = config::form_defaults(global)?;
    let session = Session::open(config::resolve(global)?)?;

    eprintln!("{TITLE}");
    eprintln!("{}\n", output::dim(DESCRIPTION, color));
    show_identity(&session, color).await;

    let mut form = ChangeForm::default().with_owner_role(defaults.owner_role);

    loop {
        fill(&mut form)?;

        let request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                for message in errors.messages() {
                    eprintln!("{}", output::warning(message, color));
                }
                if ask("Edit and try again?", true)? {
                    continue;
                }
                break;
            }
        };

        if ask("Execute Change?", true)? {
            let line = match change::execute(&session, &request, global.quiet).await {
                Ok(ProcedureOutcome::Success(message)) => {
                    output::success(&format!("Result: {message}"), color)
                }
                Ok(ProcedureOutcome::Failure(message)) => {
                    output::failure(&format!("Result: {message}"), color)
                }
                Err(err) => output::failure(&err.to_string(), color),
            };
            output::print_output(&line, false);
        }

        if !ask("Make another change?", false)? {
            break;
        }
    }

    Ok(())
}

/// Identity banner. A failed lookup only warns.
async fn show_identity(session: &Session, color: bool) {
    match session.identity().await {
        Ok(identity) => eprintln!(
            "Running as User: {} | With Role: {}\n",
            identity.user,
            identity.role.as_deref().unwrap_or("(none)")
        ),
        Err(err) => {
            tracing::debug!(error = ?err, "identity lookup failed");
            eprintln!(
                "{}\n",
                output::warning(&format!("Could not retrieve current user and role: {err}"), color)
            );
        }
    }
}

fn fill(form: &mut ChangeForm) -> Result<(), CliError> {
    // ── Step 1 ──
    eprintln!("Step 1: Choose an Action");
    let action = pick("Action", &Action::iter().collect::<Vec<_>>(), form.mode.action())?;

    // ── Step 2 ──
    let secret_type = if action == Action::Update {
        eprintln!("\nStep 2: Choose Secret Type");
        let current = form.mode.secret_type().unwrap_or_default();
        Some(pick(
            "Secret Type",
            &SecretType::iter().collect::<Vec<_>>(),
            current,
        )?)
    } else {
        None
    };
    form.mode = Mode::from_selection(action, secret_type);

    // ── Step 3 ──
    eprintln!("\nStep 3: Provide Details & Execute");
    form.account_name = text("Service Account Name", &form.account_name)?;
    form.owner_role = text("Service Account Owner Role", &form.owner_role)?;

    match form.mode {
        Mode::Disable => {}
        Mode::Update(SecretType::Password) => {
            let prompt = if form.password.expose_secret().is_empty() {
                "New Password: "
            } else {
                "New Password (Enter keeps the current value): "
            };
            let password = rpassword::prompt_password(prompt).map_err(prompt_err)?;
            if !password.is_empty() {
                form.password = SecretString::from(password);
            }
        }
        Mode::Update(SecretType::Keypair) => {
            eprintln!("  1 = RSA_PUBLIC_KEY, 2 = RSA_PUBLIC_KEY_2");
            form.rsa_key_slot = pick(
                "RSA Key Number",
                &RsaKeySlot::iter().collect::<Vec<_>>(),
                form.rsa_key_slot,
            )?;
            if let Some(key) = edit("RSA Public Key", &form.public_key)? {
                form.public_key = key;
            }
            eprintln!("  The private key is stored for auditing, not applied to the user.");
            if let Some(key) = edit(
                "RSA Private Key (for history record)",
                form.private_key.expose_secret(),
            )? {
                form.private_key = SecretString::from(key);
            }
        }
    }

    Ok(())
}

// ── Prompt helpers ──────────────────────────────────────────────────

fn pick<T>(prompt: &str, items: &[T], current: T) -> Result<T, CliError>
where
    T: Copy + PartialEq + ToString,
{
    let default = items.iter().position(|i| *i == current).unwrap_or(0);
    let idx = Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()
        .map_err(prompt_err)?;
    Ok(items.get(idx).copied().unwrap_or(current))
}

fn text(prompt: &str, current: &str) -> Result<String, CliError> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)
}

/// Multi-line value via `$EDITOR`. `None` when the editor was closed
/// without saving.
fn edit(label: &str, current: &str) -> Result<Option<String>, CliError> {
    eprintln!("{label}: opening editor...");
    let edited = Editor::new()
        .extension(".pem")
        .require_save(true)
        .edit(current)
        .map_err(prompt_err)?;
    Ok(edited.map(|s| s.trim_end_matches(['\r', '\n']).to_owned()))
}

fn ask(prompt: &str, default: bool) -> Result<bool, CliError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(prompt_err)
}
