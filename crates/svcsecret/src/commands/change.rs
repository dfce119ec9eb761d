//! Shared submit path for `update` and `disable`.
//!
//! Validate, preview (`--dry-run`), confirm, call the procedure once, then
//! report the outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use svcsecret_core::{
    Action, ChangeForm, ChangeRequest, CoreError, Mode, ProcedureName, ProcedureOutcome,
    ProcedureParams, Session,
};

use crate::cli::{GlobalOpts, OutputFormat, TargetArgs};
use crate::commands::util;
use crate::config::{self, FormDefaults};
use crate::error::CliError;
use crate::output;

pub const SPINNER_MESSAGE: &str = "Executing stored procedure...";

const PARAM_NAMES: [&str; 7] = [
    "action",
    "account_name",
    "owner_role",
    "secret_type",
    "secret_value_1",
    "secret_value_2",
    "rsa_key_slot",
];

// ── Rendering types ─────────────────────────────────────────────────

/// What a finished change reports in structured output.
#[derive(Debug, Serialize)]
pub struct ChangeReport<'a> {
    #[serde(flatten)]
    pub outcome: &'a ProcedureOutcome,
    pub action: Action,
    pub account: &'a str,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct DryRun {
    statement: String,
    parameters: Vec<DryRunParam>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct DryRunParam {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Parameter")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

// ── Flow ────────────────────────────────────────────────────────────

/// Form with the fields every mode shares. Missing values stay empty so
/// validation reports them.
pub fn base_form(mode: Mode, target: &TargetArgs, defaults: &FormDefaults) -> ChangeForm {
    ChangeForm::new(mode, target.account_name.clone().unwrap_or_default()).with_owner_role(
        target
            .owner_role
            .clone()
            .unwrap_or_else(|| defaults.owner_role.clone()),
    )
}

/// Run one change from a filled-in form.
pub async fn run(
    form: &ChangeForm,
    dry_run: bool,
    procedure: &ProcedureName,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            let color = output::should_color(&global.color);
            for message in errors.messages() {
                eprintln!("{}", output::warning(message, color));
            }
            return Err(CoreError::from(errors).into());
        }
    };
    tracing::debug!(request = %request.summary(), "form validated");

    if dry_run {
        print_dry_run(procedure, &request, global);
        return Ok(());
    }

    if !util::confirm(&format!("Proceed to {}?", request.summary()), global.yes)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let session = Session::open(config::resolve(global)?)?;
    let outcome = execute(&session, &request, global.quiet).await?;
    report(&request, &outcome, global)
}

/// Submit behind a spinner.
pub async fn execute(
    session: &Session,
    request: &ChangeRequest,
    quiet: bool,
) -> Result<ProcedureOutcome, CliError> {
    let spinner = util::spinner(SPINNER_MESSAGE, quiet);
    let result = session.submit(request).await;
    spinner.finish_and_clear();
    Ok(result?)
}

/// Print the outcome; a failure status becomes a non-zero exit.
fn report(
    request: &ChangeRequest,
    outcome: &ProcedureOutcome,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = ChangeReport {
        outcome,
        action: request.action(),
        account: &request.account().name,
        executed_at: Utc::now(),
    };
    let color = output::should_color(&global.color);

    match outcome {
        ProcedureOutcome::Success(message) => {
            let out = output::render_single(
                &global.output,
                &report,
                |_| output::success(&format!("Result: {message}"), color),
                |_| message.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ProcedureOutcome::Failure(message) => {
            // Structured formats still get the document on stdout.
            if !matches!(global.output, OutputFormat::Table) {
                let out = output::render_single(
                    &global.output,
                    &report,
                    |_| String::new(),
                    |_| message.clone(),
                );
                output::print_output(&out, global.quiet);
            }
            Err(CliError::ProcedureRejected {
                message: message.clone(),
            })
        }
    }
}

fn print_dry_run(procedure: &ProcedureName, request: &ChangeRequest, global: &GlobalOpts) {
    let params = ProcedureParams::from_request(request);
    let dry_run = DryRun {
        statement: procedure.call_statement(),
        parameters: PARAM_NAMES
            .into_iter()
            .zip(params.redacted())
            .enumerate()
            .map(|(i, (name, value))| DryRunParam {
                position: i + 1,
                name,
                value,
            })
            .collect(),
    };

    let out = match global.output {
        OutputFormat::Table => {
            let table = output::render_list(
                &global.output,
                &dry_run.parameters,
                DryRunParam::clone,
                |p| p.value.clone(),
            );
            format!("{}\n{table}", dry_run.statement)
        }
        OutputFormat::Plain => dry_run
            .parameters
            .iter()
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => output::render_single(&global.output, &dry_run, |_| String::new(), |_| String::new()),
    };
    output::print_output(&out, global.quiet);
}
