//! `update password` / `update keypair` handlers.

use std::io::{self, IsTerminal};

use secrecy::SecretString;

use svcsecret_core::{ChangeForm, Mode, RsaKeySlot, SecretType};

use crate::cli::{GlobalOpts, KeypairArgs, PasswordArgs, SlotArg, UpdateArgs, UpdateCommand};
use crate::commands::{change, util};
use crate::config::{self, FormDefaults};
use crate::error::CliError;

pub async fn handle(args: UpdateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let defaults = config::form_defaults(global)?;

    match args.command {
        UpdateCommand::Password(args) => {
            let password = read_password(&args)?;
            let form = change::base_form(Mode::Update(SecretType::Password), &args.target, &defaults)
                .with_password(password);
            change::run(&form, args.target.dry_run, &defaults.procedure, global).await
        }
        UpdateCommand::Keypair(args) => {
            let form = keypair_form(&args, &defaults)?;
            change::run(&form, args.target.dry_run, &defaults.procedure, global).await
        }
    }
}

/// Flag/env, then `--password-stdin`, then a hidden prompt on a terminal.
fn read_password(args: &PasswordArgs) -> Result<SecretString, CliError> {
    if let Some(ref password) = args.password {
        return Ok(SecretString::from(password.clone()));
    }
    if args.password_stdin {
        return Ok(SecretString::from(util::read_stdin_line()?));
    }
    if io::stdin().is_terminal() {
        let password = rpassword::prompt_password("New Password: ").map_err(util::prompt_err)?;
        return Ok(SecretString::from(password));
    }
    Ok(SecretString::from(String::new()))
}

impl From<SlotArg> for RsaKeySlot {
    fn from(slot: SlotArg) -> Self {
        match slot {
            SlotArg::One => Self::One,
            SlotArg::Two => Self::Two,
        }
    }
}

fn keypair_form(args: &KeypairArgs, defaults: &FormDefaults) -> Result<ChangeForm, CliError> {
    let public_key = match (&args.public_key, &args.public_key_file) {
        (Some(key), _) => key.clone(),
        (None, Some(path)) => util::read_key_file(path, "public_key")?,
        (None, None) => String::new(),
    };

    let private_key = match (&args.private_key, &args.private_key_file) {
        (Some(key), _) => key.clone(),
        (None, Some(path)) => util::read_key_file(path, "private_key")?,
        (None, None) => String::new(),
    };

    Ok(
        change::base_form(Mode::Update(SecretType::Keypair), &args.target, defaults).with_keypair(
            args.slot.into(),
            public_key,
            SecretString::from(private_key),
        ),
    )
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;
    use svcsecret_core::{ChangeRequest, Field, ProcedureName};

    use super::*;
    use crate::cli::{Cli, Command};

    fn defaults() -> FormDefaults {
        FormDefaults {
            owner_role: "ACCOUNTADMIN".into(),
            procedure: ProcedureName::default(),
        }
    }

    fn keypair_args(argv: &[&str]) -> KeypairArgs {
        let mut full = vec!["svcsecret", "update", "keypair"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Update(UpdateArgs {
                command: UpdateCommand::Keypair(args),
            }) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn keypair_flags_build_a_request() {
        let args = keypair_args(&[
            "--account",
            "SVC_ETL",
            "--slot",
            "2",
            "--public-key",
            "MIIBpub",
            "--private-key",
            "MIIEpriv",
        ]);
        let form = keypair_form(&args, &defaults()).unwrap();
        let Ok(ChangeRequest::UpdateKeypair {
            account,
            slot,
            public_key,
            private_key,
        }) = form.validate()
        else {
            panic!("expected a keypair request");
        };
        assert_eq!(account.name, "SVC_ETL");
        assert_eq!(account.owner_role, "ACCOUNTADMIN");
        assert_eq!(slot, RsaKeySlot::Two);
        assert_eq!(public_key, "MIIBpub");
        assert_eq!(private_key.expose_secret(), "MIIEpriv");
    }

    #[test]
    fn missing_keys_surface_as_validation_issues() {
        let args = keypair_args(&["--account", "SVC_ETL"]);
        let form = keypair_form(&args, &defaults()).unwrap();
        let errors = form.validate().unwrap_err();
        assert!(errors.contains(Field::PublicKey));
        assert!(errors.contains(Field::PrivateKey));
        assert!(!errors.contains(Field::AccountName));
    }

    #[test]
    fn slot_defaults_to_first_key() {
        let args = keypair_args(&["--account", "SVC_ETL"]);
        assert_eq!(args.slot, SlotArg::One);
        let form = keypair_form(&args, &defaults()).unwrap();
        assert_eq!(form.rsa_key_slot, RsaKeySlot::One);
    }

    #[test]
    fn owner_role_flag_beats_profile_default() {
        let args = keypair_args(&["--owner-role", "SECURITYADMIN"]);
        let form = keypair_form(&args, &defaults()).unwrap();
        assert_eq!(form.owner_role, "SECURITYADMIN");
        assert_eq!(form.account_name, "");
    }
}
