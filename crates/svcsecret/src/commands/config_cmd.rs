//! Config subcommand handlers.

use dialoguer::{Input, Select};

use svcsecret_core::DEFAULT_OWNER_ROLE;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util::prompt_err;
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext tokens masked.
fn redact(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
    cfg
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "account_url = \"{}\"", p.account_url);
        let _ = writeln!(out, "token_type = \"{}\"", p.token_type);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"{MASK}\"");
        }
        let fields = [
            ("token_env", &p.token_env),
            ("role", &p.role),
            ("warehouse", &p.warehouse),
            ("database", &p.database),
            ("schema", &p.schema),
            ("owner_role", &p.owner_role),
            ("procedure", &p.procedure),
        ];
        for (key, value) in fields {
            if let Some(v) = value {
                let _ = writeln!(out, "{key} = \"{v}\"");
            }
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

fn store_in_keyring(profile_name: &str, token: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new(config::KEYRING_SERVICE, &config::keyring_key(profile_name))
        .map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        })?;
    entry.set_password(token).map_err(|e| CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store token in keyring: {e}"),
    })
}

/// Offer to store the token in the system keyring or return it for plaintext config.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_token_storage(profile_name: &str, token: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the access token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store_in_keyring(profile_name, token)?;
        eprintln!("   ✓ Token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token.to_owned()))
    }
}

fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Apply `config set <key> <value>` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "account_url" => {
            svcsecret_config::parse_account_url(&value)?;
            profile.account_url = value;
        }
        "token_type" => {
            // Validate the spelling with a throwaway token.
            svcsecret_config::credentials_for(&value, String::new().into())?;
            profile.token_type = value;
        }
        "token_env" => profile.token_env = Some(value),
        "role" => profile.role = Some(value),
        "warehouse" => profile.warehouse = Some(value),
        "database" => profile.database = Some(value),
        "schema" => profile.schema = Some(value),
        "owner_role" => profile.owner_role = Some(value),
        "procedure" => {
            svcsecret_config::parse_procedure(Some(&value))?;
            profile.procedure = Some(value);
        }
        "ca_cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => {
            let secs: u64 = value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "timeout".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            profile.timeout = Some(secs);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: account_url, token_type, \
                     token_env, role, warehouse, database, schema, owner_role, procedure, \
                     ca_cert, insecure, timeout"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("svcsecret configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let account_url: String = Input::new()
                .with_prompt("Account URL (e.g. https://myorg-myacct.snowflakecomputing.com)")
                .validate_with(|v: &String| {
                    svcsecret_config::parse_account_url(v)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let token_types = ["oauth", "keypair_jwt", "pat"];
            let type_labels = &[
                "OAuth access token",
                "Key-pair JWT",
                "Programmatic access token",
            ];
            let type_idx = Select::new()
                .with_prompt("Token type")
                .items(type_labels)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            let token_type = token_types.get(type_idx).copied().unwrap_or("oauth");

            let token = rpassword::prompt_password("Access token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "access token cannot be empty".into(),
                });
            }
            let token_field = prompt_token_storage(&profile_name, &token)?;

            let role: String = Input::new()
                .with_prompt("Role (empty for the user's default)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let warehouse: String = Input::new()
                .with_prompt("Warehouse (empty for the user's default)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let owner_role: String = Input::new()
                .with_prompt("Default Service Account Owner Role")
                .default(DEFAULT_OWNER_ROLE.into())
                .interact_text()
                .map_err(prompt_err)?;

            let profile = Profile {
                account_url,
                token_type: token_type.into(),
                token: token_field,
                role: optional(role),
                warehouse: optional(warehouse),
                owner_role: optional(owner_role),
                ..Profile::default()
            };

            let mut cfg = config::load_file_config()?;
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: svcsecret whoami");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redact(&config::load_config()?);
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_file_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_insert_with(|| Profile {
                token_type: "oauth".into(),
                ..Profile::default()
            });
            set_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: svcsecret config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                let lines: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_file_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config()?;
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }

            let token = rpassword::prompt_password("Access token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "access token cannot be empty".into(),
                });
            }
            store_in_keyring(&profile_name, &token)?;
            eprintln!("✓ Token for profile '{profile_name}' stored in system keyring");
            Ok(())
        }
    }
}
