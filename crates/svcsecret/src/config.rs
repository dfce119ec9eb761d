//! CLI configuration: thin wrapper around `svcsecret_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--account-url, --token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use svcsecret_core::{DEFAULT_OWNER_ROLE, ProcedureName, SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use svcsecret_config::{
    Config, KEYRING_SERVICE, Profile, config_path, keyring_key, load_config, load_file_config,
    save_config,
};

/// Profile values that shape a form before any connection exists.
#[derive(Debug)]
pub struct FormDefaults {
    /// Pre-fill for the owner role field.
    pub owner_role: String,
    pub procedure: ProcedureName,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Owner role and procedure for the active profile. Needs no credentials.
pub fn form_defaults(global: &GlobalOpts) -> Result<FormDefaults, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);
    form_defaults_for(cfg.profiles.get(&profile_name))
}

pub fn form_defaults_for(profile: Option<&Profile>) -> Result<FormDefaults, CliError> {
    Ok(FormDefaults {
        owner_role: profile
            .and_then(|p| p.owner_role.clone())
            .unwrap_or_else(|| DEFAULT_OWNER_ROLE.into()),
        procedure: svcsecret_config::parse_procedure(
            profile.and_then(|p| p.procedure.as_deref()),
        )?,
    })
}

/// Load config and resolve the session for the active profile.
///
/// Falls back to flags and env vars alone when the profile does not exist.
pub fn resolve(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, cfg.defaults.timeout);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() && global.account_url.is_none() {
        let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
        names.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    resolve_profile(&Profile::default(), &profile_name, global, cfg.defaults.timeout)
}

/// Translate a `Profile` + global flags into a `SessionConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    default_timeout: u64,
) -> Result<SessionConfig, CliError> {
    // 1. Account URL (flag > env > profile)
    let url_str = global
        .account_url
        .as_deref()
        .unwrap_or(&profile.account_url);
    if url_str.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    let account_url = svcsecret_config::parse_account_url(url_str)?;

    // 2. Token (flag > token_env > keyring > plaintext) and its kind
    let token = resolve_token_with_flag(profile, profile_name, global)?;
    let token_type = global
        .token_type
        .map_or(profile.token_type.as_str(), |t| t.as_config_str());
    let token_type = if token_type.is_empty() {
        "oauth"
    } else {
        token_type
    };
    let auth = svcsecret_config::credentials_for(token_type, token)?;

    let mut session = SessionConfig::new(account_url, auth);

    // 3. Statement context (flag > env > profile)
    session.role = global.role.clone().or_else(|| profile.role.clone());
    session.warehouse = global.warehouse.clone().or_else(|| profile.warehouse.clone());
    session.database.clone_from(&profile.database);
    session.schema.clone_from(&profile.schema);
    session.procedure = svcsecret_config::parse_procedure(profile.procedure.as_deref())?;

    // 4. TLS verification
    session.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        svcsecret_config::tls_for(profile)
    };

    // 5. Timeout (flag > profile > defaults)
    let timeout_secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(default_timeout);
    if timeout_secs == 0 {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    let timeout = Duration::from_secs(timeout_secs);
    session.timeout = timeout;
    session.statement_timeout = timeout;

    Ok(session)
}

/// Resolve the token with CLI flag override, then fall through to shared resolution.
fn resolve_token_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(ref token) = global.token {
        return Ok(SecretString::from(token.clone()));
    }
    Ok(svcsecret_config::resolve_token(profile, profile_name)?)
}
