//! Shared configuration for svcsecret.
//!
//! TOML profiles, token resolution (env var + keyring + plaintext), and the
//! parsers the CLI uses to assemble a `svcsecret_core::SessionConfig` with
//! its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use svcsecret_core::{AuthCredentials, ProcedureName, TlsVerification};

/// Keyring service name for stored tokens.
pub const KEYRING_SERVICE: &str = "svcsecret";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no access token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    60
}

/// A named account profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Account URL (e.g., "https://myorg-myacct.snowflakecomputing.com").
    pub account_url: String,

    /// Token kind: "oauth", "keypair_jwt", or "pat".
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Access token in plaintext. Prefer the keyring or an env var.
    pub token: Option<String>,

    /// Environment variable name containing the access token.
    pub token_env: Option<String>,

    /// Role statements run under.
    pub role: Option<String>,

    pub warehouse: Option<String>,

    pub database: Option<String>,

    pub schema: Option<String>,

    /// Owner role pre-filled on forms.
    pub owner_role: Option<String>,

    /// Fully-qualified procedure name override.
    pub procedure: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

fn default_token_type() -> String {
    "oauth".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "svcsecret", "svcsecret").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("svcsecret");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, then `SVCSECRET_*` env vars.
///
/// Nested keys use a double underscore: `SVCSECRET_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SVCSECRET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the canonical file alone, for commands that write it back.
pub fn load_file_config() -> Result<Config, ConfigError> {
    load_file_config_from(&config_path())
}

/// Defaults + file, without the `SVCSECRET_*` overlay.
///
/// A missing file yields defaults; a malformed one is an error, so a
/// later save never replaces it.
pub fn load_file_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution (without CLI flags) ────────────────────────────

/// Keyring entry name for a profile's token.
pub fn keyring_key(profile_name: &str) -> String {
    format!("{profile_name}/token")
}

/// Resolve the access token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_key(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Pair a token with its declared kind.
pub fn credentials_for(token_type: &str, token: SecretString) -> Result<AuthCredentials, ConfigError> {
    match token_type.to_ascii_lowercase().as_str() {
        "oauth" => Ok(AuthCredentials::OAuth(token)),
        "keypair_jwt" | "jwt" => Ok(AuthCredentials::KeypairJwt(token)),
        "pat" | "programmatic_access_token" => Ok(AuthCredentials::ProgrammaticAccessToken(token)),
        other => Err(ConfigError::Validation {
            field: "token_type".into(),
            reason: format!("expected 'oauth', 'keypair_jwt', or 'pat', got '{other}'"),
        }),
    }
}

/// Parse an account URL, accepting a bare host for convenience.
pub fn parse_account_url(raw: &str) -> Result<url::Url, ConfigError> {
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    candidate.parse().map_err(|_| ConfigError::Validation {
        field: "account_url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Parse a procedure name from config.
pub fn parse_procedure(raw: Option<&str>) -> Result<ProcedureName, ConfigError> {
    raw.map_or_else(
        || Ok(ProcedureName::default()),
        |name| {
            name.parse().map_err(|e: svcsecret_core::CoreError| ConfigError::Validation {
                field: "procedure".into(),
                reason: e.to_string(),
            })
        },
    )
}

/// TLS strategy for a profile.
pub fn tls_for(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}
