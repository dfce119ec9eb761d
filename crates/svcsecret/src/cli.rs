//! Clap derive structures for the `svcsecret` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// svcsecret -- rotate or disable service account secrets
#[derive(Debug, Parser)]
#[command(
    name = "svcsecret",
    version,
    about = "Update or disable service account secrets in Snowflake",
    long_about = "Update or disable service account secrets by calling the\n\
        CHANGE_SERVICE_ACCOUNT_SECRET_PROC stored procedure through the SQL API.\n\n\
        Run `svcsecret form` for a guided, interactive form, or use the\n\
        `update` and `disable` subcommands from scripts.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "SVCSECRET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account URL, e.g. https://myorg-myacct.snowflakecomputing.com (overrides profile)
    #[arg(long, short = 'a', env = "SVCSECRET_ACCOUNT_URL", global = true)]
    pub account_url: Option<String>,

    /// Access token (overrides profile, env var, and keyring)
    #[arg(long, env = "SVCSECRET_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Kind of access token presented
    #[arg(long, env = "SVCSECRET_TOKEN_TYPE", global = true)]
    pub token_type: Option<TokenTypeArg>,

    /// Role to run statements under (overrides profile)
    #[arg(long, short = 'r', env = "SVCSECRET_ROLE", global = true)]
    pub role: Option<String>,

    /// Warehouse to run statements on (overrides profile)
    #[arg(long, short = 'w', env = "SVCSECRET_WAREHOUSE", global = true)]
    pub warehouse: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SVCSECRET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SVCSECRET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(
        long,
        env = "SVCSECRET_TIMEOUT",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TokenTypeArg {
    /// OAuth access token
    Oauth,
    /// Signed key-pair JWT
    KeypairJwt,
    /// Programmatic access token
    Pat,
}

impl TokenTypeArg {
    /// Same spelling as the `token_type` profile key.
    pub fn as_config_str(self) -> &'static str {
        match self {
            Self::Oauth => "oauth",
            Self::KeypairJwt => "keypair_jwt",
            Self::Pat => "pat",
        }
    }
}

/// RSA key slot on the account record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlotArg {
    /// RSA_PUBLIC_KEY
    #[value(name = "1")]
    One,
    /// RSA_PUBLIC_KEY_2
    #[value(name = "2")]
    Two,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Guided interactive form: choose an action, fill in details, execute
    #[command(
        alias = "ui",
        long_about = "Guided interactive form.\n\n\
            Step 1: Choose an Action\n  \
            UPDATE changes a service account's password or keypair.\n  \
            DISABLE deactivates the account; secret fields are skipped.\n\n\
            Step 2: Choose Secret Type (UPDATE only)\n  \
            PASSWORD asks for the new password.\n  \
            KEYPAIR asks for the RSA key number, public key, and private key.\n\n\
            Step 3: Provide Details & Execute\n  \
            Enter the Service Account Name and confirm the Owner Role,\n  \
            fill in the secret fields for your selection, then execute.\n  \
            The stored procedure's result is displayed."
    )]
    Form,

    /// Update a service account password or RSA public key
    #[command(alias = "u")]
    Update(UpdateArgs),

    /// Disable a service account
    Disable(DisableArgs),

    /// Show the user and role the session runs as
    Whoami,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared request arguments ─────────────────────────────────────────

/// Fields common to every change request.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Service account name
    #[arg(long = "account", short = 'n', alias = "name")]
    pub account_name: Option<String>,

    /// Role that owns the service account [default: profile owner_role or ACCOUNTADMIN]
    #[arg(long)]
    pub owner_role: Option<String>,

    /// Print the statement and (redacted) parameters without executing
    #[arg(long)]
    pub dry_run: bool,
}

// ── Update ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(subcommand)]
    pub command: UpdateCommand,
}

#[derive(Debug, Subcommand)]
pub enum UpdateCommand {
    /// Set a new password
    #[command(alias = "pw")]
    Password(PasswordArgs),

    /// Replace one of the two RSA public keys
    #[command(alias = "kp")]
    Keypair(KeypairArgs),
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// New password (prompted for when omitted on a terminal)
    #[arg(long, env = "SVCSECRET_NEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read the new password from the first line of stdin
    #[arg(long, conflicts_with = "password")]
    pub password_stdin: bool,
}

#[derive(Debug, Args)]
pub struct KeypairArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// RSA key number to replace (1 = RSA_PUBLIC_KEY, 2 = RSA_PUBLIC_KEY_2)
    #[arg(long, value_enum, default_value = "1")]
    pub slot: SlotArg,

    /// RSA public key value
    #[arg(long)]
    pub public_key: Option<String>,

    /// Read the RSA public key from a file
    #[arg(long, conflicts_with = "public_key")]
    pub public_key_file: Option<PathBuf>,

    /// Read the matching RSA private key (recorded for audit only) from a file
    #[arg(long)]
    pub private_key_file: Option<PathBuf>,

    /// Matching RSA private key (recorded for audit only)
    #[arg(
        long,
        env = "SVCSECRET_PRIVATE_KEY",
        hide_env_values = true,
        conflicts_with = "private_key_file"
    )]
    pub private_key: Option<String>,
}

// ── Disable ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DisableArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current resolved configuration (tokens masked)
    Show,

    /// Print the configuration file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set a profile key (account_url, token_type, role, warehouse, ...)
    Set {
        /// Key name
        key: String,
        /// New value
        value: String,
    },

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store an access token for a profile in the system keyring
    SetToken {
        /// Profile to store the token for [default: active profile]
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
