//! Integration tests for the `svcsecret` CLI binary.
//!
//! Argument parsing, help output, completions, validation and dry runs run
//! without any account. End-to-end runs use a mocked SQL API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const ISOLATED_HOME: &str = "/tmp/svcsecret-cli-test-nonexistent";

/// Build a [`Command`] for the `svcsecret` binary with env isolation.
///
/// Clears all `SVCSECRET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn svcsecret_cmd() -> assert_cmd::Command {
    svcsecret_cmd_with_home(Path::new(ISOLATED_HOME))
}

fn svcsecret_cmd_with_home(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("svcsecret");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("SVCSECRET_PROFILE")
        .env_remove("SVCSECRET_ACCOUNT_URL")
        .env_remove("SVCSECRET_TOKEN")
        .env_remove("SVCSECRET_TOKEN_TYPE")
        .env_remove("SVCSECRET_ROLE")
        .env_remove("SVCSECRET_WAREHOUSE")
        .env_remove("SVCSECRET_OUTPUT")
        .env_remove("SVCSECRET_INSECURE")
        .env_remove("SVCSECRET_TIMEOUT")
        .env_remove("SVCSECRET_NEW_PASSWORD")
        .env_remove("SVCSECRET_PRIVATE_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn single_cell(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "resultSetMetaData": {
            "numRows": 1,
            "rowType": [{ "name": "CHANGE_SERVICE_ACCOUNT_SECRET_PROC", "type": "text" }]
        },
        "data": [[value]],
        "statementHandle": "01b2-0001"
    }))
}

fn text(value: &str) -> serde_json::Value {
    json!({ "type": "TEXT", "value": value })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = svcsecret_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    svcsecret_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("service account")
            .and(predicate::str::contains("update"))
            .and(predicate::str::contains("disable"))
            .and(predicate::str::contains("form")),
    );
}

#[test]
fn test_form_help_explains_steps() {
    svcsecret_cmd().args(["form", "--help"]).assert().success().stdout(
        predicate::str::contains("Step 1: Choose an Action")
            .and(predicate::str::contains("Step 2: Choose Secret Type"))
            .and(predicate::str::contains("Step 3: Provide Details & Execute")),
    );
}

#[test]
fn test_version_flag() {
    svcsecret_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("svcsecret"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    svcsecret_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    svcsecret_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Validation ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_account_name_blocks_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(single_cell("SUCCESS"))
        .expect(0)
        .mount(&server)
        .await;

    svcsecret_cmd()
        .args(["--account-url", &server.uri(), "--token", "test-token", "-y"])
        .args(["disable"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Service Account Name is required."));

    server.verify().await;
}

#[test]
fn test_keypair_reports_both_missing_keys() {
    svcsecret_cmd()
        .args(["update", "keypair", "--account", "SVC_ETL"])
        .assert()
        .code(2)
        .stderr(
            predicate::str::contains("RSA Public Key is required for a keypair update.").and(
                predicate::str::contains("RSA Private Key is required for a keypair update."),
            ),
        );
}

#[test]
fn test_empty_owner_role_is_reported() {
    svcsecret_cmd()
        .args([
            "update",
            "password",
            "--account",
            "SVC_ETL",
            "--owner-role",
            "",
            "--password",
            "s3cret!",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Service Account Owner Role is required.",
        ))
        .stderr(predicate::str::contains("New Password").not());
}

#[test]
fn test_invalid_slot_rejected_by_parser() {
    svcsecret_cmd()
        .args(["update", "keypair", "--account", "SVC", "--slot", "3"])
        .assert()
        .code(2);
}

#[test]
fn test_form_requires_terminal() {
    svcsecret_cmd()
        .arg("form")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("terminal"));
}

// ── Dry run ─────────────────────────────────────────────────────────

#[test]
fn test_dry_run_disable_shows_placeholders() {
    let output = svcsecret_cmd()
        .args(["-o", "json", "disable", "--account", "SVC_ETL", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        doc["statement"],
        "CALL UTILS_DB.ACCOUNTADMIN_UTILS.CHANGE_SERVICE_ACCOUNT_SECRET_PROC(?, ?, ?, ?, ?, ?, ?)"
    );
    let values: Vec<&str> = doc["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_str().unwrap())
        .collect();
    assert_eq!(
        values,
        ["DISABLE", "SVC_ETL", "ACCOUNTADMIN", "NULL", "NULL", "NULL", "0"]
    );
}

#[test]
fn test_dry_run_masks_password() {
    svcsecret_cmd()
        .args([
            "-o",
            "plain",
            "update",
            "password",
            "--account",
            "SVC_ETL",
            "--password",
            "hunter2",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("UPDATE\nSVC_ETL\nACCOUNTADMIN\nPASSWORD\n"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_dry_run_reads_key_files() {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("rsa_key.pub");
    let private = dir.path().join("rsa_key.p8");
    std::fs::write(&public, "MIIBpublic\n").unwrap();
    std::fs::write(&private, "MIIEprivate\n").unwrap();

    svcsecret_cmd()
        .args(["-o", "plain", "update", "keypair", "--account", "SVC_ETL", "--slot", "2"])
        .arg("--public-key-file")
        .arg(&public)
        .arg("--private-key-file")
        .arg(&private)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("KEYPAIR\nMIIBpublic\n"))
        .stdout(predicate::str::ends_with("2\n"))
        .stdout(predicate::str::contains("MIIEprivate").not());
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_disable_without_account_url_needs_config() {
    let output = svcsecret_cmd()
        .args(["-y", "disable", "--account", "SVC_ETL"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("svcsecret config init"), "{text}");
}

#[test]
fn test_non_interactive_requires_yes() {
    svcsecret_cmd()
        .args(["disable", "--account", "SVC_ETL"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_config_show_masks_token() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("svcsecret");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
default_profile = "prod"

[profiles.prod]
account_url = "https://acme.snowflakecomputing.com"
token = "plaintext-token"
role = "SECADMIN"
"#,
    )
    .unwrap();

    svcsecret_cmd_with_home(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.prod]")
                .and(predicate::str::contains("token = \"****\""))
                .and(predicate::str::contains("plaintext-token").not()),
        );

    svcsecret_cmd_with_home(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod *"));
}

const PROD_CONFIG: &str = r#"
default_profile = "prod"

[profiles.prod]
account_url = "https://acme.snowflakecomputing.com"
token = "plaintext-token"
role = "SECADMIN"
"#;

fn write_config(home: &Path, contents: &str) -> std::path::PathBuf {
    let config_dir = home.join("svcsecret");
    std::fs::create_dir_all(&config_dir).unwrap();
    let path = config_dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_malformed_config_is_never_overwritten() {
    let home = tempfile::tempdir().unwrap();
    let broken = PROD_CONFIG.replace("role = \"SECADMIN\"", "role = \"SECADMIN");
    let path = write_config(home.path(), &broken);

    for args in [
        &["config", "set", "warehouse", "ADMIN_WH"][..],
        &["config", "use", "prod"][..],
    ] {
        let output = svcsecret_cmd_with_home(home.path()).args(args).output().unwrap();
        assert_eq!(output.status.code(), Some(1), "{}", combined_output(&output));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);
    }

    let output = svcsecret_cmd_with_home(home.path())
        .args(["whoami"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(!text.contains("svcsecret config init"), "{text}");
}

#[test]
fn test_config_set_keeps_env_overrides_out_of_the_file() {
    let home = tempfile::tempdir().unwrap();
    let path = write_config(home.path(), PROD_CONFIG);

    svcsecret_cmd_with_home(home.path())
        .env("SVCSECRET_DEFAULT_PROFILE", "staging")
        .env("SVCSECRET_PROFILES__PROD__TOKEN", "env-only-token")
        .args(["config", "set", "warehouse", "ADMIN_WH"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("ADMIN_WH"), "{saved}");
    assert!(saved.contains("plaintext-token"), "{saved}");
    assert!(saved.contains("default_profile = \"prod\""), "{saved}");
    assert!(!saved.contains("env-only-token"), "{saved}");
    assert!(!saved.contains("staging"), "{saved}");
}

#[test]
fn test_zero_timeout_is_rejected() {
    svcsecret_cmd()
        .args(["--timeout", "0", "whoami"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_profile_is_reported() {
    svcsecret_cmd()
        .args(["--profile", "nope", "whoami"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

// ── End to end against a mocked SQL API ─────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_disable_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "role": "ACCOUNTADMIN",
            "bindings": {
                "1": text("DISABLE"),
                "2": text("SVC_ETL"),
                "4": text("NULL"),
                "7": text("0")
            }
        })))
        .respond_with(single_cell("SUCCESS: SVC_ETL disabled"))
        .expect(1)
        .mount(&server)
        .await;

    svcsecret_cmd()
        .args(["--account-url", &server.uri(), "--token", "test-token"])
        .args(["--role", "ACCOUNTADMIN", "-y", "disable", "--account", "SVC_ETL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: SUCCESS: SVC_ETL disabled"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_business_failure_exits_with_rejected_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(single_cell("ERROR: user SVC_GHOST does not exist"))
        .expect(1)
        .mount(&server)
        .await;

    let output = svcsecret_cmd()
        .args(["--account-url", &server.uri(), "--token", "t", "-o", "json", "-y"])
        .args(["update", "password", "--account", "SVC_GHOST", "--password", "x"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(6));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["status"], "failure");
    assert_eq!(doc["message"], "ERROR: user SVC_GHOST does not exist");
    assert_eq!(doc["action"], "UPDATE");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_call_error_is_reported_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "390303",
            "message": "Invalid OAuth access token."
        })))
        .mount(&server)
        .await;

    svcsecret_cmd()
        .args(["--account-url", &server.uri(), "--token", "expired", "-y"])
        .args(["disable", "--account", "SVC_ETL"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains(
            "An error occurred while calling the stored procedure",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_renders_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(body_partial_json(json!({
            "statement": "SELECT CURRENT_USER(), CURRENT_ROLE()"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultSetMetaData": {
                "numRows": 1,
                "rowType": [
                    { "name": "CURRENT_USER()", "type": "text" },
                    { "name": "CURRENT_ROLE()", "type": "text" }
                ]
            },
            "data": [["OPS_ADMIN", "ACCOUNTADMIN"]]
        })))
        .mount(&server)
        .await;

    svcsecret_cmd()
        .args(["--account-url", &server.uri(), "--token", "t", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User: OPS_ADMIN").and(
            predicate::str::contains("Role: ACCOUNTADMIN"),
        ));
}
