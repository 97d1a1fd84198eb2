//! Integration tests for the `isepic` CLI binary.
//!
//! Argument parsing, help output and error exit codes run without any
//! node; the network commands run against a wiremock server passed in
//! through the hidden `--base-url` flag.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{basic_auth, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/api/fmi_platform/v1/identityauth/generatetoken";
const MAPPING_PATH: &str = "/api/identity/v1/identity/useridentity";
const DELETE_BY_PATH: &str = "/api/identity/v1/identity/useridentity/deleteby";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `isepic` binary with env isolation.
///
/// Clears all `ISEPIC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn isepic_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("isepic");
    cmd.env("HOME", "/tmp/isepic-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/isepic-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ISEPIC_PROFILE")
        .env_remove("ISEPIC_HOST")
        .env_remove("ISEPIC_USERNAME")
        .env_remove("ISEPIC_PASSWORD")
        .env_remove("ISEPIC_BASE_URL")
        .env_remove("ISEPIC_OUTPUT")
        .env_remove("ISEPIC_VERIFY_TLS")
        .env_remove("ISEPIC_INSECURE")
        .env_remove("ISEPIC_TIMEOUT")
        .env_remove("ISEPIC_DEFAULTS__OUTPUT")
        .env_remove("ISEPIC_DEFAULTS__TIMEOUT");
    cmd
}

/// Command pre-wired with credentials and the mock server as base URL.
fn mocked_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = isepic_cmd();
    cmd.args([
        "--host",
        "10.0.0.1",
        "--username",
        "alice",
        "--password",
        "secret",
        "--base-url",
        &server.uri(),
    ]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(basic_auth("alice", "secret"))
        .respond_with(ResponseTemplate::new(204).insert_header("X-auth-access-token", "TOK123"))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = isepic_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    isepic_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("ISE-PIC")
            .and(predicate::str::contains("demo"))
            .and(predicate::str::contains("add"))
            .and(predicate::str::contains("delete-by-agent")),
    );
}

#[test]
fn test_version_flag() {
    isepic_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("isepic"));
}

#[test]
fn test_demo_requires_four_arguments() {
    let output = isepic_cmd()
        .args(["demo", "10.0.0.1", "alice"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("<PASSWORD>"), "Expected missing arg names:\n{text}");
}

#[test]
fn test_pat_flags_must_be_given_together() {
    let output = isepic_cmd()
        .args([
            "add", "--user", "bob", "--src-ip", "1.2.3.4", "--domain", "corp.com", "--pat-start",
            "1000",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    isepic_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    isepic_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("isepic"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_profiles_empty() {
    isepic_cmd()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_config_use_unknown_profile() {
    let output = isepic_cmd()
        .args(["config", "use", "nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nope"));
}

// ── Error exit codes ────────────────────────────────────────────────

#[test]
fn test_add_without_host_is_usage_error() {
    let output = isepic_cmd()
        .args([
            "add",
            "--user",
            "bob",
            "--src-ip",
            "1.2.3.4",
            "--domain",
            "corp.com",
            "--agent-info",
            "agentA",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_add_rejects_bad_timestamp_before_connecting() {
    let output = isepic_cmd()
        .args([
            "--host",
            "127.0.0.1",
            "add",
            "--user",
            "bob",
            "--src-ip",
            "1.2.3.4",
            "--domain",
            "corp.com",
            "--timestamp",
            "2024-01-01 00:00:00",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("timestamp"));
}

#[test]
fn test_broken_config_is_reported() {
    let output = isepic_cmd()
        .env("ISEPIC_DEFAULTS__TIMEOUT", "soon")
        .args(["--host", "127.0.0.1", "--username", "alice", "--password", "secret", "token"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("timeout"), "Expected the config error:\n{text}");
    assert!(!text.contains("No ISE-PIC host configured"), "{text}");
}

// ── Network commands against a mock node ────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_demo_runs_full_sequence() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path(MAPPING_PATH))
        .and(header("X-auth-access-token", "TOK123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "42" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{MAPPING_PATH}/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": "42" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(DELETE_BY_PATH))
        .and(query_param("agent_id", "agentA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let output = isepic_cmd()
        .args(["--base-url", &server.uri(), "demo", "10.0.0.1", "alice", "secret", "agentA"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("User added successfully"), "{stdout}");
    assert!(stdout.contains("User removed successfully"), "{stdout}");
    assert!(
        stdout.contains("All identity mappings deleted for agent ID: agentA"),
        "{stdout}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_demo_auth_failure_still_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(MAPPING_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = isepic_cmd()
        .args(["--base-url", &server.uri(), "demo", "10.0.0.1", "alice", "wrong", "agentA"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(combined_output(&output).contains("Failed to authenticate"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_demo_reports_failed_steps() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path(MAPPING_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad mapping"))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(DELETE_BY_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let output = isepic_cmd()
        .args(["--base-url", &server.uri(), "demo", "10.0.0.1", "alice", "secret", "agentA"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Failed to add user"), "{stdout}");
    assert!(stdout.contains("Failed to remove user"), "{stdout}");
    assert!(
        stdout.contains("Failed to delete identity mappings for agent ID: agentA"),
        "{stdout}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_prints_plain_token() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let output = mocked_cmd(&server)
        .args(["-o", "plain", "token"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "TOK123");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_default_output_applies() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let output = mocked_cmd(&server)
        .env("ISEPIC_DEFAULTS__OUTPUT", "json-compact")
        .arg("token")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body, json!({ "token": "TOK123" }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_prints_created_record_as_json() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path(MAPPING_PATH))
        .and(header("X-auth-access-token", "TOK123"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "7", "user": "bob" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = mocked_cmd(&server)
        .args([
            "-o",
            "json-compact",
            "add",
            "--user",
            "bob",
            "--src-ip",
            "1.2.3.4",
            "--domain",
            "corp.com",
            "--agent-info",
            "agentA",
            "--timestamp",
            "2024-01-01T00:00:00Z",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body, json!({ "id": "7", "user": "bob" }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_with_rejected_credentials_exits_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = mocked_cmd(&server)
        .args([
            "add",
            "--user",
            "bob",
            "--src-ip",
            "1.2.3.4",
            "--domain",
            "corp.com",
            "--agent-info",
            "agentA",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_missing_mapping_exits_not_found() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("DELETE"))
        .and(path(format!("{MAPPING_PATH}/nope")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = mocked_cmd(&server)
        .args(["delete", "nope"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_by_agent_sends_query() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("DELETE"))
        .and(path(DELETE_BY_PATH))
        .and(query_param("agent_id", "agentB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    mocked_cmd(&server)
        .args(["-o", "json", "delete-by-agent", "agentB"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 3"));
}
