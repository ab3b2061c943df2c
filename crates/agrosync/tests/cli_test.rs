//! Integration tests for the `agrosync` CLI binary.
//!
//! Argument parsing, help output, shell completions and error exit codes
//! run without a backend; a few commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `agrosync` binary with env isolation.
///
/// Clears all `AGROSYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn agrosync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("agrosync");
    cmd.env("HOME", "/tmp/agrosync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/agrosync-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("AGROSYNC_PROFILE")
        .env_remove("AGROSYNC_API_URL")
        .env_remove("AGROSYNC_TOKEN")
        .env_remove("AGROSYNC_USER_POOL_ID")
        .env_remove("AGROSYNC_CLIENT_ID")
        .env_remove("AGROSYNC_REGION")
        .env_remove("AGROSYNC_OUTPUT")
        .env_remove("AGROSYNC_INSECURE")
        .env_remove("AGROSYNC_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// A command pointed at `url` with identity settings and a token.
fn backend_cmd(url: &str) -> assert_cmd::Command {
    let mut cmd = agrosync_cmd();
    cmd.env("AGROSYNC_API_URL", url)
        .env("AGROSYNC_USER_POOL_ID", "us-east-1_test")
        .env("AGROSYNC_CLIENT_ID", "client-test")
        .env("AGROSYNC_TOKEN", "tok-123")
        .write_stdin("");
    cmd
}

/// Run a blocking `assert_cmd` invocation from inside a tokio test.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = agrosync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_command_groups() {
    agrosync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("facilities")
            .and(predicate::str::contains("plots"))
            .and(predicate::str::contains("thresholds"))
            .and(predicate::str::contains("responsibles")),
    );
}

#[test]
fn test_version_flag() {
    agrosync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("agrosync"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    agrosync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    agrosync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_bad_range_is_a_usage_error() {
    agrosync_cmd()
        .args(["thresholds", "set", "p-1", "--temperature", "warm"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MIN:MAX"));
}

#[test]
fn test_bad_date_is_a_usage_error() {
    agrosync_cmd()
        .args(["irrigation", "facility", "f-1", "--date", "yesterday"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_no_config_points_at_init() {
    agrosync_cmd()
        .args(["facilities", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_missing_identity_names_every_key() {
    agrosync_cmd()
        .args(["--api-url", "http://127.0.0.1:9/", "facilities", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("user_pool_id").and(predicate::str::contains("client_id")));
}

#[test]
fn test_missing_token_is_an_auth_error() {
    agrosync_cmd()
        .env("AGROSYNC_USER_POOL_ID", "pool")
        .env("AGROSYNC_CLIENT_ID", "client")
        .args(["--api-url", "http://127.0.0.1:9/", "facilities", "list"])
        .assert()
        .code(3);
}

#[test]
fn test_remove_without_yes_requires_confirmation() {
    backend_cmd("http://127.0.0.1:9/")
        .args(["responsibles", "remove", "f-1", "ana@farm.io"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test]
async fn test_facilities_list_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/facilities"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "facilities": [
                { "facility_id": "f-1", "name": "North Greenhouse", "location": "Valencia" },
                { "facility_id": "f-2", "name": "South Field" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = backend_cmd(&server.uri());
    cmd.args(["-o", "plain", "facilities", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "f-1\nf-2\n");
}

#[tokio::test]
async fn test_plot_without_data_is_an_empty_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plots/p-1/state"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "No data for plot" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = backend_cmd(&server.uri());
    cmd.args(["plots", "state", "p-1"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No sensor data yet"));
}

#[tokio::test]
async fn test_server_fault_exits_with_connection_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plots/p-1/state"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let mut cmd = backend_cmd(&server.uri());
    cmd.args(["plots", "state", "p-1"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_add_responsible_puts_full_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/facilities/f-1/responsibles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "facility_id": "f-1",
            "responsibles": ["ana@farm.io"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/facilities/f-1/responsibles"))
        .and(body_json(json!({ "responsibles": ["ana@farm.io", "ben@farm.io"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "facility_id": "f-1",
            "responsibles": ["ana@farm.io", "ben@farm.io"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = backend_cmd(&server.uri());
    cmd.args(["-o", "plain", "responsibles", "add", "f-1", "ben@farm.io"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "ana@farm.io\nben@farm.io\n"
    );
}

#[tokio::test]
async fn test_duplicate_responsible_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/facilities/f-1/responsibles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "facility_id": "f-1",
            "responsibles": ["ana@farm.io"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/facilities/f-1/responsibles"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = backend_cmd(&server.uri());
    cmd.args(["responsibles", "add", "f-1", "ana@farm.io"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Email already added"));
}
