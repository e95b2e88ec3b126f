//! Integration tests for the `karotz` binary.
//!
//! Argument parsing, config handling and exit codes are checked offline;
//! device commands run against a wiremock rabbit.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// A `karotz` command whose config lives under `home`, with every
/// `KAROTZ_*` variable cleared.
fn karotz_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("karotz");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    for var in [
        "KAROTZ_PROFILE",
        "KAROTZ_HOST",
        "KAROTZ_PORT",
        "KAROTZ_TIMEOUT",
        "KAROTZ_OUTPUT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(home: &Path, args: Vec<String>) -> std::process::Output {
    let mut cmd = karotz_cmd(home);
    cmd.args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn device_args(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let addr = server.address();
    let mut args = vec![
        "--host".to_owned(),
        addr.ip().to_string(),
        "--port".to_owned(),
        addr.port().to_string(),
        "--timeout".to_owned(),
        "2".to_owned(),
    ];
    args.extend(rest.iter().map(|s| (*s).to_owned()));
    args
}

async fn mock_rabbit() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Lapin",
            "model": "karotz",
            "serial": "KZ-001",
            "version": "200",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": "0" })))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = karotz_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("OpenKarotz")
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("watch"))
                .and(predicate::str::contains("rfid")),
        );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("karotz"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Usage and config errors ─────────────────────────────────────────

#[test]
fn test_status_without_device_explains_setup() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No device configured"));
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .args(["--profile", "attic", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("attic"));
}

#[test]
fn test_brightness_out_of_range_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .args(["--host", "127.0.0.1", "led", "set", "--brightness", "150"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = karotz_cmd(home.path())
        .args(["--output", "xml", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("possible values"));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_points_into_config_home() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    karotz_cmd(home.path())
        .args(["config", "init", "--device", "192.168.1.201", "--name", "kitchen"])
        .assert()
        .success();

    let output = karotz_cmd(home.path())
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["default_profile"], "kitchen");
    assert_eq!(shown["profiles"]["kitchen"]["host"], "192.168.1.201");

    // A second init under the same name needs --force.
    karotz_cmd(home.path())
        .args(["config", "init", "--device", "10.0.0.1", "--name", "kitchen"])
        .assert()
        .code(2);
    karotz_cmd(home.path())
        .args(["config", "init", "--device", "10.0.0.1", "--name", "kitchen", "--force"])
        .assert()
        .success();
}

// ── Device commands ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_info_prints_raw_block() {
    let server = mock_rabbit().await;
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), device_args(&server, &["-o", "json-compact", "info"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["serial"], "KZ-001");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_reports_descriptor_and_resources() {
    let server = mock_rabbit().await;
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), device_args(&server, &["-o", "json", "status"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["descriptor"]["name"], "Lapin");
    assert_eq!(view["descriptor"]["manufacturer"], "OpenKarotz");
    assert_eq!(view["snapshot"]["status"], "connected");
    assert_eq!(view["snapshot"]["payloads"].as_object().unwrap().len(), 9);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_led_set_posts_exact_body() {
    let server = mock_rabbit().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/leds"))
        .and(body_json(json!({ "color": "red", "brightness": 50 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": "0" })))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = run(
        home.path(),
        device_args(
            &server,
            &["-o", "plain", "led", "set", "--color", "red", "--brightness", "50"],
        ),
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_silent_wakeup_is_sent_as_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/wakeup"))
        .and(query_param("silent", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": "0" })))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), device_args(&server, &["system", "wakeup", "--silent"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = mock_rabbit().await;
    let home = tempfile::tempdir().unwrap();

    let output = run(
        home.path(),
        device_args(
            &server,
            &["-o", "json", "watch", "--interval", "50ms", "--count", "2"],
        ),
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let sequences: Vec<u64> = stdout
        .lines()
        .map(|line| {
            let update: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(update["kind"], "snapshot");
            update["sequence"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(sequences, vec![1, 2]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_device_exits_with_connection_code() {
    let home = tempfile::tempdir().unwrap();
    // Nothing listens on the discard port.
    let output = run(
        home.path(),
        vec![
            "--host".into(),
            "127.0.0.1".into(),
            "--port".into(),
            "9".into(),
            "--timeout".into(),
            "2".into(),
            "status".into(),
        ],
    )
    .await;
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_device_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), device_args(&server, &["info"])).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
