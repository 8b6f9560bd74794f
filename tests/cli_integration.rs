//! End-to-end tests for the taskshim binary.
//!
//! Each test runs the real binary with a config file that disables the
//! post-print pause and points file artifacts into a temp directory.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::{json, Value};

use taskshim::codec::encode;
use taskshim::core::types::Arguments;

// =============================================================================
// Test Fixtures
// =============================================================================

struct Shim {
    dir: TempDir,
}

impl Shim {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("xcom");
        dir.child("taskshim.toml")
            .write_str(&format!(
                "[output]\ndelay_ms = 0\npath = {:?}\nformat = \"json\"\n",
                base.display().to_string()
            ))
            .unwrap();
        Self { dir }
    }

    /// A command with a clean secret environment.
    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskshim").unwrap();
        cmd.env("TASKSHIM_CONFIG", self.dir.path().join("taskshim.toml"))
            .env_remove("SECRETS")
            .env_remove("USERS")
            .env_remove("AWS_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn invoke(&self, module: &str, method: &str, args: Value) -> Command {
        let mut cmd = self.command();
        cmd.args(["--module", module, "--cmd-to-run", method, "--cmd-args"])
            .arg(bundle(args));
        cmd
    }
}

fn bundle(args: Value) -> String {
    encode(&Arguments::try_from(args).unwrap()).unwrap()
}

// =============================================================================
// Success paths
// =============================================================================

#[test]
fn help_flag_works() {
    Command::cargo_bin("taskshim")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--cmd-to-run"));
}

#[test]
fn ping_succeeds_and_logs_call() {
    let shim = Shim::new();
    shim.invoke("echo", "ping", json!({}))
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Running module 'echo' and method 'ping'",
        ));
}

#[test]
fn echo_prints_arguments_without_secrets() {
    let shim = Shim::new();
    shim.invoke("echo", "echo", json!({"greeting": "hi"}))
        .env("SECRETS", "{'api_token': 'tok-5f3a9'}")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"greeting":"hi"}"#))
        .stdout(predicate::str::contains("tok-5f3a9").not())
        .stderr(predicate::str::contains("tok-5f3a9").not());
}

#[test]
fn published_value_is_last_stdout_line() {
    let shim = Shim::new();
    let output = shim
        .invoke("echo", "echo", json!({"greeting": "hi"}))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().last(), Some(r#"{"greeting":"hi"}"#));
}

#[test]
fn logs_stay_off_stdout() {
    let shim = Shim::new();
    shim.invoke("echo", "ping", json!({}))
        .arg("--debug")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("INFO"));
}

#[test]
fn sql_preview_writes_artifact() {
    let shim = Shim::new();
    shim.invoke(
        "sql_task",
        "preview",
        json!({"sql": "SELECT * FROM \"events\"", "limit": 25}),
    )
    .assert()
    .success();

    let written = std::fs::read_to_string(shim.dir.path().join("xcom.json")).unwrap();
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["query"], json!("SELECT * FROM 'events' LIMIT 25"));
}

#[test]
fn debug_flag_enables_debug_logs() {
    let shim = Shim::new();
    shim.invoke("echo", "ping", json!({}))
        .arg("--debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"));
}

// =============================================================================
// Failure paths
// =============================================================================

#[test]
fn unknown_module_fails() {
    let shim = Shim::new();
    shim.invoke("no_such_unit", "run", json!({}))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ERROR"))
        .stderr(predicate::str::contains(
            "module 'no_such_unit' does not exist in the source root",
        ))
        .stderr(predicate::str::contains("billing_task, echo, sql_task"));
}

#[test]
fn failure_is_reported_once() {
    let shim = Shim::new();
    let output = shim
        .invoke("no_such_unit", "run", json!({}))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.matches("does not exist in the source root").count(), 1);
}

#[test]
fn unknown_method_fails() {
    let shim = Shim::new();
    shim.invoke("echo", "shout", json!({}))
        .assert()
        .failure()
        .stderr(predicate::str::contains("shout not implemented for module echo"));
}

#[test]
fn missing_arguments_are_listed_together() {
    let shim = Shim::new();
    shim.invoke("billing_task", "invoice", json!({"account_id": "acct-1"}))
        .assert()
        .failure()
        .stderr(predicate::str::contains("amount, quantity"));
}

#[test]
fn missing_constructor_argument_fails() {
    let shim = Shim::new();
    shim.invoke("sql_task", "render", json!({}))
        .assert()
        .failure()
        .stderr(predicate::str::contains("SqlTask constructor"));
}

#[test]
fn malformed_bundle_fails() {
    let shim = Shim::new();
    shim.command()
        .args(["--module", "echo", "--cmd-to-run", "ping", "--cmd-args", "@@not base64@@"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decode arguments"));
}

#[test]
fn unparseable_secrets_fail() {
    let shim = Shim::new();
    shim.invoke("echo", "ping", json!({}))
        .env("SECRETS", "[1, 2, 3]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("$SECRETS"));
}

#[test]
fn nothing_published_on_failure() {
    let shim = Shim::new();
    shim.invoke("sql_task", "preview", json!({"sql": "SELECT 1"}))
        .assert()
        .failure();
    assert!(!shim.dir.path().join("xcom.json").exists());
}
