use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn conduit(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("conduit").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("BROWSER_API_KEY")
        .env_remove("BROWSER_API_URL")
        .env_remove("CONDUIT_PORT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    conduit(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_transport_flag() {
    let home = TempDir::new().unwrap();
    conduit(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--transport"));
}

#[test]
fn test_missing_api_key_fails() {
    let home = TempDir::new().unwrap();
    conduit(&home)
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing backend API key"));
}

#[test]
fn test_invalid_config_fails() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("conduit.json"), "{ not json").unwrap();

    conduit(&home)
        .env("BROWSER_API_KEY", "test-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse JSON"));
}

#[test]
fn test_stdio_serves_until_eof() {
    let home = TempDir::new().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );

    conduit(&home)
        .args(["--transport", "stdio", "--api-key", "test-key"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""protocolVersion":"2024-11-05""#))
        .stdout(predicate::str::contains(r#""name":"monitorForCondition""#));
}
