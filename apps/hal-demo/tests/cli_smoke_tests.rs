//! CLI smoke tests for the hal-demo binary
//!
//! These run the real binary and check its exit status and output: config
//! validation, help output and the documents each command renders.

use serde_json::Value;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Helper to run the hal-demo binary with given arguments
fn run_hal_demo(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hal-demo"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute hal-demo")
}

/// Run a rendering command and parse its stdout as JSON.
fn render(args: &[&str]) -> Value {
    let mut all = vec!["--base-url", "http://demo.test"];
    all.extend_from_slice(args);
    let output = run_hal_demo(&all);
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document")
}

#[test]
fn test_cli_help_command() {
    let output = run_hal_demo(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hal-demo"), "Should contain binary name");
    assert!(
        stdout.contains("Usage:") || stdout.contains("USAGE:"),
        "Should contain usage information"
    );
    for sub in ["order", "orders", "serve", "check"] {
        assert!(stdout.contains(sub), "Should contain '{}' subcommand", sub);
    }
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--base-url"), "Should mention base-url option");
}

#[test]
fn test_cli_version_command() {
    let output = run_hal_demo(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hal-demo"), "Should contain binary name");
    assert!(stdout.contains("0.1.0"), "Should contain version number");
}

#[test]
fn test_cli_invalid_command() {
    let output = run_hal_demo(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_hal_demo(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config") || stderr.contains("not found"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_hal_demo(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_config_validation_inconsistent_paging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("paging.yaml");
    let config_content = r#"
hal:
  paging:
    default_size: 50
    max_size: 20
"#;
    std::fs::write(&config_path, config_content).expect("Failed to write config file");

    let output = run_hal_demo(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with default > max");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_size"), "Should name the field: {}", stderr);
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("valid.yaml");
    let home = temp_dir.path().to_string_lossy().replace('\\', "/");
    let config_content = format!(
        r#"
home_dir: "{}"
hal:
  base_url: "https://api.example.com"
  cycle_guard: parent

logging:
  default:
    console_level: info
    file: "logs/hal-demo.log"
    file_level: info
    max_backups: 3
    max_size_mb: 10
"#,
        home
    );
    std::fs::write(&config_path, config_content).expect("Failed to write config file");

    let output = run_hal_demo(&["--config", config_path.to_str().unwrap(), "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
        eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("cycle_guard: parent"));
    assert!(
        temp_dir.path().join("logs").exists(),
        "log directory should be created under home_dir"
    );
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let output = run_hal_demo(&["--base-url", "https://override.test", "--print-config", "check"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("https://override.test"));
}

#[test]
fn test_cli_order_document() {
    let doc = render(&["order", "42"]);

    assert_eq!(doc["_links"]["self"], "http://demo.test/Order/Get/42");
    assert_eq!(
        doc["_links"]["customer"],
        "http://demo.test/Customers/Get/Order/42"
    );
    assert_eq!(doc["_meta"]["type"], "Order");
    assert_eq!(doc["resource"]["id"], 42);
    assert_eq!(doc["_embedded"]["Items"].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_versioned_order_document() {
    let doc = render(&["order", "42", "--api-version", "v2"]);

    assert_eq!(doc["_links"]["self"], "http://demo.test/v2/Order/42");
    assert_eq!(
        doc["_embedded"]["Items"][0]["_links"]["self"],
        "http://demo.test/v2/LineItem/411"
    );
}

#[test]
fn test_cli_missing_order_fails() {
    let output = run_hal_demo(&["order", "999"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("999"), "Should name the missing id: {}", stderr);
}

#[test]
fn test_cli_orders_page() {
    let doc = render(&["orders", "--page", "2", "--size", "10"]);

    assert_eq!(doc["_meta"]["count"], 47);
    assert_eq!(doc["_meta"]["pages"], 5);
    assert_eq!(doc["_links"]["previous"], "http://demo.test/Orders/Get?size=10&page=1");
    assert_eq!(doc["_links"]["next"], "http://demo.test/Orders/Get?size=10&page=3");
    assert_eq!(doc["resource"].as_array().unwrap().len(), 10);
}

#[test]
fn test_cli_orders_sort_is_carried_into_links() {
    let doc = render(&["orders", "--sort", "status", "--sort", "total:desc"]);

    assert_eq!(
        doc["_links"]["self"],
        "http://demo.test/Orders/Get?size=10&Sort=status&Desc=False&Sort=total&Desc=True"
    );
    assert_eq!(doc["_meta"]["sort"], "total");
    assert_eq!(doc["_meta"]["desc"], true);
    assert_eq!(doc["_links"]["previous"], Value::Null);
}

#[test]
fn test_cli_orders_page_json() {
    let doc = render(&[
        "orders",
        "--page-json",
        r#"{"page":1,"size":20}"#,
        "--api-version",
        "1",
    ]);

    assert_eq!(doc["_meta"]["page"], 1);
    assert_eq!(doc["_links"]["self"], "http://demo.test/v1/Orders/Get?size=20");
    assert_eq!(doc["_links"]["last"], "http://demo.test/v1/Orders/Get?size=20&page=3");
}

#[test]
fn test_cli_orders_rejects_bad_page_state() {
    for args in [
        &["orders", "--size", "0"][..],
        &["orders", "--size", "5000"][..],
        &["orders", "--sort", "colour"][..],
        &["orders", "--page-json", "null"][..],
        &["orders", "--page-json", r#"{"size":"ten"}"#][..],
    ] {
        let output = run_hal_demo(args);
        assert!(!output.status.success(), "{:?} should fail", args);
    }
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_hal_demo(&["serve", "--help"]);
    assert!(output.status.success(), "Serve subcommand help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--bind"));

    let output = run_hal_demo(&["orders", "--help"]);
    assert!(output.status.success(), "Orders subcommand help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--sort"));
    assert!(stdout.contains("--page-json"));
}

#[test]
fn test_cli_no_arguments() {
    let output = run_hal_demo(&[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage:") || stderr.contains("subcommand"),
        "Should show usage or error about missing subcommand"
    );
}
