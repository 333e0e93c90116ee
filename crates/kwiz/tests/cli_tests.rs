//! CLI integration tests

use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "kwiz", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("node"), "Should show node command");
    assert!(stdout.contains("pod"), "Should show pod command");
    assert!(stdout.contains("--kubeconfig"), "Should show kubeconfig flag");
    assert!(stdout.contains("--format"), "Should show format flag");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = run(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kwiz"), "Should show binary name");
}

/// Test node subcommand help
#[test]
fn test_node_help() {
    let output = run(&["node", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Node help should succeed");
    assert!(stdout.contains("--show-actual"), "Should show show-actual flag");
    assert!(stdout.contains("--selector"), "Should show selector flag");
    assert!(stdout.contains("--resource"), "Should show resource flag");
}

/// Test pod subcommand help
#[test]
fn test_pod_help() {
    let output = run(&["pods", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Pod help should succeed");
    assert!(stdout.contains("--namespace"), "Should show namespace flag");
}

/// Test that an unknown resource kind is rejected before connecting
#[test]
fn test_unknown_resource_rejected() {
    let output = run(&["node", "--resource", "gpu"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unknown resource should fail");
    assert!(stderr.contains("gpu"), "Should name the rejected value");
}
