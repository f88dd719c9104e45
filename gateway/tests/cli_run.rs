//! CLI tests for `gateway run`, `gateway check` and `gateway clean`.
//!
//! Spawns the gateway binary and verifies exit codes and the printed result.

use std::path::Path;
use std::process::{Command, Output};

use gateway::ExecutionResult;
use gateway::exit_codes;
use gateway::test_support::TestProject;

fn gateway_cmd(project_root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gateway"))
        .current_dir(project_root)
        .arg("--config")
        .arg(project_root.join("missing-gateway.toml"))
        .arg("--project-root")
        .arg(project_root)
        .args(args)
        .output()
        .expect("run gateway")
}

fn parse_result(output: &Output) -> ExecutionResult {
    serde_json::from_slice(&output.stdout).expect("result json")
}

#[test]
fn run_success_exits_ok() {
    let project = TestProject::with_wrapper("echo '50% EXECUTING'\n").expect("project");
    let output = gateway_cmd(project.path(), &["run", "build", "--", "--info"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(parse_result(&output), ExecutionResult::succeeded());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("50% EXECUTING"));
}

#[test]
fn progress_none_keeps_stderr_quiet() {
    let project = TestProject::with_wrapper("echo '50% EXECUTING'\n").expect("project");
    let output = gateway_cmd(project.path(), &["run", "build", "--progress", "none"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(parse_result(&output), ExecutionResult::succeeded());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("EXECUTING"), "stderr: {stderr}");
}

#[test]
fn run_failure_exits_failed_with_diagnostic() {
    let project = TestProject::with_wrapper(
        "echo '> Task :app:test FAILED'\necho 'BUILD FAILED in 2s' >&2\nexit 1\n",
    )
    .expect("project");
    let output = gateway_cmd(project.path(), &["run", "test"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let result = parse_result(&output);
    assert!(!result.success);
    assert_eq!(
        result.diagnostic.as_deref(),
        Some("> Task :app:test FAILED\nBUILD FAILED in 2s")
    );
}

#[test]
fn run_dangerous_flag_exits_invalid() {
    let project = TestProject::with_wrapper("exit 0\n").expect("project");
    let output = gateway_cmd(project.path(), &["run", "build", "--", "-Pkey=value"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not allowed due to security concerns"));
}

#[test]
fn run_cleaning_task_exits_invalid() {
    let project = TestProject::with_wrapper("exit 0\n").expect("project");
    let output = gateway_cmd(project.path(), &["run", "cleanBuild"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cleaning task"));
}

#[test]
fn flag_as_task_exits_invalid() {
    let project =
        TestProject::with_wrapper("touch \"$(dirname \"$0\")/spawned\"\n").expect("project");
    let output = gateway_cmd(project.path(), &["clean", "--", "-Ievil.gradle"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a valid Gradle task path"));
    assert!(!project.path().join("spawned").exists());
}

#[test]
fn clean_runs_through_clean_path() {
    let project = TestProject::with_wrapper("echo \"args: $*\"\n").expect("project");
    let output = gateway_cmd(project.path(), &["clean", ":lib"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("args: :lib:clean --no-build-cache"));
}

#[test]
fn check_prints_command_line_without_running() {
    let project =
        TestProject::with_wrapper("touch \"$(dirname \"$0\")/spawned\"\n").expect("project");
    let output = gateway_cmd(project.path(), &["check", ":app:test", "--", "-x", "lint"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim_end().ends_with("gradlew :app:test --no-build-cache -x lint"));
    assert!(!project.path().join("spawned").exists());
}

#[test]
fn missing_wrapper_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = gateway_cmd(temp.path(), &["run", "build"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Gradle wrapper not found"));
}

#[test]
fn init_writes_default_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("gateway.toml");
    let status = Command::new(env!("CARGO_BIN_EXE_gateway"))
        .arg("--config")
        .arg(&path)
        .arg("init")
        .status()
        .expect("run gateway init");

    assert_eq!(status.code(), Some(exit_codes::OK));
    let cfg = gateway::io::config::load_config(&path).expect("load");
    assert_eq!(cfg, gateway::io::config::GatewayConfig::default());
}
