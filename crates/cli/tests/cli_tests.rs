use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the developer's shell: no credential, no `.env`,
/// no model overrides, no OTLP exporter.
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("research-crew");
    cmd.current_dir(dir.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("RESEARCH_CREW_MODEL")
        .env_remove("RESEARCH_CREW_TEMPERATURE")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .env_remove("LOG_FORMAT")
        .env("RUST_LOG", "warn");
    cmd
}

const BAD_CREW: &str = r#"
name = "broken"

[model]
id = "gemini-2.0-flash"

[[steps]]
id = "quiz"
description = "Write a quiz for {level} students"

[steps.role]
identity = "Examiner"
goal = "Test knowledge of {topic}"
backstory = "Teacher."
"#;

#[test]
fn test_cli_help() {
    let mut cmd = cargo_bin_cmd!("research-crew");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("research -> analysis -> quiz"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("ping"));
}

#[test]
fn test_cli_run_help_lists_options() {
    let mut cmd = cargo_bin_cmd!("research-crew");
    cmd.args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--topic"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--max-retries"))
        .stdout(predicate::str::contains("--transcript"))
        .stdout(predicate::str::contains("api-key").not());
}

#[test]
fn test_validate_builtin_crew() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Pipeline 'research-crew' is valid: 3 step(s) (research -> analysis -> quiz)",
        ))
        .stdout(predicate::str::contains("gemini/gemini-2.0-flash"));
}

#[test]
fn test_validate_dump_produces_loadable_toml() {
    let dir = TempDir::new().unwrap();
    let output = isolated(&dir)
        .args(["validate", "--dump"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let path = dir.path().join("crew.toml");
    std::fs::write(&path, &output.stdout).unwrap();

    isolated(&dir)
        .args(["validate", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 step(s)"));
}

#[test]
fn test_validate_rejects_undefined_template_parameter() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, BAD_CREW).unwrap();

    isolated(&dir)
        .args(["validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "step 'quiz' has an invalid description template",
        ))
        .stderr(predicate::str::contains("undefined parameter 'level'"));
}

#[test]
fn test_validate_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["validate", "--config", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read does-not-exist.toml"));
}

#[test]
fn test_malformed_dotenv_is_reported_but_not_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "this line is not valid\n").unwrap();

    isolated(&dir)
        .arg("validate")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: failed to load .env"));
}

#[test]
fn test_missing_dotenv_is_silent() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .arg("validate")
        .assert()
        .success()
        .stderr(predicate::str::contains(".env").not());
}

#[test]
fn test_run_without_credential_fails_on_first_step() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["run", "--topic", "multi-agent AI systems"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FINAL RESULT").not())
        .stderr(predicate::str::contains("step 1 of 3 ('research') failed"))
        .stderr(predicate::str::contains(
            "authentication failed: GEMINI_API_KEY is not set",
        ));
}

#[test]
fn test_run_rejects_out_of_range_temperature() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["run", "--temperature", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0.0, 1.0]"));
}

#[test]
fn test_ping_without_credential_reports_it() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .arg("ping")
        .assert()
        .failure()
        .stdout(predicate::str::contains("API key: not set (GEMINI_API_KEY)"))
        .stderr(predicate::str::contains("authentication failed"));
}
