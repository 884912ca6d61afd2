use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("sbf").unwrap();
    cmd.env_remove("SBF_MAX_STEPS")
        .env_remove("SBF_TIMEOUT_MS")
        .env_remove("SBF_FORMAT")
        .env_remove("SBF_STRICT")
        .env_remove("SBF_REPL_MODE")
        .env_remove("RUST_LOG");
    cmd
}

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then the empty body never clears it
}

fn read_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_run_positional_code_decimal() {
    cargo_bin()
        .args(["run", "--format", "decimal", "++>+++<."])
        .assert()
        .success()
        .stdout("2\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_transfer_loop_tape_format() {
    cargo_bin()
        .args(["run", "--format", "tape", "+++[>+<-]."])
        .assert()
        .success()
        .stdout("[0] 3\n");
}

#[test]
fn test_run_file_with_newlines() {
    let tf = read_to_tempfile("+++\n[\n.-\n]\n");
    cargo_bin()
        .args(["run", "--format", "decimal", "--file"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout("3\n2\n1\n");
}

#[test]
fn test_run_streams_stdin() {
    cargo_bin()
        .args(["run", "--format", "decimal"])
        .write_stdin("++[>+++<-]>.")
        .assert()
        .success()
        .stdout("6\n");
}

#[test]
fn test_invalid_character_error_points_at_byte() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "+a+"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Parse error").and(predicate::str::contains("at byte 1")))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_skip_invalid_runs_commented_program() {
    cargo_bin()
        .args(["run", "--skip-invalid", "--format", "decimal", "add three: +++ show: ."])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_unmatched_close_ignored_unless_strict() {
    cargo_bin()
        .args(["run", "--format", "decimal", "]+."])
        .assert()
        .success()
        .stdout("1\n");

    cargo_bin()
        .args(["run", "--strict", "]+."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Loop error"));
}

#[test]
fn test_strict_reports_unclosed_loop() {
    cargo_bin()
        .args(["run", "--strict", "+["])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unclosed loop"));
}

#[test]
fn test_debug_prints_table() {
    cargo_bin()
        .args(["run", "--debug", "+[>+<-]."])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("STEP | DEPTH")
                .and(predicate::str::contains("Moved pointer head to index 1"))
                .and(predicate::str::contains("suppressed in debug")),
        );
}

#[test]
fn test_run_timeout_infinite_flag() {
    let tf = read_to_tempfile(infinite_bf());
    cargo_bin()
        .args(["run", "--timeout", "100", "--file"])
        .arg(tf.path())
        .timeout(Duration::from_secs(2))
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_run_step_limit_infinite_flag() {
    cargo_bin()
        .args(["run", "--max-steps", "50", infinite_bf()])
        .timeout(Duration::from_secs(2))
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_step_limit_from_env() {
    cargo_bin()
        .env("SBF_MAX_STEPS", "50")
        .args(["run", infinite_bf()])
        .timeout(Duration::from_secs(2))
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_file_and_code_conflict() {
    let tf = read_to_tempfile("+");
    cargo_bin()
        .args(["run", "--file"])
        .arg(tf.path())
        .arg("+")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}
