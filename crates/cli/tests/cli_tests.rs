// Integration tests for the jobsettings binary: stdout contract and exit codes.
//
// Run with: cargo test -p jobsettings-cli --test cli_tests -- --nocapture

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{json, Value};
use tempfile::TempDir;

fn jobsettings(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobsettings"));
    // Keep the user's real limits file out of the picture.
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd.env("HOME", config_home);
    cmd.env_remove("RUST_LOG");
    cmd
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    fn limits(&self, max_buckets: u32) -> PathBuf {
        self.write("limits.toml", &format!("max_buckets = {max_buckets}\n"))
    }

    // The file `check` and `merge` read when no --limits is given.
    fn write_default_limits(&self, contents: &str) {
        let dir = self.dir.path().join("jobsettings");
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(dir.join("limits.toml"), contents).expect("write limits");
    }

    fn run(&self, args: &[&str]) -> Output {
        jobsettings(self.dir.path())
            .args(args)
            .output()
            .expect("run jobsettings")
    }

    fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = jobsettings(self.dir.path())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn jobsettings");
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(stdin.as_bytes())
            .expect("write stdin");
        child.wait_with_output().expect("wait jobsettings")
    }
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be valid JSON: {e}\nstdout:\n{stdout}"))
}

fn stdout_text(output: &Output) -> String {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ===========================================================================
// check
// ===========================================================================

#[test]
fn check_drops_reset_fields() {
    let fx = Fixture::new();
    let input = fx.write(
        "s.json",
        r#"{"max_page_search_size": 500, "align_checkpoints": null}"#,
    );
    let limits = fx.limits(10_000);

    let out = fx.run(&["check", input.to_str().unwrap(), "--limits", limits.to_str().unwrap()]);
    assert_eq!(stdout_json(&out), json!({"max_page_search_size": 500}));
}

#[test]
fn check_reads_stdin() {
    let fx = Fixture::new();
    let out = fx.run_with_stdin(&["check", "-"], r#"{"dates_as_epoch_millis": true}"#);
    assert_eq!(stdout_json(&out), json!({"dates_as_epoch_millis": true}));
}

#[test]
fn check_unknown_field_strict_and_lenient() {
    let fx = Fixture::new();
    let input = fx.write("s.json", r#"{"unknown_field": 1}"#);

    let strict = fx.run(&["check", input.to_str().unwrap()]);
    assert_eq!(strict.status.code(), Some(3));
    assert!(stderr(&strict).contains("unknown_field"), "stderr: {}", stderr(&strict));
    assert!(strict.stdout.is_empty());

    let lenient = fx.run(&["check", input.to_str().unwrap(), "--lenient"]);
    assert_eq!(stdout_json(&lenient), json!({}));
}

#[test]
fn check_type_mismatch_is_parse_error() {
    let fx = Fixture::new();
    let input = fx.write("s.json", r#"{"align_checkpoints": 1}"#);
    let out = fx.run(&["check", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("[align_checkpoints]"));
}

#[test]
fn check_out_of_range_is_validation_error() {
    let fx = Fixture::new();
    let input = fx.write("s.json", r#"{"max_page_search_size": 9}"#);
    let out = fx.run(&["check", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(4));
    assert!(
        stderr(&out).contains("settings.max_page_search_size [9] is out of range. The minimum value is 10 and the maximum is 65536"),
        "stderr: {}",
        stderr(&out)
    );
}

#[test]
fn check_uses_injected_limit() {
    let fx = Fixture::new();
    let input = fx.write("s.json", r#"{"max_page_search_size": 500}"#);
    let limits = fx.limits(100);

    let out = fx.run(&["check", input.to_str().unwrap(), "--limits", limits.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("the maximum is 100"));
}

#[test]
fn check_missing_limits_file() {
    let fx = Fixture::new();
    let input = fx.write("s.json", "{}");
    let out = fx.run(&["check", input.to_str().unwrap(), "--limits", "/nonexistent/limits.toml"]);
    assert_eq!(out.status.code(), Some(6));
}

#[test]
fn check_reads_default_limits_file() {
    let fx = Fixture::new();
    fx.write_default_limits("max_buckets = 100\n");
    let input = fx.write("s.json", r#"{"max_page_search_size": 500}"#);

    let out = fx.run(&["check", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("the maximum is 100"), "stderr: {}", stderr(&out));
}

#[test]
fn broken_default_limits_file_falls_back() {
    let fx = Fixture::new();
    fx.write_default_limits("max_buckets = \"lots\"\n");
    let input = fx.write("s.json", r#"{"max_page_search_size": 500}"#);

    let out = fx.run(&["check", input.to_str().unwrap()]);
    assert_eq!(stdout_json(&out), json!({"max_page_search_size": 500}));
    assert!(stderr(&out).contains("using default limits"), "stderr: {}", stderr(&out));
}

#[test]
fn check_accepts_numeric_strings() {
    let fx = Fixture::new();
    let out = fx.run_with_stdin(
        &["check", "-"],
        r#"{"max_page_search_size": "500", "docs_per_second": "12.5"}"#,
    );
    assert_eq!(
        stdout_json(&out),
        json!({"max_page_search_size": 500, "docs_per_second": 12.5})
    );
}

#[test]
fn check_rejects_rate_beyond_f32() {
    let fx = Fixture::new();
    let out = fx.run_with_stdin(&["check", "-"], r#"{"docs_per_second": 1e300}"#);
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("[docs_per_second]"), "stderr: {}", stderr(&out));
}

#[test]
fn check_missing_input_file() {
    let fx = Fixture::new();
    let out = fx.run(&["check", "/nonexistent/settings.json"]);
    assert_eq!(out.status.code(), Some(1));
}

// ===========================================================================
// merge
// ===========================================================================

#[test]
fn merge_reset_clears_and_value_replaces() {
    let fx = Fixture::new();
    let base = fx.write(
        "base.json",
        r#"{"max_page_search_size": 500, "docs_per_second": 12.5, "dates_as_epoch_millis": true}"#,
    );
    let update = fx.write(
        "update.json",
        r#"{"max_page_search_size": null, "align_checkpoints": false}"#,
    );

    let out = fx.run(&["merge", base.to_str().unwrap(), update.to_str().unwrap()]);
    assert_eq!(
        stdout_json(&out),
        json!({"docs_per_second": 12.5, "dates_as_epoch_millis": true, "align_checkpoints": false})
    );
}

#[test]
fn merge_result_is_validated() {
    let fx = Fixture::new();
    let base = fx.write("base.json", "{}");
    let update = fx.write("update.json", r#"{"max_page_search_size": 5}"#);
    let out = fx.run(&["merge", base.to_str().unwrap(), update.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(4));
}

// ===========================================================================
// encode / decode
// ===========================================================================

#[test]
fn encode_decode_keeps_reset_state() {
    let fx = Fixture::new();
    let input = fx.write("s.json", r#"{"max_page_search_size": 500, "align_checkpoints": null}"#);

    let payload = stdout_text(&fx.run(&["encode", input.to_str().unwrap(), "--wire-version", "2"]));
    let report = stdout_json(&fx.run(&["decode", &payload, "--wire-version", "v2"]));

    assert_eq!(report["wire_version"], "v2");
    assert_eq!(report["max_page_search_size"], json!({"state": "value", "value": 500}));
    assert_eq!(report["docs_per_second"], json!({"state": "unset"}));
    assert_eq!(report["dates_as_epoch_millis"], json!({"state": "unset"}));
    assert_eq!(report["align_checkpoints"], json!({"state": "default"}));
}

#[test]
fn old_peer_sees_flags_at_default() {
    let fx = Fixture::new();
    let input = fx.write(
        "s.json",
        r#"{"dates_as_epoch_millis": true, "align_checkpoints": false}"#,
    );

    let payload = stdout_text(&fx.run(&["encode", input.to_str().unwrap(), "--wire-version", "0"]));
    let report = stdout_json(&fx.run(&["decode", &payload, "--wire-version", "0"]));

    assert_eq!(report["dates_as_epoch_millis"], json!({"state": "default"}));
    assert_eq!(report["align_checkpoints"], json!({"state": "default"}));
}

#[test]
fn newer_peer_gets_current_layout() {
    let fx = Fixture::new();
    let input = fx.write("s.json", r#"{"align_checkpoints": false}"#);

    let future = stdout_text(&fx.run(&["encode", input.to_str().unwrap(), "--wire-version", "9"]));
    let current = stdout_text(&fx.run(&["encode", input.to_str().unwrap()]));
    assert_eq!(future, current);

    let report = stdout_json(&fx.run(&["decode", &current]));
    assert_eq!(report["align_checkpoints"], json!({"state": "value", "value": false}));
}

#[test]
fn decode_rejects_bad_payloads() {
    let fx = Fixture::new();

    let not_base64 = fx.run(&["decode", "!!!"]);
    assert_eq!(not_base64.status.code(), Some(5));

    // A single presence byte claiming a value, with no value after it.
    let truncated = fx.run(&["decode", "AQ=="]);
    assert_eq!(truncated.status.code(), Some(5));
    assert!(stderr(&truncated).contains("unexpected end of input"));
}

#[test]
fn bad_wire_version_is_usage_error() {
    let fx = Fixture::new();
    let out = fx.run(&["decode", "AAAAAA==", "--wire-version", "latest"]);
    assert_eq!(out.status.code(), Some(2));
}
