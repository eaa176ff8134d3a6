//! Shared helpers for running the `dte` binary in integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Captured result of one CLI invocation.
pub struct CliCase {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn case_dir(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR"))
        .join("cli-cases")
        .join(name);
    fs::create_dir_all(&dir).expect("create case dir");
    dir
}

/// Run `dte` with `args`, isolated from the caller's config and environment.
///
/// The combined transcript is written to `log_path` so failing assertions can
/// point at it.
pub fn run_cli_case(name: &str, args: &[&str]) -> CliCase {
    let dir = case_dir(name);
    let output = Command::new(env!("CARGO_BIN_EXE_dte"))
        .args(args)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("DTE_API_URL")
        .env_remove("DTE_LOG_PATH")
        .output()
        .expect("spawn dte");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let log_path = dir.join("case.log");
    let transcript = format!(
        "args: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status
    );
    fs::write(&log_path, transcript).expect("write case log");

    CliCase {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Write a config with millisecond stage timings and a JSONL activity log
/// inside the case directory. Returns `(config_path, activity_log_path)`.
pub fn fast_config(name: &str) -> (PathBuf, PathBuf) {
    let dir = case_dir(name);
    let activity = dir.join("activity.jsonl");
    let _ = fs::remove_file(&activity);
    let config = dir.join("config.toml");
    let body = format!(
        "[animation]\nstage_durations_ms = [5, 5, 5, 5]\ngrace_ms = 5\n\n\
         [logging]\nenabled = true\njsonl_path = {:?}\n",
        activity.display().to_string()
    );
    fs::write(&config, body).expect("write config");
    (config, activity)
}
