use std::{path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fixed date every scripted session runs on.
pub const TODAY: &str = "2024-03-15";

/// Creates an isolated `KASSA_HOME` for one test.
pub fn kassa_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Script-mode invocation of the shell against `home`, offline and on a fixed date.
pub fn script(home: &PathBuf, input: &str) -> Command {
    let mut cmd = Command::cargo_bin("kassa").expect("kassa binary");
    cmd.env("KASSA_CLI_SCRIPT", "1")
        .env("KASSA_HOME", home)
        .env("KASSA_OFFLINE", "1")
        .env("KASSA_TODAY", TODAY)
        .env("NO_COLOR", "1")
        .write_stdin(input.to_string());
    cmd
}
