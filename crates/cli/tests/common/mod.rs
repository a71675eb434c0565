//! Shared test utilities for confucius CLI integration tests.
//!
//! Invariants / Assumptions:
//! - All commands built here are hermetic: no local `.env` and no
//!   `CONFUCIUS_FILE` leaking in from the host.

use std::path::Path;

use assert_cmd::Command;

/// Returns a hermetic `confucius` command for integration testing.
pub fn confucius_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("confucius");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");
    cmd.env_remove("CONFUCIUS_FILE").env_remove("RUST_LOG");

    cmd
}

/// Write `contents` to `dir/name`.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}
