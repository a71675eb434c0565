//! Tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test file lookup, formats and literal documents.
//! - Test profile overlays and merge precedence.
//! - Test environment overlays, `${NAME}` substitution and `.env` loading.
//! - Test required / default policies end to end.
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Tests use `global_test_lock()` for additional synchronization.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::loader::builder::ConfigLoader;

pub mod env_tests;

/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

#[derive(Debug, Default, PartialEq, crate::Config)]
pub struct Logger {
    #[conf(name = "level", default = "info")]
    pub level: String,
    #[conf(name = "file")]
    pub file: Option<String>,
}

#[derive(Debug, Default, PartialEq, crate::Config)]
pub struct Database {
    #[conf(name = "host", required)]
    pub host: String,
    #[conf(name = "port", default = "5432")]
    pub port: u16,
    #[conf(name = "replicas")]
    pub replicas: Vec<String>,
}

#[derive(Debug, Default, PartialEq, crate::Config)]
pub struct Server {
    #[conf(name = "name", required)]
    pub name: String,
    #[conf(name = "port", default = "8080")]
    pub port: u16,
    #[conf(name = "timeout", default = "30s")]
    pub timeout: Duration,
    #[conf(name = "ratio")]
    pub ratio: f64,
    #[conf(name = "debug")]
    pub debug: bool,
    #[conf(name = "started")]
    pub started: DateTime<Utc>,
    #[conf(name = "db")]
    pub db: Database,
    #[conf(name = "loggers")]
    pub loggers: Vec<Logger>,
}

/// Write `contents` to `dir/name`.
pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

/// A loader searching only `dir`.
pub fn loader_in(dir: &Path) -> ConfigLoader {
    ConfigLoader::new().with_dirs([dir])
}

pub const SERVER_YAML: &str = "\
name: api
port: 443
ratio: 0.25
debug: true
started: 2020-01-01T12:00:00Z
db:
  host: db.local
  replicas: [r1, r2]
loggers:
  - level: debug
    file: /var/log/api.log
  - file: /dev/stdout
";
