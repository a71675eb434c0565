//! Environment variable tests for the configuration loader.
//!
//! Responsibilities:
//! - Test environment overlays for every leaf kind, including nested and
//!   indexed paths.
//! - Test that the environment is ignored unless enabled.
//! - Test `${NAME}` substitution in file values.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serial_test::serial;
use tempfile::TempDir;

use super::{SERVER_YAML, Server, env_lock, loader_in, write_file};
use crate::loader::error::ConfigError;
use crate::policy::FieldError;

#[test]
#[serial]
fn test_env_overrides_file_values() {
    let _lock = env_lock().lock().unwrap();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "config.yaml", SERVER_YAML);

    temp_env::with_vars(
        [
            ("SVC_NAME", Some("from-env")),
            ("SVC_PORT", Some("9443")),
            ("SVC_TIMEOUT", Some("1m")),
            ("SVC_RATIO", Some("0.75")),
            ("SVC_DEBUG", Some("F")),
            ("SVC_STARTED", Some("2021-06-01T00:00:00Z")),
            ("SVC_DB_REPLICAS", Some("[x, y, z]")),
            ("SVC_LOGGERS_1_LEVEL", Some("warn")),
        ],
        || {
            let mut server = Server::default();
            loader_in(temp_dir.path())
                .with_env("svc")
                .load(&mut server)
                .unwrap();

            assert_eq!(server.name, "from-env");
            assert_eq!(server.port, 9443);
            assert_eq!(server.timeout, Duration::from_secs(60));
            assert_eq!(server.ratio, 0.75);
            assert!(!server.debug);
            assert_eq!(
                server.started,
                Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()
            );
            assert_eq!(server.db.replicas, vec!["x", "y", "z"]);
            assert_eq!(server.loggers[0].level, "debug");
            assert_eq!(server.loggers[1].level, "warn", "env beats default");
        },
    );
}

#[test]
#[serial]
fn test_env_ignored_unless_enabled() {
    let _lock = env_lock().lock().unwrap();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "config.yaml", SERVER_YAML);

    temp_env::with_var("NAME", Some("from-env"), || {
        let mut server = Server::default();
        loader_in(temp_dir.path()).load(&mut server).unwrap();
        assert_eq!(server.name, "api");
    });
}

#[test]
#[serial]
fn test_env_without_prefix() {
    let _lock = env_lock().lock().unwrap();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "config.yaml", SERVER_YAML);

    temp_env::with_vars(
        [
            ("DB_HOST", Some("env-db")),
            ("NAME", None),
            ("PORT", None),
            ("TIMEOUT", None),
            ("RATIO", None),
            ("DEBUG", None),
            ("STARTED", None),
            ("DB_PORT", None),
            ("DB_REPLICAS", None),
            ("LOGGERS_0_LEVEL", None),
            ("LOGGERS_0_FILE", None),
            ("LOGGERS_1_LEVEL", None),
            ("LOGGERS_1_FILE", None),
        ],
        || {
            let mut server = Server::default();
            loader_in(temp_dir.path())
                .with_env("")
                .load(&mut server)
                .unwrap();
            assert_eq!(server.db.host, "env-db");
            assert_eq!(server.name, "api");
        },
    );
}

#[test]
#[serial]
fn test_env_never_grows_sequences() {
    let _lock = env_lock().lock().unwrap();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "config.yaml", SERVER_YAML);

    temp_env::with_var("SVC_LOGGERS_5_LEVEL", Some("error"), || {
        let mut server = Server::default();
        loader_in(temp_dir.path())
            .with_env("svc")
            .load(&mut server)
            .unwrap();
        assert_eq!(server.loggers.len(), 2);
    });
}

#[test]
#[serial]
fn test_invalid_env_value_is_a_field_error() {
    let _lock = env_lock().lock().unwrap();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "config.yaml", SERVER_YAML);

    temp_env::with_var("SVC_DB_PORT", Some("-5"), || {
        let mut server = Server::default();
        let err = loader_in(temp_dir.path())
            .with_env("svc")
            .load(&mut server)
            .unwrap_err();
        let errors = err.field_errors().expect("field errors");
        assert!(matches!(errors.get("db.port"), Some(FieldError::Env { .. })));
        assert_eq!(errors.len(), 1);
    });
}

#[test]
#[serial]
fn test_references_are_substituted() {
    let _lock = env_lock().lock().unwrap();
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "config.yaml",
        "name: ${CONFUCIUS_SVC_NAME}\nport: ${CONFUCIUS_SVC_PORT:8443}\ndb:\n  host: ${CONFUCIUS_DB_HOST}.internal\n",
    );

    temp_env::with_vars(
        [
            ("CONFUCIUS_SVC_NAME", Some("billing")),
            ("CONFUCIUS_SVC_PORT", None),
            ("CONFUCIUS_DB_HOST", Some("pg")),
        ],
        || {
            let mut server = Server::default();
            loader_in(temp_dir.path()).load(&mut server).unwrap();
            assert_eq!(server.name, "billing");
            assert_eq!(server.port, 8443);
            assert_eq!(server.db.host, "pg.internal");
        },
    );
}

#[test]
fn test_reference_without_name_fails() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "config.yaml", "name: \"${}\"\n");

    let mut server = Server::default();
    let err = loader_in(temp_dir.path()).load(&mut server).unwrap_err();
    assert!(matches!(err, ConfigError::Substitution(_)), "got {err}");
}
