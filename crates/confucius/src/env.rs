//! Environment variable access.
//!
//! Responsibilities:
//! - Derive the environment key of a field path (`server.ports[0]` with prefix
//!   `myapp` becomes `MYAPP_SERVER_PORTS_0`).
//! - Look up variables, treating a set-but-empty variable as present.
//! - Substitute `${NAME}` and `${NAME:default}` references in tree strings.
//!
//! Does NOT handle:
//! - Loading `.env` files (see `ConfigLoader::load_dotenv`).
//! - Coercing looked-up values (see `policy.rs`).
//!
//! Invariants:
//! - Key formatting is purely textual: consecutive separators are kept, so
//!   `a..b` becomes `A__B`.
//! - A reference to an absent variable without a default expands to the empty
//!   string; only a reference without a name is an error.

use std::borrow::Cow;
use std::env::VarError;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::loader::Tree;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("reference pattern is valid"));

/// A `${...}` reference could not be expanded.
#[derive(Error, Debug)]
pub enum SubstitutionError {
    #[error("environment name is missing in {reference:?} at `{path}`")]
    MissingName { path: String, reference: String },
}

/// Format the environment key for a field path.
///
/// `.` and `[` become `_`, `]` is dropped, the result is uppercased and
/// prefixed with `PREFIX_` when `prefix` is not empty.
pub fn format_env_key(path: &str, prefix: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + path.len() + 1);
    if !prefix.is_empty() {
        key.push_str(prefix);
        key.push('_');
    }
    for ch in path.chars() {
        match ch {
            '.' | '[' => key.push('_'),
            ']' => {}
            other => key.push(other),
        }
    }
    key.to_uppercase()
}

/// Read `key` from the environment.
///
/// Returns `Ok(None)` when unset; an empty value is returned as `Some("")`.
pub fn lookup(key: &str) -> Result<Option<String>, VarError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Expand every `${NAME}` / `${NAME:default}` reference in `input`.
///
/// The default is everything after the first `:`. Returns the offending
/// reference when one has no name.
fn expand_str(input: &str) -> Result<Cow<'_, str>, String> {
    if !input.contains("${") {
        return Ok(Cow::Borrowed(input));
    }

    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in REFERENCE.captures_iter(input) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Everything after the first `:` is the default.
        let (name, default) = match inner.as_str().split_once(':') {
            Some((name, default)) => (name, default),
            None => (inner.as_str(), ""),
        };
        if name.is_empty() {
            return Err(whole.as_str().to_string());
        }

        out.push_str(&input[last..whole.start()]);
        match std::env::var(name) {
            Ok(value) => out.push_str(&value),
            Err(_) => out.push_str(default),
        }
        last = whole.end();
    }
    out.push_str(&input[last..]);
    Ok(Cow::Owned(out))
}

/// Expand references in one string.
pub fn expand(input: &str) -> Result<String, SubstitutionError> {
    expand_str(input)
        .map(Cow::into_owned)
        .map_err(|reference| SubstitutionError::MissingName {
            path: String::new(),
            reference,
        })
}

/// Expand references in every string value of `tree`; keys are left as is.
pub fn expand_tree(tree: &mut Tree) -> Result<(), SubstitutionError> {
    for (key, value) in tree.iter_mut() {
        expand_value(value, key)?;
    }
    Ok(())
}

fn expand_value(value: &mut JsonValue, path: &str) -> Result<(), SubstitutionError> {
    match value {
        JsonValue::String(s) => {
            let expanded = match expand_str(s) {
                Ok(Cow::Borrowed(_)) => None,
                Ok(Cow::Owned(expanded)) => Some(expanded),
                Err(reference) => {
                    return Err(SubstitutionError::MissingName {
                        path: path.to_string(),
                        reference,
                    });
                }
            };
            if let Some(expanded) = expanded {
                *s = expanded;
            }
        }
        JsonValue::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                expand_value(item, &format!("{path}[{index}]"))?;
            }
        }
        JsonValue::Object(map) => {
            for (key, item) in map.iter_mut() {
                expand_value(item, &format!("{path}.{key}"))?;
            }
        }
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn test_format_env_key() {
        assert_eq!(format_env_key("server.ports[0]", "myapp"), "MYAPP_SERVER_PORTS_0");
        assert_eq!(format_env_key("loggers[0].level", ""), "LOGGERS_0_LEVEL");
        assert_eq!(format_env_key("db.host", "app"), "APP_DB_HOST");
        assert_eq!(format_env_key("grid[1][2]", ""), "GRID_1__2");
        assert_eq!(format_env_key("a..b", ""), "A__B");
    }

    #[test]
    #[serial]
    fn test_lookup_treats_empty_as_present() {
        temp_env::with_vars(
            [("CONFUCIUS_TEST_EMPTY", Some("")), ("CONFUCIUS_TEST_UNSET", None)],
            || {
                assert_eq!(lookup("CONFUCIUS_TEST_EMPTY").unwrap(), Some(String::new()));
                assert_eq!(lookup("CONFUCIUS_TEST_UNSET").unwrap(), None);
            },
        );
    }

    #[test]
    #[serial]
    fn test_expand_references() {
        temp_env::with_vars(
            [("CONFUCIUS_HOST", Some("db.local")), ("CONFUCIUS_MISSING", None)],
            || {
                assert_eq!(expand("${CONFUCIUS_HOST}").unwrap(), "db.local");
                assert_eq!(
                    expand("tcp://${CONFUCIUS_HOST}:${CONFUCIUS_MISSING:5432}").unwrap(),
                    "tcp://db.local:5432"
                );
                assert_eq!(expand("${CONFUCIUS_MISSING}").unwrap(), "");
                assert_eq!(
                    expand("${CONFUCIUS_MISSING:http://x:1}").unwrap(),
                    "http://x:1"
                );
                assert_eq!(expand("no references").unwrap(), "no references");
            },
        );
    }

    #[test]
    fn test_expand_rejects_missing_name() {
        for input in ["${}", "prefix ${:default}"] {
            let err = expand(input).unwrap_err();
            assert!(err.to_string().contains("environment name is missing"), "{input}");
        }
    }

    #[test]
    #[serial]
    fn test_expand_tree_rewrites_nested_strings() {
        temp_env::with_var("CONFUCIUS_REGION", Some("eu-west-1"), || {
            let mut tree = match json!({
                "region": "${CONFUCIUS_REGION}",
                "zones": ["${CONFUCIUS_REGION}a", 3],
                "db": {"url": "pg://${CONFUCIUS_REGION}", "port": 5432},
            }) {
                JsonValue::Object(map) => map,
                _ => unreachable!(),
            };
            expand_tree(&mut tree).unwrap();
            assert_eq!(
                JsonValue::Object(tree),
                json!({
                    "region": "eu-west-1",
                    "zones": ["eu-west-1a", 3],
                    "db": {"url": "pg://eu-west-1", "port": 5432},
                })
            );
        });
    }

    #[test]
    fn test_expand_tree_reports_path() {
        let mut tree = match json!({"db": {"hosts": ["ok", "${}"]}}) {
            JsonValue::Object(map) => map,
            _ => unreachable!(),
        };
        match expand_tree(&mut tree).unwrap_err() {
            SubstitutionError::MissingName { path, reference } => {
                assert_eq!(path, "db.hosts[1]");
                assert_eq!(reference, "${}");
            }
        }
    }
}
