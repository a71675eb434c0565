//! Locating and parsing configuration documents.
//!
//! Responsibilities:
//! - Map file extensions to document formats.
//! - Search directories for a file name.
//! - Parse YAML / JSON / TOML text into an untyped `Tree`.
//!
//! Does NOT handle:
//! - Merging trees (see `merge.rs`).
//! - Decoding trees into records (see `decode.rs`).
//!
//! Invariants:
//! - The top level of every document is a mapping; an empty document is an
//!   empty mapping.
//! - Mapping keys are always strings: YAML scalar keys are stringified.
//! - Values that have no JSON equivalent (TOML datetimes, non-finite floats)
//!   become strings and are coerced later like any other scalar.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::{Map, Number, Value as JsonValue};

use super::Tree;
use super::error::ConfigError;

/// Document format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Format for an extension (without the dot), case-insensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// Format for a file path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| ConfigError::UnsupportedFormat {
            extension: extension.to_string(),
        })
    }

    /// Parse `text` into a tree. `origin` names the source in errors.
    pub fn parse(self, text: &str, origin: &str) -> Result<Tree, ConfigError> {
        let parsed = match self {
            Format::Yaml => parse_yaml(text),
            Format::Json => parse_json(text),
            Format::Toml => parse_toml(text),
        };
        parsed.map_err(|message| ConfigError::Parse {
            origin: origin.to_string(),
            message,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => f.write_str("yaml"),
            Format::Json => f.write_str("json"),
            Format::Toml => f.write_str("toml"),
        }
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.')).ok_or_else(|| {
            ConfigError::UnsupportedFormat {
                extension: s.to_string(),
            }
        })
    }
}

/// First `dir/name` that is a regular file, searching `dirs` in order.
pub fn find_file(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, ConfigError> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| ConfigError::FileNotFound {
            name: name.to_string(),
            searched: dirs.to_vec(),
        })
}

/// Read and parse a file, choosing the format from its extension.
pub fn read_file(path: &Path) -> Result<Tree, ConfigError> {
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    format.parse(&text, &path.display().to_string())
}

fn into_tree(value: JsonValue) -> Result<Tree, String> {
    match value {
        JsonValue::Null => Ok(Tree::new()),
        JsonValue::Object(map) => Ok(map),
        other => Err(format!(
            "top-level value must be a mapping, found {}",
            super::decode::describe(&other)
        )),
    }
}

fn parse_json(text: &str) -> Result<Tree, String> {
    let value: JsonValue = serde_json::from_str(text).map_err(|e| e.to_string())?;
    into_tree(value)
}

fn parse_yaml(text: &str) -> Result<Tree, String> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    into_tree(yaml_to_json(value)?)
}

fn float_value(f: f64) -> JsonValue {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(f.to_string()))
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<JsonValue, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => JsonValue::Null,
        Yaml::Bool(b) => JsonValue::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                float_value(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Yaml::String(s) => JsonValue::String(s),
        Yaml::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            JsonValue::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

fn parse_toml(text: &str) -> Result<Tree, String> {
    let table: toml::Table = toml::from_str(text).map_err(|e| e.to_string())?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect())
}

fn toml_to_json(value: toml::Value) -> JsonValue {
    match value {
        toml::Value::String(s) => JsonValue::String(s),
        toml::Value::Integer(i) => JsonValue::from(i),
        toml::Value::Float(f) => float_value(f),
        toml::Value::Boolean(b) => JsonValue::Bool(b),
        toml::Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        toml::Value::Array(items) => {
            JsonValue::Array(items.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension_is_case_insensitive() {
        assert_eq!(Format::from_extension("YML"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("Json"), Some(Format::Json));
        assert_eq!(Format::from_extension("toml"), Some(Format::Toml));
        assert_eq!(Format::from_extension("hcl"), None);
        assert_eq!(".yaml".parse::<Format>().unwrap(), Format::Yaml);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Format::from_path(Path::new("list.hcl")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { ref extension } if extension == "hcl"));
    }

    #[test]
    fn test_yaml_keys_are_stringified() {
        let tree = Format::Yaml
            .parse("ports:\n  80: http\n  true: yes\nname: ~\n", "test")
            .unwrap();
        assert_eq!(
            JsonValue::Object(tree),
            json!({"ports": {"80": "http", "true": "yes"}, "name": null})
        );
    }

    #[test]
    fn test_empty_documents_are_empty_maps() {
        assert!(Format::Yaml.parse("", "test").unwrap().is_empty());
        assert!(Format::Toml.parse("", "test").unwrap().is_empty());
        assert!(Format::Json.parse("null", "test").unwrap().is_empty());
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = Format::Yaml.parse("- a\n- b\n", "list.yaml").unwrap_err();
        assert!(err.to_string().contains("top-level value must be a mapping"));
        assert!(err.to_string().contains("list.yaml"));
    }

    #[test]
    fn test_toml_datetimes_become_strings() {
        let tree = Format::Toml
            .parse("when = 2020-01-01T00:00:00Z\n[server]\nport = 80\n", "test")
            .unwrap();
        assert_eq!(tree["when"], json!("2020-01-01T00:00:00Z"));
        assert_eq!(tree["server"]["port"], json!(80));
    }

    #[test]
    fn test_malformed_documents_report_origin() {
        let err = Format::Json.parse("{", "bad.json").unwrap_err();
        match err {
            ConfigError::Parse { origin, .. } => assert_eq!(origin, "bad.json"),
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn test_find_file_searches_dirs_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(second.path().join("config.yaml"), "a: 1\n").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let found = find_file("config.yaml", &dirs).unwrap();
        assert_eq!(found, second.path().join("config.yaml"));

        fs::write(first.path().join("config.yaml"), "a: 2\n").unwrap();
        let found = find_file("config.yaml", &dirs).unwrap();
        assert_eq!(found, first.path().join("config.yaml"));
    }

    #[test]
    fn test_find_file_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("config.yaml")).unwrap();
        let err = find_file("config.yaml", &[dir.path().to_path_buf()]).unwrap_err();
        assert!(err.is_file_not_found());
    }
}
