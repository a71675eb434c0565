//! Profile overlay file names.
//!
//! A profile layout is a template file name in which the tokens `config`,
//! `test` and `yaml` stand for the primary file's stem, the profile name and
//! the primary file's extension. The default layout `config.test.yaml` turns
//! `server.json` with profile `prod` into `server.prod.json`.

use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::source::find_file;
use crate::constants::{PROFILE_TOKEN_BASE, PROFILE_TOKEN_EXTENSION, PROFILE_TOKEN_PROFILE};

/// Build the overlay file name for `profile`.
///
/// Tokens are replaced in a single left-to-right pass, so a substituted value
/// that happens to contain another token is never replaced again.
pub fn profile_filename(layout: &str, filename: &str, profile: &str) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let replacements = [
        (PROFILE_TOKEN_BASE, stem),
        (PROFILE_TOKEN_PROFILE, profile),
        (PROFILE_TOKEN_EXTENSION, extension),
    ];

    let mut out = String::with_capacity(layout.len() + profile.len());
    let mut rest = layout;
    'scan: while let Some(ch) = rest.chars().next() {
        for (token, value) in replacements {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(value);
                rest = tail;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Locate the overlay file for `profile` in `dirs`.
///
/// A missing overlay is always an error, even when the primary file is
/// optional.
pub fn find_profile_file(
    layout: &str,
    filename: &str,
    profile: &str,
    dirs: &[PathBuf],
) -> Result<PathBuf, ConfigError> {
    find_file(&profile_filename(layout, filename, profile), dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_PROFILE_LAYOUT;

    #[test]
    fn test_default_layout() {
        assert_eq!(
            profile_filename(DEFAULT_PROFILE_LAYOUT, "config.yaml", "test"),
            "config.test.yaml"
        );
        assert_eq!(
            profile_filename(DEFAULT_PROFILE_LAYOUT, "server.json", "prod"),
            "server.prod.json"
        );
    }

    #[test]
    fn test_custom_layout() {
        assert_eq!(
            profile_filename("config-test.yaml", "server.toml", "dev"),
            "server-dev.toml"
        );
        assert_eq!(
            profile_filename("test/config.yaml", "app.yml", "staging"),
            "staging/app.yml"
        );
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        assert_eq!(
            profile_filename(DEFAULT_PROFILE_LAYOUT, "config.yaml", "yaml"),
            "config.yaml.yaml"
        );
        assert_eq!(
            profile_filename(DEFAULT_PROFILE_LAYOUT, "test.yaml", "config"),
            "test.config.yaml"
        );
    }

    #[test]
    fn test_missing_profile_is_file_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = find_profile_file(
            DEFAULT_PROFILE_LAYOUT,
            "config.yaml",
            "prod",
            &[dir.path().to_path_buf()],
        )
        .unwrap_err();
        match err {
            ConfigError::FileNotFound { name, .. } => assert_eq!(name, "config.prod.yaml"),
            other => panic!("expected FileNotFound, got {other}"),
        }
    }
}
