//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for every stage of a load.
//! - Keep "file not found" distinguishable from all other failures.
//!
//! Does NOT handle:
//! - Per-field policy errors (see `policy.rs`; they are wrapped here).
//! - Coercion errors (see `coerce`).
//!
//! Invariants:
//! - All error variants include context for debugging (file names, paths, searched dirs).
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use super::decode::DecodeError;
use super::merge::MergeError;
use crate::env::SubstitutionError;
use crate::policy::FieldErrors;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No searched directory contains the file.
    ///
    /// Callers can match on this (or use [`ConfigError::is_file_not_found`])
    /// to fall back to another configuration source.
    #[error("{name}: file not found (searched: {})", display_dirs(.searched))]
    FileNotFound { name: String, searched: Vec<PathBuf> },

    #[error("unsupported file extension {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read config file at {path}: {source}")]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read configuration from reader: {0}")]
    ReaderRead(#[source] std::io::Error),

    #[error("Failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Substitution(#[from] SubstitutionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Fields(#[from] FieldErrors),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    /// Whether this is the "file not found" sentinel.
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, ConfigError::FileNotFound { .. })
    }

    /// Per-field errors, when the load failed on policies.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ConfigError::Fields(errors) => Some(errors),
            _ => None,
        }
    }
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
