//! Per-field policy resolution.
//!
//! Responsibilities:
//! - Overlay environment values onto decoded leaves.
//! - Enforce `required` and inject `default` values.
//! - Aggregate failures into `FieldErrors`, keyed by field path.
//!
//! Does NOT handle:
//! - Walking records into leaves (see `field/walker.rs`).
//! - Parsing raw strings (see `coerce`).
//!
//! Invariants:
//! - Each leaf is resolved in a fixed order (conflict, environment, required,
//!   default) and stops at its first failure; other leaves still resolve.
//! - An environment value, when present, always replaces the decoded value.
//! - Boolean leaves never accept a default: `false` is indistinguishable from
//!   unset and would always be overwritten.
//! - Leaves sharing a path (flattened records with clashing names) are not
//!   resolved; the path is reported as a `Duplicate` error instead.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::coerce::{CoerceError, Coercer};
use crate::env::{format_env_key, lookup};
use crate::field::{Leaf, Policy};

/// Why a single field failed to resolve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field cannot have both a required validation and a default value")]
    Conflict,

    #[error("unable to set from env: {detail} (from {key})")]
    Env { key: String, detail: String },

    #[error("required validation failed")]
    Required,

    #[error("unable to set default: {detail}")]
    Default { detail: String },

    #[error("field path is shared by {count} fields")]
    Duplicate { count: usize },
}

/// Field errors of one load, keyed and ordered by field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, error: FieldError) {
        self.0.insert(path.into(), error);
    }

    /// Error recorded for `path`.
    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.0.iter().map(|(path, error)| (path.as_str(), error))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, error)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{path}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Applies policies to leaves.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'c> {
    coercer: &'c Coercer,
    env_prefix: Option<&'c str>,
}

impl<'c> Resolver<'c> {
    /// Resolver that ignores the environment.
    pub fn new(coercer: &'c Coercer) -> Self {
        Self {
            coercer,
            env_prefix: None,
        }
    }

    /// Overlay environment variables, keyed with `prefix` (may be empty).
    pub fn with_env(mut self, prefix: &'c str) -> Self {
        self.env_prefix = Some(prefix);
        self
    }

    /// Resolve one leaf.
    pub fn resolve_leaf(&self, leaf: &mut Leaf<'_>) -> Result<(), FieldError> {
        if matches!(leaf.policy, Policy::Conflict { .. }) {
            return Err(FieldError::Conflict);
        }

        if let Some(prefix) = self.env_prefix {
            self.overlay_env(leaf, prefix)?;
        }

        match leaf.policy.clone() {
            Policy::Required if !leaf.slot.is_set() => Err(FieldError::Required),
            Policy::Default(value) => self.apply_default(leaf, &value),
            _ => Ok(()),
        }
    }

    fn overlay_env(&self, leaf: &mut Leaf<'_>, prefix: &str) -> Result<(), FieldError> {
        let key = format_env_key(&leaf.path.to_string(), prefix);
        let value = lookup(&key).map_err(|err| FieldError::Env {
            key: key.clone(),
            detail: err.to_string(),
        })?;
        let Some(value) = value else {
            return Ok(());
        };

        trace!(path = %leaf.path, %key, "overlaying environment value");
        leaf.slot
            .assign(&value, self.coercer)
            .map_err(|err| FieldError::Env {
                key,
                detail: err.to_string(),
            })
    }

    fn apply_default(&self, leaf: &mut Leaf<'_>, value: &str) -> Result<(), FieldError> {
        let kind = leaf.slot.kind();
        if kind.is_boolean() {
            return Err(FieldError::Default {
                detail: CoerceError::Unsupported { kind }.to_string(),
            });
        }
        if leaf.slot.is_set() {
            return Ok(());
        }

        trace!(path = %leaf.path, default = value, "applying default");
        leaf.slot
            .assign(value, self.coercer)
            .map_err(|err| FieldError::Default {
                detail: err.to_string(),
            })
    }

    /// Resolve every leaf, collecting all failures.
    pub fn resolve_all(&self, leaves: Vec<Leaf<'_>>) -> Result<(), FieldErrors> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for leaf in &leaves {
            *counts.entry(leaf.path.to_string()).or_default() += 1;
        }

        let mut errors = FieldErrors::new();
        for mut leaf in leaves {
            let path = leaf.path.to_string();
            if let Some(&count) = counts.get(&path).filter(|&&count| count > 1) {
                trace!(%path, count, "field path is ambiguous");
                errors.insert(path, FieldError::Duplicate { count });
                continue;
            }
            if let Err(err) = self.resolve_leaf(&mut leaf) {
                trace!(path = %leaf.path, error = %err, "field failed to resolve");
                errors.insert(leaf.path.to_string(), err);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
