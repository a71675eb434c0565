//! Type-directed string coercion.
//!
//! Responsibilities:
//! - Convert one raw string into one destination leaf's native type.
//! - Hold the settings coercion depends on (the timestamp layout).
//! - Describe every coercion failure with the offending value.
//!
//! Does NOT handle:
//! - Deciding *when* a value is coerced (see `policy.rs`).
//! - Locating the destination inside a record (see `field/walker.rs`).
//!
//! Invariants:
//! - Coercion is purely syntactic; the origin of the string (file, default
//!   literal, environment) never changes how it is parsed.
//! - A failed coercion never mutates the destination: values are parsed into a
//!   fresh value first and only assigned on success.

pub mod duration;
pub mod sequence;
pub mod timestamp;

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::field::Kind;
pub use timestamp::TimeLayout;

/// Errors produced while converting a raw string into a field's type.
#[derive(Error, Debug)]
pub enum CoerceError {
    #[error("invalid boolean {value:?}")]
    Bool { value: String },

    #[error("invalid integer {value:?}: {source}")]
    Int {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("negative value {value:?} for an unsigned field")]
    Negative { value: String },

    #[error("invalid float {value:?}: {source}")]
    Float {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("invalid duration {value:?}: {reason}")]
    Duration { value: String, reason: String },

    #[error("invalid timestamp {value:?} for layout {layout}: {source}")]
    Timestamp {
        value: String,
        layout: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unsupported type: {kind}")]
    Unsupported { kind: Kind },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<CoerceError>,
    },
}

/// Settings shared by every coercion of one load.
#[derive(Debug, Clone, Default)]
pub struct Coercer {
    time_layout: TimeLayout,
}

impl Coercer {
    pub fn new(time_layout: TimeLayout) -> Self {
        Self { time_layout }
    }

    /// Layout used for timestamp fields.
    pub fn time_layout(&self) -> &TimeLayout {
        &self.time_layout
    }
}

/// Parse a boolean literal.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts.
pub fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoerceError::Bool {
            value: raw.to_string(),
        }),
    }
}

/// Reject literals with a leading minus before an unsigned parse.
pub(crate) fn ensure_unsigned(raw: &str) -> Result<(), CoerceError> {
    if raw.starts_with('-') {
        return Err(CoerceError::Negative {
            value: raw.to_string(),
        });
    }
    Ok(())
}
