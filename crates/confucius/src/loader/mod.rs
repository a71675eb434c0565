//! Configuration loader for files, profiles, literals and environment variables.
//!
//! Responsibilities:
//! - Locate and parse the primary file and its profile overlays.
//! - Merge all sources into one untyped tree and decode it into a record.
//! - Run the policy resolver over the decoded record.
//!
//! Does NOT handle:
//! - Describing records (see `field`).
//! - Parsing individual values (see `coerce`).
//!
//! Invariants / Assumptions:
//! - Sources are layered from least to most authoritative: literal, file,
//!   profiles in order, then environment variables.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

mod builder;
pub mod decode;
mod error;
pub mod merge;
pub mod profile;
pub mod source;

#[cfg(test)]
mod tests;

use serde_json::{Map, Value as JsonValue};

pub use builder::ConfigLoader;
pub use decode::{DecodeContext, DecodeError};
pub use error::ConfigError;
pub use merge::MergeError;
pub use source::Format;

/// Untyped document tree: the top-level mapping of a parsed source.
pub type Tree = Map<String, JsonValue>;
