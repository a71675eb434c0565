//! Layered configuration loading into typed records.
//!
//! A record is a struct deriving [`Config`]. Loading reads a YAML, JSON or
//! TOML file, overlays profile files, decodes the result into the record, and
//! then applies environment variables, `required` checks and `default` values
//! field by field.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! #[derive(Debug, Default, confucius::Config)]
//! struct Server {
//!     #[conf(name = "host", required)]
//!     host: String,
//!     #[conf(name = "port", default = "8080")]
//!     port: u16,
//!     #[conf(name = "timeout", default = "30s")]
//!     timeout: Duration,
//! }
//!
//! let mut server = Server::default();
//! confucius::ConfigLoader::new()
//!     .with_file("server.yaml")
//!     .with_env("app")
//!     .load(&mut server)?;
//! # Ok::<(), confucius::ConfigError>(())
//! ```

extern crate self as confucius;

pub mod coerce;
pub mod constants;
pub mod env;
pub mod field;
pub mod loader;
pub mod policy;

pub use coerce::{CoerceError, Coercer, TimeLayout};
pub use confucius_derive::Config;
pub use env::{SubstitutionError, format_env_key};
pub use field::{Config, Field, FieldPath, Kind, Leaf, Policy, Segment, Slot, Walker, walk};
pub use loader::{
    ConfigError, ConfigLoader, DecodeContext, DecodeError, Format, MergeError, Tree,
};
pub use policy::{FieldError, FieldErrors};

/// Load `config.yaml` from the working directory into `cfg`.
///
/// Shorthand for `ConfigLoader::new().load(cfg)`.
pub fn load<T: Config>(cfg: &mut T) -> Result<(), ConfigError> {
    ConfigLoader::new().load(cfg)
}

#[doc(hidden)]
pub mod __private {
    pub use crate::coerce::{CoerceError, Coercer};
    pub use crate::field::{Config, Field, FieldPath, Kind, Policy, Segment, Walker};
    pub use crate::loader::decode::decode_mapping;
    pub use crate::loader::{DecodeContext, DecodeError, Tree};
    pub use serde_json::Value as JsonValue;
}
