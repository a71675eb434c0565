//! Procedural macros for confucius configuration records.
//!
//! This crate provides:
//!
//! - `#[derive(Config)]` - Generates the field table a record needs to be
//!   decoded, walked and loaded by `confucius::ConfigLoader`
//!
//! The macro is re-exported as `confucius::Config`; depend on `confucius`
//! rather than on this crate directly.

mod config;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `confucius::Field` and `confucius::Config` for a struct with named
/// fields.
///
/// Every field type must implement `confucius::Field`, and the struct must
/// implement `Default`.
///
/// # Field attributes
///
/// - `#[conf(name = "...")]` - Alt name for the default `conf` tag
/// - `#[conf(tag(yaml = "...", json = "..."))]` - Alt names for other tag keys
/// - `#[conf(required)]` / `#[conf(validate = "required")]` - Fail the load
///   when the field is unset after decoding and environment overlay
/// - `#[conf(default = "...")]` - Literal coerced into the field when unset
/// - `#[conf(flatten)]` - Promote the field's own fields into this record
/// - `#[conf(skip)]` - Ignore the field entirely
///
/// # Example
///
/// ```rust,ignore
/// use confucius::Config;
///
/// #[derive(Debug, Default, Config)]
/// pub struct Database {
///     #[conf(name = "host", required)]
///     pub host: String,
///     #[conf(name = "port", default = "5432")]
///     pub port: u16,
///     #[conf(tag(yaml = "poolSize"))]
///     pub pool_size: Option<u32>,
/// }
/// ```
#[proc_macro_derive(Config, attributes(conf))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match config::derive_config(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
