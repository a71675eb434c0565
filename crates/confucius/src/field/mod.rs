//! Field descriptions for configuration records.
//!
//! Responsibilities:
//! - Define the `Field` trait every configurable type implements (leaf types
//!   here, records through `#[derive(Config)]`).
//! - Classify destinations into a closed set of coercion kinds.
//! - Describe the per-field policy declared by `required` / `default`.
//!
//! Does NOT handle:
//! - Applying policies (see `policy.rs`).
//! - Reading or merging files (see `loader`).
//!
//! Invariants:
//! - Types without a `Field` impl cannot appear in a record; unsupported
//!   destinations are rejected at compile time rather than during a load.
//! - Struct-like kinds are never valid targets of a single string coercion.

mod impls;
pub mod path;
pub mod walker;

use std::fmt;

use serde_json::Value as JsonValue;

use crate::coerce::{CoerceError, Coercer};
use crate::loader::decode::{self, DecodeContext, DecodeError};
use crate::loader::Tree;
pub use path::{FieldPath, PathSegment};
pub use walker::{Leaf, Slot, Walker, walk};

/// Coercion target kind of a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    String,
    Duration,
    Timestamp,
    Pointer(Box<Kind>),
    Sequence(Box<Kind>),
    /// A record traversed field by field.
    Struct(&'static str),
    /// A destination that can hold decoded data but never a coerced string.
    Unsupported(&'static str),
}

impl Kind {
    /// Whether the kind holds a record somewhere inside it.
    ///
    /// Composite destinations are traversed by the walker instead of being
    /// coerced as a whole.
    pub fn is_composite(&self) -> bool {
        match self {
            Kind::Struct(_) => true,
            Kind::Pointer(inner) | Kind::Sequence(inner) => inner.is_composite(),
            _ => false,
        }
    }

    /// Whether the kind is a boolean, directly or behind an `Option`.
    pub fn is_boolean(&self) -> bool {
        match self {
            Kind::Bool => true,
            Kind::Pointer(inner) => inner.is_boolean(),
            _ => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("bool"),
            Kind::SignedInt => f.write_str("signed integer"),
            Kind::UnsignedInt => f.write_str("unsigned integer"),
            Kind::Float => f.write_str("float"),
            Kind::String => f.write_str("string"),
            Kind::Duration => f.write_str("duration"),
            Kind::Timestamp => f.write_str("timestamp"),
            Kind::Pointer(inner) => write!(f, "optional {inner}"),
            Kind::Sequence(inner) => write!(f, "sequence of {inner}"),
            Kind::Struct(name) => write!(f, "struct {name}"),
            Kind::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Policy declared on a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Policy {
    #[default]
    None,
    Required,
    Default(String),
    /// Both `required` and `default` were declared; always rejected.
    Conflict { default: String },
}

impl Policy {
    /// Build the policy from the two independent annotations.
    pub fn from_annotations(required: bool, default: Option<&str>) -> Self {
        match (required, default) {
            (false, None) => Policy::None,
            (true, None) => Policy::Required,
            (false, Some(value)) => Policy::Default(value.to_string()),
            (true, Some(value)) => Policy::Conflict {
                default: value.to_string(),
            },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Policy::None)
    }
}

/// Static description of one record field, generated by `#[derive(Config)]`.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// Field name as declared in the struct.
    pub ident: &'static str,
    /// Alt names as `(tag, name)` pairs.
    pub names: &'static [(&'static str, &'static str)],
    /// Children are promoted into the parent path unless an alt name applies.
    pub flatten: bool,
}

impl Segment {
    /// Alt name declared for `tag`, ignoring empty names.
    pub fn alt_name(&self, tag: &str) -> Option<&'static str> {
        self.names
            .iter()
            .find(|(key, name)| *key == tag && !name.is_empty())
            .map(|(_, name)| *name)
    }

    /// Path segment used for this field under `tag`.
    pub fn name(&self, tag: &str) -> &'static str {
        self.alt_name(tag).unwrap_or(self.ident)
    }

    /// Whether the field's children share the parent's path under `tag`.
    pub fn is_promoted(&self, tag: &str) -> bool {
        self.flatten && self.alt_name(tag).is_none()
    }
}

/// A type that can live in a configuration record.
///
/// Leaf types implement `kind`, `parse` and `is_set`; records derived with
/// `#[derive(Config)]` additionally override `decode`, `decode_map` and
/// `visit` to recurse into their fields.
pub trait Field: Default + 'static {
    /// Coercion kind of this type.
    fn kind() -> Kind;

    /// Parse a raw string into a fresh value.
    fn parse(raw: &str, coercer: &Coercer) -> Result<Self, CoerceError>;

    /// Whether the value counts as set for `required` / `default` purposes.
    fn is_set(&self) -> bool;

    /// Whether a `Some` holding this value counts as set.
    ///
    /// Pointers normally defer to the pointee; timestamps override this so an
    /// explicitly supplied instant is never mistaken for a missing one.
    fn is_set_behind_pointer(&self) -> bool {
        self.is_set()
    }

    /// Decode an untyped tree node into this value.
    ///
    /// Scalars are rendered as strings and coerced; `null` leaves the value
    /// untouched.
    fn decode(&mut self, node: &JsonValue, cx: &mut DecodeContext<'_>) -> Result<(), DecodeError> {
        decode::decode_scalar(self, node, cx)
    }

    /// Decode the entries of a mapping directly into this value's fields.
    ///
    /// Only records support this; it backs `#[conf(flatten)]`.
    fn decode_map(&mut self, _map: &Tree, cx: &mut DecodeContext<'_>) -> Result<(), DecodeError> {
        Err(cx.error(format!("{} cannot be flattened", Self::kind())))
    }

    /// Report this value's leaves to the walker.
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>, path: &FieldPath, policy: Policy) {
        walker.leaf(path, policy, self);
    }
}

/// Marker for records that can be loaded as a whole.
///
/// Implemented by `#[derive(Config)]`; `ConfigLoader::load` only accepts
/// types implementing it, so a load target is always a record.
pub trait Config: Field {}

/// Object-safe view of a leaf used by the policy resolver.
pub trait Assign {
    /// Coercion kind of the destination.
    fn target_kind(&self) -> Kind;

    /// Whether the destination currently holds a value.
    fn has_value(&self) -> bool;

    /// Replace the destination with `raw` coerced into its type.
    fn assign(&mut self, raw: &str, coercer: &Coercer) -> Result<(), CoerceError>;
}

impl<T: Field> Assign for T {
    fn target_kind(&self) -> Kind {
        T::kind()
    }

    fn has_value(&self) -> bool {
        self.is_set()
    }

    fn assign(&mut self, raw: &str, coercer: &Coercer) -> Result<(), CoerceError> {
        *self = T::parse(raw, coercer)?;
        Ok(())
    }
}
