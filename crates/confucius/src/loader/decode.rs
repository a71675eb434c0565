//! Weakly typed decode of an untyped tree into a record.
//!
//! Responsibilities:
//! - Carry the decode state (active tag, coercer, current path) through
//!   `Field::decode` calls.
//! - Provide the scalar and mapping decode rules used by the `Field` impls.
//!
//! Does NOT handle:
//! - Substituting `${NAME}` references (done on the tree beforehand, see
//!   `env.rs`).
//! - Required / default policies (see `policy.rs`).
//!
//! Invariants:
//! - Scalars are rendered as strings and coerced exactly like environment
//!   values, so `"8080"` and `8080` decode identically.
//! - `null` and absent keys never modify the destination.
//! - Any failure aborts the whole decode with the path of the offending node.

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::Tree;
use crate::coerce::Coercer;
use crate::field::{Config, Field, FieldPath, PathSegment, Segment};

/// A tree node could not be decoded into its destination.
#[derive(Error, Debug)]
#[error("cannot decode {}: {message}", location(.path))]
pub struct DecodeError {
    pub path: FieldPath,
    pub message: String,
}

fn location(path: &FieldPath) -> String {
    if path.is_root() {
        "configuration".to_string()
    } else {
        format!("`{path}`")
    }
}

/// State threaded through one decode.
pub struct DecodeContext<'c> {
    tag: &'c str,
    coercer: &'c Coercer,
    path: FieldPath,
}

impl<'c> DecodeContext<'c> {
    pub fn new(tag: &'c str, coercer: &'c Coercer) -> Self {
        Self {
            tag,
            coercer,
            path: FieldPath::root(),
        }
    }

    pub fn tag(&self) -> &'c str {
        self.tag
    }

    pub fn coercer(&self) -> &'c Coercer {
        self.coercer
    }

    /// Path of the node being decoded.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Error located at the current path.
    pub fn error(&self, message: impl Into<String>) -> DecodeError {
        DecodeError {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    /// Decode the entry for one record field out of `map`.
    ///
    /// Promoted (flattened) fields read their own keys from the same map.
    pub fn field<F: Field>(
        &mut self,
        map: &Tree,
        segment: &Segment,
        value: &mut F,
    ) -> Result<(), DecodeError> {
        if segment.is_promoted(self.tag) {
            return value.decode_map(map, self);
        }

        let name = segment.name(self.tag);
        let Some(node) = lookup(map, name) else {
            return Ok(());
        };

        self.path.push(PathSegment::Name(name.to_string()));
        let result = value.decode(node, self);
        self.path.pop();
        result
    }

    /// Decode one sequence element.
    pub fn element<F: Field>(
        &mut self,
        index: usize,
        node: &JsonValue,
        value: &mut F,
    ) -> Result<(), DecodeError> {
        self.path.push(PathSegment::Index(index));
        let result = value.decode(node, self);
        self.path.pop();
        result
    }
}

/// Find `name` in `map`, falling back to a case-insensitive match.
fn lookup<'m>(map: &'m Tree, name: &str) -> Option<&'m JsonValue> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Short description of a node's shape for error messages.
pub fn describe(node: &JsonValue) -> &'static str {
    match node {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "sequence",
        JsonValue::Object(_) => "mapping",
    }
}

/// Render a scalar node as the string a coercion would receive.
pub fn render_scalar(node: &JsonValue) -> String {
    match node {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Decode a scalar node by coercing its string rendering.
pub fn decode_scalar<F: Field>(
    value: &mut F,
    node: &JsonValue,
    cx: &mut DecodeContext<'_>,
) -> Result<(), DecodeError> {
    match node {
        JsonValue::Null => Ok(()),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(cx.error(format!(
            "expected {}, found {}",
            F::kind(),
            describe(node)
        ))),
        scalar => {
            let raw = render_scalar(scalar);
            *value = F::parse(&raw, cx.coercer()).map_err(|e| cx.error(e.to_string()))?;
            Ok(())
        }
    }
}

/// Decode a mapping node into a record's fields.
pub fn decode_mapping<F: Field>(
    value: &mut F,
    node: &JsonValue,
    cx: &mut DecodeContext<'_>,
) -> Result<(), DecodeError> {
    match node {
        JsonValue::Null => Ok(()),
        JsonValue::Object(map) => value.decode_map(map, cx),
        other => Err(cx.error(format!(
            "expected a mapping for {}, found {}",
            F::kind(),
            describe(other)
        ))),
    }
}

/// Decode a whole tree into `cfg`.
pub fn decode_record<T: Config>(
    tree: &Tree,
    cfg: &mut T,
    tag: &str,
    coercer: &Coercer,
) -> Result<(), DecodeError> {
    let mut cx = DecodeContext::new(tag, coercer);
    cfg.decode_map(tree, &mut cx)
}
