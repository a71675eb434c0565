//! Deep merge of untyped trees.
//!
//! Invariants:
//! - Mappings merge key by key, recursively; any other value from `src`
//!   replaces the value in `dst` (sequences are replaced, not concatenated).
//! - A `null` in `src` never clobbers; a `null` in `dst` is always replaced.
//! - Two non-null values of different shapes at the same key are an error.

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::Tree;
use super::decode::describe;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("cannot merge {incoming} into {existing} at `{path}`")]
    TypeMismatch {
        path: String,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Merge `src` into `dst`; `src` wins on conflicts.
pub fn merge_into(dst: &mut Tree, src: Tree) -> Result<(), MergeError> {
    merge_maps(dst, src, "")
}

fn merge_maps(dst: &mut Tree, src: Tree, prefix: &str) -> Result<(), MergeError> {
    for (key, incoming) in src {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let Some(existing) = dst.get_mut(&key) else {
            if !incoming.is_null() {
                dst.insert(key, incoming);
            }
            continue;
        };

        match (existing, incoming) {
            (_, JsonValue::Null) => {}
            (JsonValue::Object(existing), JsonValue::Object(incoming)) => {
                merge_maps(existing, incoming, &path)?;
            }
            (existing, incoming)
                if existing.is_null() || describe(existing) == describe(&incoming) =>
            {
                *existing = incoming;
            }
            (existing, incoming) => {
                return Err(MergeError::TypeMismatch {
                    path,
                    existing: describe(existing),
                    incoming: describe(&incoming),
                });
            }
        }
    }
    Ok(())
}
