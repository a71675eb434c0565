//! Sequence literal parsing.
//!
//! Grammar: an optional enclosing `[` `]`, elements separated by `,`, each
//! element trimmed of surrounding whitespace. Empty elements between commas
//! are kept and coerced like any other element. There is no escaping of the
//! comma inside an element.

use super::{CoerceError, Coercer};
use crate::field::Field;

/// Split a sequence literal into its trimmed element strings.
///
/// A literal that is empty once the brackets are removed yields no elements.
pub fn split_literal(raw: &str) -> Vec<&str> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    if inner.trim().is_empty() {
        return Vec::new();
    }
    inner.split(',').map(str::trim).collect()
}

/// Coerce every element of a sequence literal into `T`.
///
/// The first failing element fails the whole sequence.
pub fn parse_sequence<T: Field>(raw: &str, coercer: &Coercer) -> Result<Vec<T>, CoerceError> {
    split_literal(raw)
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            T::parse(element, coercer).map_err(|source| CoerceError::Element {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}
