//! `Field` implementations for leaf types, `Option` and `Vec`.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use super::{Field, FieldPath, Kind, Policy, Walker};
use crate::coerce::duration::parse_duration;
use crate::coerce::sequence::parse_sequence;
use crate::coerce::{CoerceError, Coercer, ensure_unsigned, parse_bool};
use crate::loader::decode::{DecodeContext, DecodeError, describe, render_scalar};

macro_rules! signed_fields {
    ($($ty:ty),* $(,)?) => {$(
        impl Field for $ty {
            fn kind() -> Kind {
                Kind::SignedInt
            }

            fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
                raw.parse::<$ty>().map_err(|source| CoerceError::Int {
                    value: raw.to_string(),
                    source,
                })
            }

            fn is_set(&self) -> bool {
                *self != 0
            }
        }
    )*};
}

macro_rules! unsigned_fields {
    ($($ty:ty),* $(,)?) => {$(
        impl Field for $ty {
            fn kind() -> Kind {
                Kind::UnsignedInt
            }

            fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
                ensure_unsigned(raw)?;
                raw.parse::<$ty>().map_err(|source| CoerceError::Int {
                    value: raw.to_string(),
                    source,
                })
            }

            fn is_set(&self) -> bool {
                *self != 0
            }
        }
    )*};
}

signed_fields!(i8, i16, i32, i64, i128, isize);
unsigned_fields!(u8, u16, u32, u64, u128, usize);

fn parse_float(raw: &str) -> Result<f64, CoerceError> {
    raw.parse::<f64>().map_err(|source| CoerceError::Float {
        value: raw.to_string(),
        source,
    })
}

impl Field for f64 {
    fn kind() -> Kind {
        Kind::Float
    }

    fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
        parse_float(raw)
    }

    fn is_set(&self) -> bool {
        *self != 0.0
    }
}

impl Field for f32 {
    fn kind() -> Kind {
        Kind::Float
    }

    fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
        parse_float(raw).map(|value| value as f32)
    }

    fn is_set(&self) -> bool {
        *self != 0.0
    }
}

impl Field for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
        parse_bool(raw)
    }

    fn is_set(&self) -> bool {
        *self
    }
}

impl Field for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
        Ok(raw.to_string())
    }

    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl Field for PathBuf {
    fn kind() -> Kind {
        Kind::String
    }

    fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
        Ok(PathBuf::from(raw))
    }

    fn is_set(&self) -> bool {
        !self.as_os_str().is_empty()
    }
}

impl Field for Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn parse(raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
        parse_duration(raw)
    }

    fn is_set(&self) -> bool {
        !self.is_zero()
    }
}

/// The zero instant is `DateTime::<Utc>::default()`, the Unix epoch.
impl Field for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn parse(raw: &str, coercer: &Coercer) -> Result<Self, CoerceError> {
        let layout = coercer.time_layout();
        layout
            .parse(raw)
            .map_err(|source| CoerceError::Timestamp {
                value: raw.to_string(),
                layout: layout.to_string(),
                source,
            })
    }

    fn is_set(&self) -> bool {
        *self != DateTime::<Utc>::default()
    }

    fn is_set_behind_pointer(&self) -> bool {
        true
    }
}

/// Untyped destination: receives decoded data verbatim, never a coerced string.
impl Field for JsonValue {
    fn kind() -> Kind {
        Kind::Unsupported("untyped value")
    }

    fn parse(_raw: &str, _coercer: &Coercer) -> Result<Self, CoerceError> {
        Err(CoerceError::Unsupported { kind: Self::kind() })
    }

    fn is_set(&self) -> bool {
        !self.is_null()
    }

    fn decode(&mut self, node: &JsonValue, _cx: &mut DecodeContext<'_>) -> Result<(), DecodeError> {
        *self = node.clone();
        Ok(())
    }
}

impl<T: Field> Field for Option<T> {
    fn kind() -> Kind {
        Kind::Pointer(Box::new(T::kind()))
    }

    fn parse(raw: &str, coercer: &Coercer) -> Result<Self, CoerceError> {
        T::parse(raw, coercer).map(Some)
    }

    /// `Some` counts as set when the pointee does; records and timestamps
    /// always do.
    fn is_set(&self) -> bool {
        self.as_ref().is_some_and(Field::is_set_behind_pointer)
    }

    fn decode(&mut self, node: &JsonValue, cx: &mut DecodeContext<'_>) -> Result<(), DecodeError> {
        if node.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = self.take().unwrap_or_default();
        inner.decode(node, cx)?;
        *self = Some(inner);
        Ok(())
    }

    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>, path: &FieldPath, policy: Policy) {
        if !T::kind().is_composite() {
            walker.leaf(path, policy, self);
            return;
        }
        let set = self.is_some();
        walker.composite(path, policy, Self::kind(), set);
        if let Some(inner) = self {
            inner.visit(walker, path, Policy::None);
        }
    }
}

impl<T: Field> Field for Vec<T> {
    fn kind() -> Kind {
        Kind::Sequence(Box::new(T::kind()))
    }

    fn parse(raw: &str, coercer: &Coercer) -> Result<Self, CoerceError> {
        parse_sequence(raw, coercer)
    }

    fn is_set(&self) -> bool {
        !self.is_empty()
    }

    fn decode(&mut self, node: &JsonValue, cx: &mut DecodeContext<'_>) -> Result<(), DecodeError> {
        match node {
            JsonValue::Null => Ok(()),
            JsonValue::Array(items) => {
                let mut decoded = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mut element = T::default();
                    cx.element(index, item, &mut element)?;
                    decoded.push(element);
                }
                *self = decoded;
                Ok(())
            }
            JsonValue::Object(_) => Err(cx.error(format!(
                "expected {}, found {}",
                Self::kind(),
                describe(node)
            ))),
            scalar => {
                let raw = render_scalar(scalar);
                *self = parse_sequence(&raw, cx.coercer()).map_err(|e| cx.error(e.to_string()))?;
                Ok(())
            }
        }
    }

    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>, path: &FieldPath, policy: Policy) {
        if !T::kind().is_composite() {
            walker.leaf(path, policy, self);
            return;
        }
        let set = !self.is_empty();
        walker.composite(path, policy, Self::kind(), set);
        for (index, element) in self.iter_mut().enumerate() {
            element.visit(walker, &path.index(index), Policy::None);
        }
    }
}
