// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// The closed value variant. Replaces a deep virtual hierarchy of typed value
// classes with a single tagged union whose discriminant doubles as the wire
// tag (see the binary format in `codec::binary`).

use crate::error::{CodecResult, CoreError};
use crate::store::Store;

/// One of the sixteen payload shapes a [`Value`] can carry.
///
/// The tag table is a load-bearing wire contract: tag N below MUST stay the
/// discriminant index of variant N. Tags 8/9 are platform legacy aliases of
/// 6/7 — same in-memory representation, distinct wire tag, so a value built
/// with tag 8 still re-encodes under tag 8.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// Tag 0 — an absent value.
    Null,
    /// Tag 1.
    Bool(bool),
    /// Tag 2.
    Int16(i16),
    /// Tag 3.
    UInt16(u16),
    /// Tag 4.
    Int32(i32),
    /// Tag 5.
    UInt32(u32),
    /// Tag 6.
    Int64(i64),
    /// Tag 7.
    UInt64(u64),
    /// Tag 8 — legacy alias of `Int64`; same representation, distinct tag.
    Int64Alias(i64),
    /// Tag 9 — legacy alias of `UInt64`.
    UInt64Alias(u64),
    /// Tag 10.
    Float32(f32),
    /// Tag 11.
    Float64(f64),
    /// Tag 12 — raw octets.
    Bytes(Vec<u8>),
    /// Tag 13 — UTF-8 text.
    String(String),
    /// Tag 14 — a nested keyed store.
    Container(Store),
    /// Tag 15 — an ordered, heterogeneous sequence of values.
    Array(Vec<Value>),
}

/// Tag bytes for each [`ValueKind`] discriminant. Kept as named constants so
/// the binary codec and `tag()` never drift from the wire contract.
pub mod tag {
    /// Tag 0 — [`crate::value::ValueKind::Null`].
    pub const NULL: u8 = 0;
    /// Tag 1 — [`crate::value::ValueKind::Bool`].
    pub const BOOL: u8 = 1;
    /// Tag 2 — [`crate::value::ValueKind::Int16`].
    pub const INT16: u8 = 2;
    /// Tag 3 — [`crate::value::ValueKind::UInt16`].
    pub const UINT16: u8 = 3;
    /// Tag 4 — [`crate::value::ValueKind::Int32`].
    pub const INT32: u8 = 4;
    /// Tag 5 — [`crate::value::ValueKind::UInt32`].
    pub const UINT32: u8 = 5;
    /// Tag 6 — [`crate::value::ValueKind::Int64`].
    pub const INT64: u8 = 6;
    /// Tag 7 — [`crate::value::ValueKind::UInt64`].
    pub const UINT64: u8 = 7;
    /// Tag 8 — [`crate::value::ValueKind::Int64Alias`].
    pub const INT64_ALIAS: u8 = 8;
    /// Tag 9 — [`crate::value::ValueKind::UInt64Alias`].
    pub const UINT64_ALIAS: u8 = 9;
    /// Tag 10 — [`crate::value::ValueKind::Float32`].
    pub const FLOAT32: u8 = 10;
    /// Tag 11 — [`crate::value::ValueKind::Float64`].
    pub const FLOAT64: u8 = 11;
    /// Tag 12 — [`crate::value::ValueKind::Bytes`].
    pub const BYTES: u8 = 12;
    /// Tag 13 — [`crate::value::ValueKind::String`].
    pub const STRING: u8 = 13;
    /// Tag 14 — [`crate::value::ValueKind::Container`].
    pub const CONTAINER: u8 = 14;
    /// Tag 15 — [`crate::value::ValueKind::Array`].
    pub const ARRAY: u8 = 15;
    /// One past the highest valid tag; used to validate decoded tag bytes.
    pub const COUNT: u8 = 16;
}

impl ValueKind {
    /// The wire tag for this variant. Always equal to the discriminant index
    /// a value built with that tag would carry.
    pub fn tag(&self) -> u8 {
        match self {
            ValueKind::Null => tag::NULL,
            ValueKind::Bool(_) => tag::BOOL,
            ValueKind::Int16(_) => tag::INT16,
            ValueKind::UInt16(_) => tag::UINT16,
            ValueKind::Int32(_) => tag::INT32,
            ValueKind::UInt32(_) => tag::UINT32,
            ValueKind::Int64(_) => tag::INT64,
            ValueKind::UInt64(_) => tag::UINT64,
            ValueKind::Int64Alias(_) => tag::INT64_ALIAS,
            ValueKind::UInt64Alias(_) => tag::UINT64_ALIAS,
            ValueKind::Float32(_) => tag::FLOAT32,
            ValueKind::Float64(_) => tag::FLOAT64,
            ValueKind::Bytes(_) => tag::BYTES,
            ValueKind::String(_) => tag::STRING,
            ValueKind::Container(_) => tag::CONTAINER,
            ValueKind::Array(_) => tag::ARRAY,
        }
    }

    /// Textual kind name used by the JSON/XML codecs (`"int32"`, `"string"`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool(_) => "bool",
            ValueKind::Int16(_) => "int16",
            ValueKind::UInt16(_) => "uint16",
            ValueKind::Int32(_) => "int32",
            ValueKind::UInt32(_) => "uint32",
            ValueKind::Int64(_) => "int64",
            ValueKind::UInt64(_) => "uint64",
            ValueKind::Int64Alias(_) => "int64",
            ValueKind::UInt64Alias(_) => "uint64",
            ValueKind::Float32(_) => "float32",
            ValueKind::Float64(_) => "float64",
            ValueKind::Bytes(_) => "bytes",
            ValueKind::String(_) => "string",
            ValueKind::Container(_) => "container",
            ValueKind::Array(_) => "array",
        }
    }
}

/// A named, typed value: `(name, tag, payload)`.
///
/// Immutable once handed to a snapshot reader; mutable only while exclusively
/// held by a builder or by the writer path of a [`Store`]. Construction is
/// total over the closed kind set — there is one constructor per kind and no
/// throwing conversions; typed accessors return `None` on a kind mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    name: String,
    kind: ValueKind,
}

impl Value {
    /// Build a value of the given kind under `name`. Total for every
    /// constructible [`ValueKind`] — there is no way to build an ill-formed
    /// value through this constructor.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Tag 0: an absent value named `name`.
    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Null)
    }

    /// Tag 1.
    pub fn bool(name: impl Into<String>, v: bool) -> Self {
        Self::new(name, ValueKind::Bool(v))
    }

    /// Tag 2.
    pub fn i16(name: impl Into<String>, v: i16) -> Self {
        Self::new(name, ValueKind::Int16(v))
    }

    /// Tag 3.
    pub fn u16(name: impl Into<String>, v: u16) -> Self {
        Self::new(name, ValueKind::UInt16(v))
    }

    /// Tag 4.
    pub fn i32(name: impl Into<String>, v: i32) -> Self {
        Self::new(name, ValueKind::Int32(v))
    }

    /// Tag 5.
    pub fn u32(name: impl Into<String>, v: u32) -> Self {
        Self::new(name, ValueKind::UInt32(v))
    }

    /// Tag 6.
    pub fn i64(name: impl Into<String>, v: i64) -> Self {
        Self::new(name, ValueKind::Int64(v))
    }

    /// Tag 7.
    pub fn u64(name: impl Into<String>, v: u64) -> Self {
        Self::new(name, ValueKind::UInt64(v))
    }

    /// Tag 8 — legacy `long long` alias of [`Value::i64`].
    pub fn i64_alias(name: impl Into<String>, v: i64) -> Self {
        Self::new(name, ValueKind::Int64Alias(v))
    }

    /// Tag 9 — legacy alias of [`Value::u64`].
    pub fn u64_alias(name: impl Into<String>, v: u64) -> Self {
        Self::new(name, ValueKind::UInt64Alias(v))
    }

    /// Tag 10.
    pub fn f32(name: impl Into<String>, v: f32) -> Self {
        Self::new(name, ValueKind::Float32(v))
    }

    /// Tag 11.
    pub fn f64(name: impl Into<String>, v: f64) -> Self {
        Self::new(name, ValueKind::Float64(v))
    }

    /// Tag 12.
    pub fn bytes(name: impl Into<String>, v: impl Into<Vec<u8>>) -> Self {
        Self::new(name, ValueKind::Bytes(v.into()))
    }

    /// Tag 13.
    pub fn string(name: impl Into<String>, v: impl Into<String>) -> Self {
        Self::new(name, ValueKind::String(v.into()))
    }

    /// Tag 14.
    pub fn container(name: impl Into<String>, v: Store) -> Self {
        Self::new(name, ValueKind::Container(v))
    }

    /// Tag 15.
    pub fn array(name: impl Into<String>, v: Vec<Value>) -> Self {
        Self::new(name, ValueKind::Array(v))
    }

    /// The value's (immutable) name. Not unique within a store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wire tag — equal to the discriminant index of `kind()`.
    pub fn tag(&self) -> u8 {
        self.kind.tag()
    }

    /// Borrow the underlying variant.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Consume into the underlying variant.
    pub fn into_kind(self) -> ValueKind {
        self.kind
    }

    /// Typed accessor: `Some(v)` iff the stored kind is `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `Int16`.
    pub fn as_i16(&self) -> Option<i16> {
        match self.kind {
            ValueKind::Int16(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `UInt16`.
    pub fn as_u16(&self) -> Option<u16> {
        match self.kind {
            ValueKind::UInt16(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `Int32`.
    pub fn as_i32(&self) -> Option<i32> {
        match self.kind {
            ValueKind::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `UInt32`.
    pub fn as_u32(&self) -> Option<u32> {
        match self.kind {
            ValueKind::UInt32(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `Int64` or `Int64Alias` — the two
    /// tags share an in-memory representation.
    pub fn as_i64(&self) -> Option<i64> {
        match self.kind {
            ValueKind::Int64(v) | ValueKind::Int64Alias(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `UInt64` or `UInt64Alias`.
    pub fn as_u64(&self) -> Option<u64> {
        match self.kind {
            ValueKind::UInt64(v) | ValueKind::UInt64Alias(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `Float32`.
    pub fn as_f32(&self) -> Option<f32> {
        match self.kind {
            ValueKind::Float32(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` iff the stored kind is `Float64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(&[u8])` iff the stored kind is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            ValueKind::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(&str)` iff the stored kind is `String`.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(&Store)` iff the stored kind is `Container`.
    pub fn as_container(&self) -> Option<&Store> {
        match &self.kind {
            ValueKind::Container(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(&[Value])` iff the stored kind is `Array`.
    pub fn as_array(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Typed accessor error form: returns [`CoreError::TypeMismatch`] instead
    /// of `None`. Most callers want [`Value::as_i32`] and friends; this is
    /// for call sites that have already committed to a kind and want a
    /// propagatable error on mismatch rather than a silent `Option`.
    pub fn expect_i32(&self) -> CodecResult<i32> {
        self.as_i32().ok_or(CoreError::TypeMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_discriminant_for_every_kind() {
        let values = vec![
            Value::null("n"),
            Value::bool("n", true),
            Value::i16("n", -1),
            Value::u16("n", 1),
            Value::i32("n", -1),
            Value::u32("n", 1),
            Value::i64("n", -1),
            Value::u64("n", 1),
            Value::i64_alias("n", -1),
            Value::u64_alias("n", 1),
            Value::f32("n", 1.0),
            Value::f64("n", 1.0),
            Value::bytes("n", vec![1, 2, 3]),
            Value::string("n", "hi"),
            Value::container("n", Store::new()),
            Value::array("n", vec![]),
        ];
        for (i, v) in values.iter().enumerate() {
            assert_eq!(v.tag(), i as u8, "tag mismatch for variant {i}");
        }
    }

    #[test]
    fn alias_accessors_unify_with_canonical_tag() {
        let canonical = Value::i64("n", 42);
        let alias = Value::i64_alias("n", 42);
        assert_eq!(canonical.as_i64(), Some(42));
        assert_eq!(alias.as_i64(), Some(42));
        assert_eq!(canonical.tag(), tag::INT64);
        assert_eq!(alias.tag(), tag::INT64_ALIAS);
        assert_ne!(canonical, alias);
    }

    #[test]
    fn accessor_returns_none_on_kind_mismatch() {
        let v = Value::i32("n", 1);
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.as_str(), None);
        assert!(v.expect_i32().is_ok());
        assert!(Value::bool("n", true).expect_i32().is_err());
    }
}
