// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Crate-wide error taxonomy. One closed enum, module-scoped `Result` aliases.

use thiserror::Error;

/// Every recoverable failure mode surfaced by this crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An allocator fallback (heap or chunk growth) failed.
    #[error("out of memory: failed to allocate {requested} bytes")]
    OutOfMemory {
        /// Number of bytes the caller asked for.
        requested: usize,
    },

    /// A wire tag byte fell outside `0..=15`.
    #[error("unknown value kind tag: {tag}")]
    UnknownKind {
        /// The offending tag byte.
        tag: u8,
    },

    /// The reader ran out of bytes before a payload finished parsing.
    #[error("truncated input: needed {needed} more byte(s) at offset {offset}")]
    Truncated {
        /// Bytes still required when the reader ran dry.
        needed: usize,
        /// Byte offset at which the shortfall was detected.
        offset: usize,
    },

    /// A `string` payload was not valid UTF-8.
    #[error("invalid UTF-8 in string payload at offset {offset}")]
    BadString {
        /// Byte offset of the string payload.
        offset: usize,
    },

    /// A decoded value re-encoded to different bytes (test-only invariant).
    #[error("re-encoding produced different bytes than the original input")]
    NonCanonical,

    /// The encoder found a container/array value that (directly or transitively)
    /// contains itself.
    #[error("cyclic container or array graph detected during encoding")]
    CycleDetected,

    /// The decoder recursed past the configured `max_decode_depth`.
    #[error("nesting depth exceeded the configured limit of {limit}")]
    DepthExceeded {
        /// The configured limit that was exceeded.
        limit: usize,
    },

    /// The encoded input had bytes left over after the outermost value/store.
    #[error("{extra} trailing byte(s) after the encoded value")]
    TrailingData {
        /// Number of bytes left unconsumed.
        extra: usize,
    },

    /// A typed accessor was called against a value of a different kind.
    #[error("type mismatch: value is not of the requested kind")]
    TypeMismatch,

    /// The decoding format does not support decoding (only some formats are
    /// required to round-trip; see the codec format documentation).
    #[error("decoding is not implemented for this format")]
    NotImplemented,

    /// An auto-refresh worker was stopped mid-refresh.
    #[error("operation cancelled: the auto-refresh worker was stopped")]
    Cancelled,

    /// Malformed XML input that isn't covered by a more specific variant.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Malformed JSON input that isn't covered by a more specific variant.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// The `@header={...};@data={...};` wire markers were missing or out of
    /// order.
    #[error("malformed facade encoding: {0}")]
    MalformedFacade(String),
}

/// Result alias used by the allocation subsystem (`alloc` module).
pub type PoolResult<T> = Result<T, CoreError>;

/// Result alias used by the value/codec subsystem (`value`, `codec` modules).
pub type CodecResult<T> = Result<T, CoreError>;

/// Result alias used by the keyed store and its readers.
pub type StoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::MalformedJson(e.to_string())
    }
}

impl From<quick_xml::Error> for CoreError {
    fn from(e: quick_xml::Error) -> Self {
        CoreError::MalformedXml(e.to_string())
    }
}
