// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Encode/decode over the value variant and the keyed store. Binary is the
// one canonical format; JSON and XML exist for interop and are not
// required to round-trip byte-for-byte.

pub mod binary;
pub mod json;
pub mod xml;

use crate::config::CodecOptions;
use crate::error::{CodecResult, CoreError};
use crate::store::Store;
use crate::value::Value;

/// The wire format a `Store`/`Value` is encoded to or decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The bit-exact, canonical format.
    Binary,
    /// Human-readable, lossy with respect to tag 6/8 and 7/9.
    Json,
    /// Interop-only element format.
    Xml,
}

/// Encode a single value in the given format.
pub fn encode_value(value: &Value, format: Format) -> CodecResult<Vec<u8>> {
    match format {
        Format::Binary => binary::encode_value(value),
        Format::Json => Ok(serde_json::to_vec(&json::encode_value(value))?),
        Format::Xml => xml::encode_value(value),
    }
}

/// Decode a single value from the given format, bounding recursion at the
/// default depth. All three formats support decoding, including JSON.
pub fn decode_value(bytes: &[u8], format: Format) -> CodecResult<Value> {
    decode_value_with_options(bytes, format, CodecOptions::default())
}

/// [`decode_value`], bounding recursion at `options.max_decode_depth`.
pub fn decode_value_with_options(
    bytes: &[u8],
    format: Format,
    options: CodecOptions,
) -> CodecResult<Value> {
    let result = match format {
        Format::Binary => binary::decode_value_with_depth(bytes, options.max_decode_depth),
        Format::Json => serde_json::from_slice(bytes)
            .map_err(CoreError::from)
            .and_then(|j: serde_json::Value| json::decode_value_with_depth(&j, 0, options.max_decode_depth)),
        Format::Xml => xml::decode_value_with_depth(bytes, options.max_decode_depth),
    };
    if let Err(ref e) = result {
        log::warn!("codec: decode_value ({format:?}) failed: {e}");
    }
    result
}

/// Encode a store's values in the given format.
pub fn encode_store(store: &Store, format: Format) -> CodecResult<Vec<u8>> {
    match format {
        Format::Binary => binary::encode_store(store),
        Format::Json => json::encode_store(store),
        Format::Xml => xml::encode_store(store),
    }
}

/// Decode a store from the given format, bounding recursion at the default
/// depth. Trailing bytes after the outermost value/store are `TrailingData`
/// for binary; JSON/XML report a parse error for trailing content via their
/// own parser.
pub fn decode_store(bytes: &[u8], format: Format) -> CodecResult<Store> {
    decode_store_with_options(bytes, format, CodecOptions::default())
}

/// [`decode_store`], bounding recursion at `options.max_decode_depth`.
pub fn decode_store_with_options(
    bytes: &[u8],
    format: Format,
    options: CodecOptions,
) -> CodecResult<Store> {
    let result = match format {
        Format::Binary => binary::decode_store_with_depth(bytes, options.max_decode_depth),
        Format::Json => json::decode_store_with_depth(bytes, options.max_decode_depth),
        Format::Xml => xml::decode_store_with_depth(bytes, options.max_decode_depth),
    };
    if let Err(ref e) = result {
        log::warn!("codec: decode_store ({format:?}) failed: {e}");
    }
    result
}
