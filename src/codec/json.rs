// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// JSON encoding via `serde_json::Value` construction (no derive: the wire
// shape doesn't map onto a single Rust type one-to-one, since a leaf and a
// container use different JSON shapes). Not canonical — only the binary
// codec is required to round-trip byte-for-byte.
//
// A container's own name has no field in its JSON shape (`{"_type":
// "container","values":[...]}` — only its children's names do, same as
// leaves). Decoding a bare container JSON object therefore always yields an
// unnamed (`""`) container; a caller holding the name elsewhere (e.g. the
// key a parent store held it under) is responsible for reattaching it.
//
// Decoding is implemented fully here rather than returning `NotImplemented`
// for the decode direction.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Value as Json};

use crate::error::{CodecResult, CoreError};
use crate::store::Store;
use crate::value::{Value, ValueKind};

/// Recursion bound `decode_value`/`decode_store` apply when the caller
/// hasn't supplied an explicit [`crate::config::CodecOptions`].
const DEFAULT_MAX_DECODE_DEPTH: usize = 64;

/// Encode a single value to its JSON representation.
pub fn encode_value(value: &Value) -> Json {
    if let ValueKind::Container(store) = value.kind() {
        return json!({
            "_type": "container",
            "values": encode_values(store),
        });
    }
    let mut obj = Map::new();
    obj.insert("name".to_string(), Json::String(value.name().to_string()));
    obj.insert(
        "type".to_string(),
        Json::String(value.kind().type_name().to_string()),
    );
    if let Some(v) = payload_json(value.kind()) {
        obj.insert("value".to_string(), v);
    }
    Json::Object(obj)
}

fn payload_json(kind: &ValueKind) -> Option<Json> {
    match kind {
        ValueKind::Null => None,
        ValueKind::Bool(v) => Some(json!(v)),
        ValueKind::Int16(v) => Some(json!(v)),
        ValueKind::UInt16(v) => Some(json!(v)),
        ValueKind::Int32(v) => Some(json!(v)),
        ValueKind::UInt32(v) => Some(json!(v)),
        ValueKind::Int64(v) | ValueKind::Int64Alias(v) => Some(json!(v)),
        ValueKind::UInt64(v) | ValueKind::UInt64Alias(v) => Some(json!(v)),
        ValueKind::Float32(v) => Some(json!(v)),
        ValueKind::Float64(v) => Some(json!(v)),
        ValueKind::Bytes(v) => Some(Json::String(BASE64.encode(v))),
        ValueKind::String(v) => Some(Json::String(v.clone())),
        ValueKind::Container(_) => unreachable!("containers are handled in encode_value"),
        ValueKind::Array(items) => Some(Json::Array(items.iter().map(encode_value).collect())),
    }
}

fn encode_values(store: &Store) -> Vec<Json> {
    let guard = store.read();
    guard.iter().map(encode_value).collect()
}

/// Encode a store as a JSON array of its values (top-level shape; a
/// container value wraps the same array under `"values"`).
pub fn encode_store(store: &Store) -> CodecResult<Vec<u8>> {
    let arr = Json::Array(encode_values(store));
    Ok(serde_json::to_vec(&arr)?)
}

/// Decode a single value from its JSON representation.
pub fn decode_value(json: &Json) -> CodecResult<Value> {
    decode_value_with_depth(json, 0, DEFAULT_MAX_DECODE_DEPTH)
}

/// [`decode_value`] with an explicit recursion bound.
pub fn decode_value_with_depth(json: &Json, depth: usize, max_depth: usize) -> CodecResult<Value> {
    if depth > max_depth {
        return Err(CoreError::DepthExceeded { limit: max_depth });
    }
    let obj = json
        .as_object()
        .ok_or_else(|| CoreError::MalformedJson("expected a JSON object".to_string()))?;

    if obj.get("_type").and_then(Json::as_str) == Some("container") {
        // The container shape carries no "name" field, unlike a leaf value —
        // a container's name is not recoverable from its own JSON encoding.
        // The caller (e.g. a parent container's `values` array, or a store
        // decode) is responsible for naming it; here it decodes unnamed.
        let values = obj
            .get("values")
            .and_then(Json::as_array)
            .ok_or_else(|| CoreError::MalformedJson("container missing \"values\"".to_string()))?;
        let store = Store::new();
        for v in values {
            store.insert(decode_value_with_depth(v, depth + 1, max_depth)?);
        }
        return Ok(Value::container("", store));
    }

    let name = obj
        .get("name")
        .and_then(Json::as_str)
        .ok_or_else(|| CoreError::MalformedJson("value missing \"name\"".to_string()))?;
    let type_name = obj
        .get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| CoreError::MalformedJson("value missing \"type\"".to_string()))?;
    let payload = obj.get("value");

    let kind = match type_name {
        "null" => ValueKind::Null,
        "bool" => ValueKind::Bool(expect_bool(payload)?),
        "int16" => ValueKind::Int16(expect_i64(payload)? as i16),
        "uint16" => ValueKind::UInt16(expect_u64(payload)? as u16),
        "int32" => ValueKind::Int32(expect_i64(payload)? as i32),
        "uint32" => ValueKind::UInt32(expect_u64(payload)? as u32),
        "int64" => ValueKind::Int64(expect_i64(payload)?),
        "uint64" => ValueKind::UInt64(expect_u64(payload)?),
        "float32" => ValueKind::Float32(expect_f64(payload)? as f32),
        "float64" => ValueKind::Float64(expect_f64(payload)?),
        "bytes" => {
            let s = expect_str(payload)?;
            let bytes = BASE64
                .decode(s)
                .map_err(|e| CoreError::MalformedJson(format!("invalid base64: {e}")))?;
            ValueKind::Bytes(bytes)
        }
        "string" => ValueKind::String(expect_str(payload)?.to_string()),
        "array" => {
            let items = payload
                .and_then(Json::as_array)
                .ok_or_else(|| CoreError::MalformedJson("array value missing \"value\"".to_string()))?;
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(decode_value_with_depth(item, depth + 1, max_depth)?);
            }
            ValueKind::Array(values)
        }
        other => {
            return Err(CoreError::MalformedJson(format!(
                "unrecognized value type {other:?}"
            )))
        }
    };

    Ok(Value::new(name, kind))
}

/// Decode a JSON array of values (as produced by [`encode_store`]) into a
/// store.
pub fn decode_store(bytes: &[u8]) -> CodecResult<Store> {
    decode_store_with_depth(bytes, DEFAULT_MAX_DECODE_DEPTH)
}

/// [`decode_store`] with an explicit recursion bound.
pub fn decode_store_with_depth(bytes: &[u8], max_depth: usize) -> CodecResult<Store> {
    let json: Json = serde_json::from_slice(bytes)?;
    let items = json
        .as_array()
        .ok_or_else(|| CoreError::MalformedJson("expected a top-level JSON array".to_string()))?;
    let store = Store::new();
    for item in items {
        store.insert(decode_value_with_depth(item, 1, max_depth)?);
    }
    Ok(store)
}

fn expect_bool(payload: Option<&Json>) -> CodecResult<bool> {
    payload
        .and_then(Json::as_bool)
        .ok_or_else(|| CoreError::MalformedJson("expected a boolean \"value\"".to_string()))
}

fn expect_i64(payload: Option<&Json>) -> CodecResult<i64> {
    payload
        .and_then(Json::as_i64)
        .ok_or_else(|| CoreError::MalformedJson("expected an integer \"value\"".to_string()))
}

fn expect_u64(payload: Option<&Json>) -> CodecResult<u64> {
    payload
        .and_then(Json::as_u64)
        .ok_or_else(|| CoreError::MalformedJson("expected an unsigned integer \"value\"".to_string()))
}

fn expect_f64(payload: Option<&Json>) -> CodecResult<f64> {
    payload
        .and_then(Json::as_f64)
        .ok_or_else(|| CoreError::MalformedJson("expected a numeric \"value\"".to_string()))
}

fn expect_str(payload: Option<&Json>) -> CodecResult<&str> {
    payload
        .and_then(Json::as_str)
        .ok_or_else(|| CoreError::MalformedJson("expected a string \"value\"".to_string()))
}
