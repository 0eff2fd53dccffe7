// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// The bit-exact binary format: little-endian, no padding, no alignment.
//
//   value      := name_len:u32 | name_bytes:name_len | tag:u8 | payload(tag)
//   payload(container/array) := count:u32 | value × count
//   payload(bytes/string)    := len:u32 | bytes:len
//
// All u32 length prefixes are absolute byte counts except for container and
// array, which count child values. A decoded value re-encodes to the exact
// same bytes — there is exactly one way to encode every value this codec
// can construct.

use crate::error::{CodecResult, CoreError};
use crate::store::Store;
use crate::value::{tag, Value, ValueKind};

/// `Value`'s owned-tree representation makes a literal pointer cycle
/// unconstructible through the safe API (unlike a shared-pointer graph,
/// where two containers can reference each other). A runaway-deep nesting
/// chain is the only way this representation can approximate "cyclic", so
/// the encoder enforces this traversal-depth ceiling and reports
/// `CycleDetected` rather than overflowing the stack. See DESIGN.md.
const MAX_ENCODE_DEPTH: usize = 10_000;

/// Encode a single value to its binary form.
pub fn encode_value(value: &Value) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    write_value(&mut out, value, 0)?;
    Ok(out)
}

/// Decode exactly one value, erroring on leftover bytes.
pub fn decode_value(bytes: &[u8]) -> CodecResult<Value> {
    decode_value_with_depth(bytes, 64)
}

/// Decode exactly one value, bounding recursion at `max_depth`.
pub fn decode_value_with_depth(bytes: &[u8], max_depth: usize) -> CodecResult<Value> {
    let mut pos = 0usize;
    let value = read_value(bytes, &mut pos, 0, max_depth)?;
    if pos != bytes.len() {
        return Err(CoreError::TrailingData {
            extra: bytes.len() - pos,
        });
    }
    Ok(value)
}

/// Encode a store's values in sequence order: `count:u32 | value × count`,
/// the same shape as a `container` payload without the wrapping tag.
pub fn encode_store(store: &Store) -> CodecResult<Vec<u8>> {
    let guard = store.read();
    let mut out = Vec::new();
    out.extend_from_slice(&(guard.len() as u32).to_le_bytes());
    for v in guard.iter() {
        write_value(&mut out, v, 0)?;
    }
    Ok(out)
}

/// Decode a byte run produced by [`encode_store`]. Trailing bytes are an
/// error.
pub fn decode_store(bytes: &[u8]) -> CodecResult<Store> {
    decode_store_with_depth(bytes, 64)
}

/// [`decode_store`] with an explicit recursion bound.
pub fn decode_store_with_depth(bytes: &[u8], max_depth: usize) -> CodecResult<Store> {
    let mut pos = 0usize;
    let count = read_u32(bytes, &mut pos)? as usize;
    let store = Store::new();
    for _ in 0..count {
        let v = read_value(bytes, &mut pos, 0, max_depth)?;
        store.insert(v);
    }
    if pos != bytes.len() {
        return Err(CoreError::TrailingData {
            extra: bytes.len() - pos,
        });
    }
    Ok(store)
}

fn write_value(out: &mut Vec<u8>, value: &Value, depth: usize) -> CodecResult<()> {
    if depth > MAX_ENCODE_DEPTH {
        return Err(CoreError::CycleDetected);
    }
    let name = value.name().as_bytes();
    out.extend_from_slice(&(name.len() as u32).to_le_bytes());
    out.extend_from_slice(name);
    out.push(value.tag());
    match value.kind() {
        ValueKind::Null => {}
        ValueKind::Bool(b) => out.push(if *b { 1 } else { 0 }),
        ValueKind::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::UInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::Int64Alias(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::UInt64Alias(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
        ValueKind::Bytes(v) => {
            out.extend_from_slice(&(v.len() as u32).to_le_bytes());
            out.extend_from_slice(v);
        }
        ValueKind::String(v) => {
            let bytes = v.as_bytes();
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        ValueKind::Container(store) => {
            let guard = store.read();
            out.extend_from_slice(&(guard.len() as u32).to_le_bytes());
            for child in guard.iter() {
                write_value(out, child, depth + 1)?;
            }
        }
        ValueKind::Array(items) => {
            out.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for child in items {
                write_value(out, child, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn read_value(bytes: &[u8], pos: &mut usize, depth: usize, max_depth: usize) -> CodecResult<Value> {
    if depth > max_depth {
        return Err(CoreError::DepthExceeded { limit: max_depth });
    }
    let name_len = read_u32(bytes, pos)? as usize;
    let name_start = *pos;
    let name_bytes = read_slice(bytes, pos, name_len)?;
    let name = std::str::from_utf8(name_bytes)
        .map_err(|_| CoreError::BadString { offset: name_start })?
        .to_string();
    let t = read_u8(bytes, pos)?;

    let kind = match t {
        tag::NULL => ValueKind::Null,
        tag::BOOL => ValueKind::Bool(read_u8(bytes, pos)? != 0),
        tag::INT16 => ValueKind::Int16(i16::from_le_bytes(read_array(bytes, pos)?)),
        tag::UINT16 => ValueKind::UInt16(u16::from_le_bytes(read_array(bytes, pos)?)),
        tag::INT32 => ValueKind::Int32(i32::from_le_bytes(read_array(bytes, pos)?)),
        tag::UINT32 => ValueKind::UInt32(u32::from_le_bytes(read_array(bytes, pos)?)),
        tag::INT64 => ValueKind::Int64(i64::from_le_bytes(read_array(bytes, pos)?)),
        tag::UINT64 => ValueKind::UInt64(u64::from_le_bytes(read_array(bytes, pos)?)),
        tag::INT64_ALIAS => ValueKind::Int64Alias(i64::from_le_bytes(read_array(bytes, pos)?)),
        tag::UINT64_ALIAS => ValueKind::UInt64Alias(u64::from_le_bytes(read_array(bytes, pos)?)),
        tag::FLOAT32 => ValueKind::Float32(f32::from_le_bytes(read_array(bytes, pos)?)),
        tag::FLOAT64 => ValueKind::Float64(f64::from_le_bytes(read_array(bytes, pos)?)),
        tag::BYTES => {
            let len = read_u32(bytes, pos)? as usize;
            ValueKind::Bytes(read_slice(bytes, pos, len)?.to_vec())
        }
        tag::STRING => {
            let len = read_u32(bytes, pos)? as usize;
            let start = *pos;
            let slice = read_slice(bytes, pos, len)?;
            let s = std::str::from_utf8(slice)
                .map_err(|_| CoreError::BadString { offset: start })?;
            ValueKind::String(s.to_string())
        }
        tag::CONTAINER => {
            let count = read_u32(bytes, pos)? as usize;
            let store = Store::new();
            for _ in 0..count {
                store.insert(read_value(bytes, pos, depth + 1, max_depth)?);
            }
            ValueKind::Container(store)
        }
        tag::ARRAY => {
            let count = read_u32(bytes, pos)? as usize;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_value(bytes, pos, depth + 1, max_depth)?);
            }
            ValueKind::Array(items)
        }
        other => return Err(CoreError::UnknownKind { tag: other }),
    };

    debug_assert_eq!(kind.tag(), t, "decoded kind must re-encode under the tag it was read from");
    Ok(Value::new(name, kind))
}

fn read_u8(bytes: &[u8], pos: &mut usize) -> CodecResult<u8> {
    let slice = read_slice(bytes, pos, 1)?;
    Ok(slice[0])
}

fn read_u32(bytes: &[u8], pos: &mut usize) -> CodecResult<u32> {
    let arr: [u8; 4] = read_array(bytes, pos)?;
    Ok(u32::from_le_bytes(arr))
}

fn read_array<const N: usize>(bytes: &[u8], pos: &mut usize) -> CodecResult<[u8; N]> {
    let slice = read_slice(bytes, pos, N)?;
    let mut arr = [0u8; N];
    arr.copy_from_slice(slice);
    Ok(arr)
}

fn read_slice<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> CodecResult<&'a [u8]> {
    if bytes.len() < *pos + len {
        return Err(CoreError::Truncated {
            needed: (*pos + len) - bytes.len(),
            offset: *pos,
        });
    }
    let slice = &bytes[*pos..*pos + len];
    *pos += len;
    Ok(slice)
}

/// Decode `bytes`, then re-encode and compare. This codec is canonical by
/// construction, so this is a test-only check, not a codepath any
/// production caller exercises.
#[cfg(test)]
fn assert_canonical_round_trip(bytes: &[u8]) -> CodecResult<()> {
    let value = decode_value(bytes)?;
    let re_encoded = encode_value(&value)?;
    if re_encoded != bytes {
        return Err(CoreError::NonCanonical);
    }
    Ok(())
}
