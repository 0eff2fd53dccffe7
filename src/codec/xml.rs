// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// XML interop format: one element per value, `<value name="N" type="T">
// payload</value>`; container values nest child `<value>` elements instead
// of carrying text. Built directly on `quick_xml`'s pull reader/writer
// (no serde derive — the element shape is conditional on the value's kind,
// which a single derived struct can't express). Not canonical; only the
// binary codec is required to round-trip byte-for-byte.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{CodecResult, CoreError};
use crate::store::Store;
use crate::value::{Value, ValueKind};

/// Recursion bound `decode_value`/`decode_store` apply when the caller
/// hasn't supplied an explicit [`crate::config::CodecOptions`].
const DEFAULT_MAX_DECODE_DEPTH: usize = 64;

/// Encode a single value as one `<value>` element.
pub fn encode_value(value: &Value) -> CodecResult<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_value(&mut writer, value)?;
    Ok(writer.into_inner().into_inner())
}

/// Encode a store as a sequence of sibling `<value>` elements wrapped in a
/// `<store>` root.
pub fn encode_store(store: &Store) -> CodecResult<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Start(BytesStart::new("store")))
        .map_err(CoreError::from)?;
    let guard = store.read();
    for v in guard.iter() {
        write_value(&mut writer, v)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("store")))
        .map_err(CoreError::from)?;
    Ok(writer.into_inner().into_inner())
}

fn write_value(writer: &mut Writer<Cursor<Vec<u8>>>, value: &Value) -> CodecResult<()> {
    let type_name = value.kind().type_name();
    let mut start = BytesStart::new("value");
    start.push_attribute(("name", value.name()));
    start.push_attribute(("type", type_name));

    match value.kind() {
        ValueKind::Container(store) => {
            writer.write_event(Event::Start(start)).map_err(CoreError::from)?;
            let guard = store.read();
            for child in guard.iter() {
                write_value(writer, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("value")))
                .map_err(CoreError::from)?;
        }
        ValueKind::Array(items) => {
            writer.write_event(Event::Start(start)).map_err(CoreError::from)?;
            for child in items {
                write_value(writer, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("value")))
                .map_err(CoreError::from)?;
        }
        ValueKind::Null => {
            writer.write_event(Event::Empty(start)).map_err(CoreError::from)?;
        }
        other => {
            let text = payload_text(other);
            writer.write_event(Event::Start(start)).map_err(CoreError::from)?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(CoreError::from)?;
            writer
                .write_event(Event::End(BytesEnd::new("value")))
                .map_err(CoreError::from)?;
        }
    }
    Ok(())
}

fn payload_text(kind: &ValueKind) -> String {
    match kind {
        ValueKind::Null => String::new(),
        ValueKind::Bool(v) => v.to_string(),
        ValueKind::Int16(v) => v.to_string(),
        ValueKind::UInt16(v) => v.to_string(),
        ValueKind::Int32(v) => v.to_string(),
        ValueKind::UInt32(v) => v.to_string(),
        ValueKind::Int64(v) | ValueKind::Int64Alias(v) => v.to_string(),
        ValueKind::UInt64(v) | ValueKind::UInt64Alias(v) => v.to_string(),
        ValueKind::Float32(v) => v.to_string(),
        ValueKind::Float64(v) => v.to_string(),
        ValueKind::Bytes(v) => BASE64.encode(v),
        ValueKind::String(v) => v.clone(),
        ValueKind::Container(_) | ValueKind::Array(_) => {
            unreachable!("containers and arrays are handled in write_value")
        }
    }
}

/// Decode a single `<value>` element.
pub fn decode_value(bytes: &[u8]) -> CodecResult<Value> {
    decode_value_with_depth(bytes, DEFAULT_MAX_DECODE_DEPTH)
}

/// [`decode_value`] with an explicit recursion bound.
pub fn decode_value_with_depth(bytes: &[u8], max_depth: usize) -> CodecResult<Value> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(CoreError::from)? {
            Event::Start(start) if start.name().as_ref() == b"value" => {
                return read_value_body(&mut reader, &start, 0, max_depth);
            }
            Event::Empty(start) if start.name().as_ref() == b"value" => {
                return read_value_empty(&start);
            }
            Event::Eof => {
                return Err(CoreError::MalformedXml("no <value> element found".to_string()))
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Decode a `<store>` root containing sibling `<value>` elements.
pub fn decode_store(bytes: &[u8]) -> CodecResult<Store> {
    decode_store_with_depth(bytes, DEFAULT_MAX_DECODE_DEPTH)
}

/// [`decode_store`] with an explicit recursion bound.
pub fn decode_store_with_depth(bytes: &[u8], max_depth: usize) -> CodecResult<Store> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let store = Store::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(CoreError::from)? {
            Event::Start(start) if start.name().as_ref() == b"value" => {
                store.insert(read_value_body(&mut reader, &start, 1, max_depth)?);
            }
            Event::Empty(start) if start.name().as_ref() == b"value" => {
                store.insert(read_value_empty(&start)?);
            }
            Event::End(end) if end.name().as_ref() == b"store" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(store)
}

fn attr(start: &BytesStart, key: &str) -> CodecResult<String> {
    for a in start.attributes().flatten() {
        if a.key.as_ref() == key.as_bytes() {
            return a
                .unescape_value()
                .map(|v| v.to_string())
                .map_err(|_| CoreError::MalformedXml(format!("invalid \"{key}\" attribute")));
        }
    }
    Err(CoreError::MalformedXml(format!("missing \"{key}\" attribute")))
}

fn read_value_empty(start: &BytesStart) -> CodecResult<Value> {
    let name = attr(start, "name")?;
    let type_name = attr(start, "type")?;
    if type_name != "null" {
        return Err(CoreError::MalformedXml(format!(
            "empty element used for non-null type {type_name:?}"
        )));
    }
    Ok(Value::null(name))
}

fn read_value_body<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    depth: usize,
    max_depth: usize,
) -> CodecResult<Value> {
    if depth > max_depth {
        return Err(CoreError::DepthExceeded { limit: max_depth });
    }
    let name = attr(start, "name")?;
    let type_name = attr(start, "type")?;

    if type_name == "container" || type_name == "array" {
        let mut children = Vec::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).map_err(CoreError::from)? {
                Event::Start(child_start) if child_start.name().as_ref() == b"value" => {
                    children.push(read_value_body(reader, &child_start, depth + 1, max_depth)?);
                }
                Event::Empty(child_start) if child_start.name().as_ref() == b"value" => {
                    children.push(read_value_empty(&child_start)?);
                }
                Event::End(end) if end.name().as_ref() == b"value" => break,
                Event::Eof => {
                    return Err(CoreError::MalformedXml(
                        "unexpected end of input inside <value>".to_string(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }
        return Ok(if type_name == "container" {
            let store = Store::new();
            for c in children {
                store.insert(c);
            }
            Value::container(name, store)
        } else {
            Value::array(name, children)
        });
    }

    let mut text = String::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(CoreError::from)? {
            Event::Text(t) => {
                text.push_str(
                    &t.unescape()
                        .map_err(|_| CoreError::MalformedXml("invalid text content".to_string()))?,
                );
            }
            Event::End(end) if end.name().as_ref() == b"value" => break,
            Event::Eof => {
                return Err(CoreError::MalformedXml(
                    "unexpected end of input inside <value>".to_string(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    let kind = match type_name.as_str() {
        "bool" => ValueKind::Bool(
            text.parse()
                .map_err(|_| CoreError::MalformedXml("invalid bool text".to_string()))?,
        ),
        "int16" => ValueKind::Int16(parse_text(&text)?),
        "uint16" => ValueKind::UInt16(parse_text(&text)?),
        "int32" => ValueKind::Int32(parse_text(&text)?),
        "uint32" => ValueKind::UInt32(parse_text(&text)?),
        "int64" => ValueKind::Int64(parse_text(&text)?),
        "uint64" => ValueKind::UInt64(parse_text(&text)?),
        "float32" => ValueKind::Float32(parse_text(&text)?),
        "float64" => ValueKind::Float64(parse_text(&text)?),
        "bytes" => ValueKind::Bytes(
            BASE64
                .decode(&text)
                .map_err(|e| CoreError::MalformedXml(format!("invalid base64: {e}")))?,
        ),
        "string" => ValueKind::String(text),
        other => {
            return Err(CoreError::MalformedXml(format!(
                "unrecognized value type {other:?}"
            )))
        }
    };
    Ok(Value::new(name, kind))
}

fn parse_text<T: std::str::FromStr>(text: &str) -> CodecResult<T> {
    text.parse()
        .map_err(|_| CoreError::MalformedXml(format!("invalid numeric text {text:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_value_round_trips() {
        let v = Value::i32("count", 42);
        let xml = encode_value(&v).unwrap();
        assert!(String::from_utf8_lossy(&xml).contains("name=\"count\""));
        assert_eq!(decode_value(&xml).unwrap(), v);
    }

    #[test]
    fn null_value_encodes_as_an_empty_element() {
        let v = Value::null("n");
        let xml = encode_value(&v).unwrap();
        let text = String::from_utf8_lossy(&xml);
        assert!(text.contains("/>") || text.contains("></value>"));
        assert_eq!(decode_value(&xml).unwrap(), v);
    }

    #[test]
    fn bytes_value_round_trips_through_base64_text() {
        let v = Value::bytes("blob", vec![10, 20, 30]);
        let xml = encode_value(&v).unwrap();
        assert_eq!(decode_value(&xml).unwrap(), v);
    }

    #[test]
    fn nested_container_round_trips() {
        let inner = Store::new();
        inner.insert(Value::string("s", "hi"));
        let v = Value::container("outer", inner);
        let xml = encode_value(&v).unwrap();
        let decoded = decode_value(&xml).unwrap();
        let store = decoded.as_container().unwrap();
        assert_eq!(store.get("s", 0).unwrap().as_str(), Some("hi"));
    }

    #[test]
    fn array_value_round_trips() {
        let v = Value::array(
            "items",
            vec![Value::i32("a", 1), Value::string("a", "x")],
        );
        let xml = encode_value(&v).unwrap();
        let decoded = decode_value(&xml).unwrap();
        let items = decoded.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_i32(), Some(1));
    }

    #[test]
    fn store_round_trips_through_store_element() {
        let store = Store::new();
        store.insert(Value::i32("a", 1));
        store.insert(Value::bool("b", true));
        let xml = encode_store(&store).unwrap();
        let decoded = decode_store(&xml).unwrap();
        assert_eq!(decoded.get("a", 0).unwrap().as_i32(), Some(1));
        assert_eq!(decoded.get("b", 0).unwrap().as_bool(), Some(true));
    }
}
