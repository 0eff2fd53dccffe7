// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// The container facade: header fields (source/target/message-type metadata)
// wrapped around a payload `Store`. The facade is the one messaging-adjacent
// piece the core still owns, because its binary wire format embeds literal
// compatibility markers (`@header={...};@data={...};`) that an existing
// on-wire protocol requires verbatim.

use crate::codec::binary;
use crate::codec::Format;
use crate::config::CodecOptions;
use crate::error::{CodecResult, CoreError};
use crate::store::Store;

const HEADER_OPEN: &str = "@header={";
const HEADER_CLOSE: &str = "};";
const DATA_OPEN: &str = "@data={";
const DATA_CLOSE: &str = "};";

const HEADER_KEYS: [&str; 6] = [
    "source",
    "source_sub",
    "target",
    "target_sub",
    "message_type",
    "version",
];

/// Opaque message-header metadata. Every field is a plain string to the
/// core; only the embedding messaging layer interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Sending endpoint identifier.
    pub source: String,
    /// Sending endpoint sub-identifier.
    pub source_sub: String,
    /// Receiving endpoint identifier.
    pub target: String,
    /// Receiving endpoint sub-identifier.
    pub target_sub: String,
    /// Application-defined message type tag.
    pub message_type: String,
    /// Wire/protocol version string.
    pub version: String,
}

impl Header {
    fn field(&self, key: &str) -> &str {
        match key {
            "source" => &self.source,
            "source_sub" => &self.source_sub,
            "target" => &self.target,
            "target_sub" => &self.target_sub,
            "message_type" => &self.message_type,
            "version" => &self.version,
            _ => "",
        }
    }

    fn set_field(&mut self, key: &str, value: String) {
        match key {
            "source" => self.source = value,
            "source_sub" => self.source_sub = value,
            "target" => self.target = value,
            "target_sub" => self.target_sub = value,
            "message_type" => self.message_type = value,
            "version" => self.version = value,
            _ => {} // unknown keys decode to empty strings; nothing to set
        }
    }

    /// Swap the source and target pairs in place.
    fn swap_source_target(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
        std::mem::swap(&mut self.source_sub, &mut self.target_sub);
    }
}

/// A header plus a payload [`Store`] — the outer message container this
/// crate's embedders pass around.
pub struct Facade {
    header: Store,
    payload: Store,
}

impl Facade {
    /// An empty facade: default header, empty payload store.
    pub fn new() -> Self {
        Self {
            header: Self::header_store(&Header::default()),
            payload: Store::new(),
        }
    }

    /// A facade over an explicit header and payload store.
    pub fn with_header(header: Header, payload: Store) -> Self {
        Self {
            header: Self::header_store(&header),
            payload,
        }
    }

    fn header_store(header: &Header) -> Store {
        let store = Store::new();
        for key in HEADER_KEYS {
            store.insert(crate::value::Value::string(key, header.field(key).to_string()));
        }
        store
    }

    /// The current header fields, read out of the internal header store.
    pub fn header(&self) -> Header {
        let mut h = Header::default();
        for key in HEADER_KEYS {
            if let Some(v) = self.header.get(key, 0) {
                h.set_field(key, v.as_str().unwrap_or("").to_string());
            }
        }
        h
    }

    /// Replace the header fields wholesale.
    pub fn set_header(&mut self, header: Header) {
        self.header = Self::header_store(&header);
    }

    /// Borrow the payload store for value operations (`insert`, `get`, ...).
    pub fn payload(&self) -> &Store {
        &self.payload
    }

    /// Exchange the source/target (and their sub-id) pairs atomically under
    /// the header store's writer lock.
    pub fn swap_header(&mut self) {
        let mut h = self.header();
        h.swap_source_target();
        self.set_header(h);
    }

    /// Encode `@header={k=v;...};@data={<store-encoding>};`. The payload is
    /// always encoded in binary form: the literal markers are a
    /// compatibility format in their own right, not a generic envelope
    /// around JSON/XML.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(HEADER_OPEN.as_bytes());
        let header = self.header();
        for key in HEADER_KEYS {
            out.extend_from_slice(format!("{key}={};", header.field(key)).as_bytes());
        }
        out.extend_from_slice(HEADER_CLOSE.as_bytes());
        out.extend_from_slice(DATA_OPEN.as_bytes());
        out.extend_from_slice(&binary::encode_store(&self.payload)?);
        out.extend_from_slice(DATA_CLOSE.as_bytes());
        Ok(out)
    }

    /// Decode the wire format produced by [`Facade::encode`], bounding
    /// payload recursion at the default depth.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Self::decode_with_options(bytes, CodecOptions::default())
    }

    /// [`Facade::decode`], bounding payload recursion at
    /// `options.max_decode_depth`.
    pub fn decode_with_options(bytes: &[u8], options: CodecOptions) -> CodecResult<Self> {
        Self::decode_with_options_inner(bytes, options).map_err(|e| {
            log::warn!("facade: decode failed: {e}");
            e
        })
    }

    fn decode_with_options_inner(bytes: &[u8], options: CodecOptions) -> CodecResult<Self> {
        let text_prefix_len = HEADER_OPEN.len();
        if bytes.len() < text_prefix_len || &bytes[..text_prefix_len] != HEADER_OPEN.as_bytes() {
            return Err(CoreError::MalformedFacade(
                "missing @header={ marker".to_string(),
            ));
        }
        let rest = &bytes[text_prefix_len..];
        let close_pos = find_subslice(rest, HEADER_CLOSE.as_bytes())
            .ok_or_else(|| CoreError::MalformedFacade("missing }; after header".to_string()))?;
        let header_body = std::str::from_utf8(&rest[..close_pos])
            .map_err(|_| CoreError::BadString { offset: text_prefix_len })?;

        let mut header = Header::default();
        for kv in header_body.split(';').filter(|s| !s.is_empty()) {
            if let Some((k, v)) = kv.split_once('=') {
                header.set_field(k, v.to_string());
            }
        }

        let after_header = &rest[close_pos + HEADER_CLOSE.len()..];
        if after_header.len() < DATA_OPEN.len() || &after_header[..DATA_OPEN.len()] != DATA_OPEN.as_bytes() {
            return Err(CoreError::MalformedFacade("missing @data={ marker".to_string()));
        }
        let data_region = &after_header[DATA_OPEN.len()..];
        if data_region.len() < DATA_CLOSE.len()
            || &data_region[data_region.len() - DATA_CLOSE.len()..] != DATA_CLOSE.as_bytes()
        {
            return Err(CoreError::MalformedFacade("missing }; after data".to_string()));
        }
        let payload_bytes = &data_region[..data_region.len() - DATA_CLOSE.len()];
        let payload = binary::decode_store_with_depth(payload_bytes, options.max_decode_depth)?;

        Ok(Self {
            header: Self::header_store(&header),
            payload,
        })
    }

    /// Encode the payload store alone, in the given non-binary format (for
    /// interop/logging; see [`crate::codec`]).
    pub fn encode_payload(&self, format: Format) -> CodecResult<Vec<u8>> {
        crate::codec::encode_store(&self.payload, format)
    }
}

impl Default for Facade {
    fn default() -> Self {
        Self::new()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn encode_decode_round_trips_header_and_payload() {
        let mut facade = Facade::new();
        facade.set_header(Header {
            source: "svc-a".into(),
            source_sub: "1".into(),
            target: "svc-b".into(),
            target_sub: "2".into(),
            message_type: "ping".into(),
            version: "1".into(),
        });
        facade.payload().insert(Value::i32("seq", 7));

        let bytes = facade.encode().unwrap();
        assert!(bytes.starts_with(HEADER_OPEN.as_bytes()));

        let decoded = Facade::decode(&bytes).unwrap();
        assert_eq!(decoded.header().source, "svc-a");
        assert_eq!(decoded.header().message_type, "ping");
        assert_eq!(decoded.payload().get("seq", 0).unwrap().as_i32(), Some(7));
    }

    #[test]
    fn unknown_or_missing_header_keys_decode_to_empty_strings() {
        let facade = Facade::new();
        let h = facade.header();
        assert_eq!(h.source, "");
        assert_eq!(h.version, "");
    }

    #[test]
    fn swap_header_exchanges_source_and_target() {
        let mut facade = Facade::new();
        facade.set_header(Header {
            source: "a".into(),
            source_sub: "a2".into(),
            target: "b".into(),
            target_sub: "b2".into(),
            message_type: "m".into(),
            version: "1".into(),
        });
        facade.swap_header();
        let h = facade.header();
        assert_eq!(h.source, "b");
        assert_eq!(h.source_sub, "b2");
        assert_eq!(h.target, "a");
        assert_eq!(h.target_sub, "a2");
    }

    #[test]
    fn decode_rejects_input_missing_the_header_marker() {
        let err = Facade::decode(b"not a facade at all").unwrap_err();
        assert!(matches!(err, CoreError::MalformedFacade(_)));
    }

    #[test]
    fn decode_with_options_honors_a_tighter_max_decode_depth() {
        let mut inner = Value::i32("leaf", 1);
        for _ in 0..4 {
            let store = Store::new();
            store.insert(inner);
            inner = Value::container("wrap", store);
        }
        let mut facade = Facade::new();
        facade.payload().insert(inner);
        let bytes = facade.encode().unwrap();

        let tight = CodecOptions {
            max_decode_depth: 1,
            ..CodecOptions::default()
        };
        let err = Facade::decode_with_options(&bytes, tight).unwrap_err();
        assert!(matches!(err, CoreError::DepthExceeded { .. }));

        // The default depth still accepts it.
        assert!(Facade::decode(&bytes).is_ok());
    }
}
