// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Cross-module round trip: facade -> binary codec -> facade, covering
// header fields, a nested container payload, and an alternate interop
// format read off the same payload store.

use typed_container::{Facade, Format, Header, Store, Value};

#[test]
fn facade_round_trips_header_and_a_nested_payload() {
    let mut facade = Facade::new();
    facade.set_header(Header {
        source: "svc-a".into(),
        source_sub: "1".into(),
        target: "svc-b".into(),
        target_sub: "2".into(),
        message_type: "snapshot".into(),
        version: "1".into(),
    });

    let inner = Store::new();
    inner.insert(Value::string("label", "leaf"));
    inner.insert(Value::i32("count", 3));
    facade.payload().insert(Value::container("nested", inner));
    facade.payload().insert(Value::bool("ready", true));

    let bytes = facade.encode().unwrap();
    let decoded = Facade::decode(&bytes).unwrap();

    let header = decoded.header();
    assert_eq!(header.source, "svc-a");
    assert_eq!(header.target, "svc-b");
    assert_eq!(header.message_type, "snapshot");

    assert_eq!(decoded.payload().get("ready", 0).unwrap().as_bool(), Some(true));
    let nested = decoded
        .payload()
        .get("nested", 0)
        .unwrap()
        .as_container()
        .unwrap();
    assert_eq!(nested.get("label", 0).unwrap().as_str(), Some("leaf"));
    assert_eq!(nested.get("count", 0).unwrap().as_i32(), Some(3));
}

#[test]
fn payload_store_re_encodes_through_every_interop_format() {
    let facade = Facade::new();
    facade.payload().insert(Value::string("greeting", "hello"));
    facade.payload().insert(Value::f64("ratio", 0.5));

    for format in [Format::Binary, Format::Json, Format::Xml] {
        let bytes = facade.encode_payload(format).unwrap();
        let store = typed_container::codec::decode_store(&bytes, format).unwrap();
        assert_eq!(store.get("greeting", 0).unwrap().as_str(), Some("hello"));
        assert_eq!(store.get("ratio", 0).unwrap().as_f64(), Some(0.5));
    }
}
