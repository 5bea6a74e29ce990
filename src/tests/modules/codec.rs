use crate::{
    Binary, Bson, DateTime, DbPointer, Document, Regex, Timestamp, doc, oid::ObjectId,
    spec::BinarySubtype, tests::LOCK,
};

#[test]
fn test_encode_decode_floating_point() {
    let _guard = LOCK.run_concurrently();
    let src = 1020.123;
    let dst = vec![
        18, 0, 0, 0, 1, 107, 101, 121, 0, 68, 139, 108, 231, 251, 224, 143, 64, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_utf8_string() {
    let _guard = LOCK.run_concurrently();
    let src = "test你好吗".to_owned();
    let dst = vec![
        28, 0, 0, 0, 2, 107, 101, 121, 0, 14, 0, 0, 0, 116, 101, 115, 116, 228, 189, 160, 229, 165,
        189, 229, 144, 151, 0, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_array() {
    let _guard = LOCK.run_concurrently();
    let src = vec![Bson::Double(1.01), Bson::String("xyz".to_owned())];
    let dst = vec![
        37, 0, 0, 0, 4, 107, 101, 121, 0, 27, 0, 0, 0, 1, 48, 0, 41, 92, 143, 194, 245, 40, 240,
        63, 2, 49, 0, 4, 0, 0, 0, 120, 121, 122, 0, 0, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_embedded_document() {
    let _guard = LOCK.run_concurrently();
    let src = doc! { "subkey": 1 };
    let dst = vec![
        27, 0, 0, 0, 3, 107, 101, 121, 0, 17, 0, 0, 0, 16, 115, 117, 98, 107, 101, 121, 0, 1, 0, 0,
        0, 0, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_boolean() {
    let _guard = LOCK.run_concurrently();
    let src = true;
    let dst = vec![11, 0, 0, 0, 8, 107, 101, 121, 0, 1, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_null() {
    let _guard = LOCK.run_concurrently();
    let src = Bson::Null;
    let dst = vec![10, 0, 0, 0, 10, 107, 101, 121, 0, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_regexp() {
    let _guard = LOCK.run_concurrently();
    let src = Bson::RegularExpression(Regex {
        pattern: "1".to_owned(),
        options: "2".to_owned(),
    });
    let dst = vec![14, 0, 0, 0, 11, 107, 101, 121, 0, 49, 0, 50, 0, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_javascript_code() {
    let _guard = LOCK.run_concurrently();
    let src = Bson::JavaScriptCode("1".to_owned());
    let dst = vec![16, 0, 0, 0, 13, 107, 101, 121, 0, 2, 0, 0, 0, 49, 0, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_i32() {
    let _guard = LOCK.run_concurrently();
    let src = 100i32;
    let dst = vec![14, 0, 0, 0, 16, 107, 101, 121, 0, 100, 0, 0, 0, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_i64() {
    let _guard = LOCK.run_concurrently();
    let src = 100i64;
    let dst = vec![
        18, 0, 0, 0, 18, 107, 101, 121, 0, 100, 0, 0, 0, 0, 0, 0, 0, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_timestamp() {
    let _guard = LOCK.run_concurrently();
    let src = Bson::Timestamp(Timestamp {
        time: 0,
        increment: 100,
    });
    // the increment is the first of the two u32s on the wire
    let dst = vec![
        18, 0, 0, 0, 17, 107, 101, 121, 0, 100, 0, 0, 0, 0, 0, 0, 0, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_binary_generic() {
    let _guard = LOCK.run_concurrently();
    let src = Binary {
        subtype: BinarySubtype::Generic,
        bytes: vec![0, 1, 2, 3, 4],
    };
    let dst = vec![
        20, 0, 0, 0, 5, 107, 101, 121, 0, 5, 0, 0, 0, 0, 0, 1, 2, 3, 4, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_binary_old() {
    let _guard = LOCK.run_concurrently();
    let src = Binary {
        subtype: BinarySubtype::BinaryOld,
        bytes: b"test".to_vec(),
    };
    // outer length 8, subtype, duplicated inner length 4, then the payload
    let dst = b"\x17\x00\x00\x00\x05key\x00\x08\x00\x00\x00\x02\x04\x00\x00\x00test\x00".to_vec();

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_decode_invalid_old_binary_length() {
    let _guard = LOCK.run_concurrently();
    let buffer = b"\x0F\x00\x00\x00\x05\x00\x00\x00\x00\x00\x02\xFC\xFF\xFF\xFF";
    Document::from_slice(buffer).expect_err("expected decode to fail");

    let buffer = b".\x00\x00\x00\x05\x01\x00\x00\x00\x00\x00\x02\xfc\xff\xff\xff\xff\xff\xff\xff\x00\x00*\x00h\x0e\x10++\x00h\x0e++\x00\x00\t\x00\x00\x00\x00\x00*\x0e\x10++";
    Document::from_slice(buffer).expect_err("expected decode to fail");
}

#[test]
fn test_encode_decode_object_id() {
    let _guard = LOCK.run_concurrently();
    let src = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    let dst = vec![
        22, 0, 0, 0, 7, 107, 101, 121, 0, 80, 127, 31, 119, 188, 248, 108, 215, 153, 67, 144, 17, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_utc_datetime() {
    let _guard = LOCK.run_concurrently();
    let src = DateTime::from_time_0_3(
        time::OffsetDateTime::from_unix_timestamp(1_286_705_410).unwrap(),
    );
    let dst = vec![
        18, 0, 0, 0, 9, 107, 101, 121, 0, 208, 111, 158, 149, 43, 1, 0, 0, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_decode_symbol_as_string() {
    let _guard = LOCK.run_concurrently();
    // a Symbol (0x0E) element carrying "abc"
    let src = vec![
        18, 0, 0, 0, 14, 107, 101, 121, 0, 4, 0, 0, 0, 97, 98, 99, 0, 0,
    ];

    let decoded = Document::from_slice(&src).unwrap();
    assert_eq!(decoded, doc! { "key": "abc" });

    // re-encoding uses the String tag; the Symbol tag is not preserved
    let reencoded = decoded.to_vec();
    assert_eq!(reencoded[4], 0x02);
}

#[test]
fn test_encode_decode_undefined() {
    let _guard = LOCK.run_concurrently();
    let src = Bson::Undefined;
    let dst = vec![10, 0, 0, 0, 6, 107, 101, 121, 0, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_min_key() {
    let _guard = LOCK.run_concurrently();
    let src = Bson::MinKey;
    let dst = vec![10, 0, 0, 0, 255, 107, 101, 121, 0, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_max_key() {
    let _guard = LOCK.run_concurrently();
    let src = Bson::MaxKey;
    let dst = vec![10, 0, 0, 0, 127, 107, 101, 121, 0, 0];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_encode_decode_db_pointer() {
    let _guard = LOCK.run_concurrently();
    let src = DbPointer {
        namespace: "db.coll".to_owned(),
        id: ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap(),
    };
    let dst = vec![
        34, 0, 0, 0, 12, 107, 101, 121, 0, 8, 0, 0, 0, 100, 98, 46, 99, 111, 108, 108, 0, 80, 127,
        31, 119, 188, 248, 108, 215, 153, 67, 144, 17, 0,
    ];

    let doc = doc! { "key": src };

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(&buf).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_empty_document() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! {};
    let buf = doc.to_vec();
    assert_eq!(buf, b"\x05\x00\x00\x00\x00");

    let decoded = Document::from_slice(&buf).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_hello_world() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "hello": "world" };
    let dst = b"\x16\x00\x00\x00\x02hello\x00\x06\x00\x00\x00world\x00\x00";

    let buf = doc.to_vec();
    assert_eq!(buf, dst);

    let decoded = Document::from_slice(dst).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_mixed_array() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "BSON": ["awesome", 5.05, 1986] };
    let dst = b"\x31\x00\x00\x00\x04BSON\x00\x26\x00\x00\x00\x020\x00\x08\x00\x00\x00awesome\x00\x011\x00\x33\x33\x33\x33\x33\x33\x14\x40\x102\x00\xc2\x07\x00\x00\x00\x00";

    let buf = doc.to_vec();
    assert_eq!(buf, dst.to_vec());

    let decoded = Document::from_slice(dst).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_timestamp_wire_order() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "test": Timestamp { time: 4, increment: 20 } };
    let dst = b"\x13\x00\x00\x00\x11test\x00\x14\x00\x00\x00\x04\x00\x00\x00\x00";

    assert_eq!(doc.to_vec(), dst.to_vec());
    assert_eq!(Document::from_slice(dst).unwrap(), doc);
}

#[test]
fn test_datetime_epoch_millis() {
    let _guard = LOCK.run_concurrently();
    let dt = DateTime::parse_rfc3339_str("2007-01-08T00:30:11Z").unwrap();
    let doc = doc! { "date": dt };
    let dst = b"\x13\x00\x00\x00\x09date\x00\x38\xBE\x1C\xFF\x0F\x01\x00\x00\x00";

    assert_eq!(doc.to_vec(), dst.to_vec());
    assert_eq!(Document::from_slice(dst).unwrap(), doc);
}

#[test]
fn test_javascript_element() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "$where": Bson::JavaScriptCode("test".to_owned()) };
    let dst = b"\x16\x00\x00\x00\x0d$where\x00\x05\x00\x00\x00test\x00\x00";

    assert_eq!(doc.to_vec(), dst.to_vec());
    assert_eq!(Document::from_slice(dst).unwrap(), doc);
}

#[test]
fn test_decode_truncated_length() {
    let _guard = LOCK.run_concurrently();
    let err = Document::from_slice(b"\x1B").unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_decode_length_below_minimum() {
    let _guard = LOCK.run_concurrently();
    let err = Document::from_slice(b"\x01\x00\x00\x00\x00").unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_decode_length_prefix_off_by_one() {
    let _guard = LOCK.run_concurrently();
    let mut bytes = doc! { "hello": "world" }.to_vec();

    bytes[0] -= 1;
    assert!(Document::from_slice(&bytes).unwrap_err().is_malformed());

    bytes[0] += 2;
    assert!(Document::from_slice(&bytes).unwrap_err().is_malformed());
}

#[test]
fn test_decode_missing_terminator() {
    let _guard = LOCK.run_concurrently();
    let bytes = doc! { "hello": "world" }.to_vec();
    let err = Document::from_slice(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_decode_nonzero_terminator() {
    let _guard = LOCK.run_concurrently();
    let mut bytes = doc! { "hello": "world" }.to_vec();
    let last = bytes.len() - 1;
    bytes[last] = 0x2A;
    let err = Document::from_slice(&bytes).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_decode_trailing_bytes() {
    let _guard = LOCK.run_concurrently();
    let mut bytes = doc! { "hello": "world" }.to_vec();
    bytes.push(0);
    let err = Document::from_slice(&bytes).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_decode_unrecognized_element_type() {
    let _guard = LOCK.run_concurrently();
    let err = Document::from_slice(b"\x08\x00\x00\x00\x20k\x00\x00").unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_decode_reserved_element_types() {
    let _guard = LOCK.run_concurrently();
    // JavaScript code with scope (0x0F) and Decimal128 (0x13) are reserved
    // tags without decoders
    for tag in [0x0Fu8, 0x13] {
        let bytes = vec![8, 0, 0, 0, tag, 107, 0, 0];
        let err = Document::from_slice(&bytes).unwrap_err();
        assert!(err.is_malformed());
    }
}

#[test]
fn test_decode_invalid_utf8() {
    let _guard = LOCK.run_concurrently();
    let buffer = b"\x13\x00\x00\x00\x02\x01\x00\x00\x00\x00\x00\x00\x00foo\x00\x13\x05\x00\x00\x00";
    assert!(Document::from_slice(buffer).is_err());
}

#[test]
fn test_decode_illegal_size() {
    let _guard = LOCK.run_concurrently();
    let buffer = [
        0x06, 0xcc, 0xf9, 0x0a, 0x05, 0x00, 0x00, 0x03, 0x00, 0xff, 0xff,
    ];
    assert!(Document::from_slice(&buffer).is_err());
}

#[test]
fn test_decode_invalid_array_length() {
    let _guard = LOCK.run_concurrently();
    let buffer = b"\n\x00\x00\x00\x04\x00\x00\x00\x00\x00";
    Document::from_slice(buffer).expect_err("expected decode to fail");
}

#[test]
fn test_decode_array_with_lenient_keys() {
    let _guard = LOCK.run_concurrently();
    // {"0": null, "X": 514} read as an array: keys are discarded
    let bson = b"\x0f\x00\x00\x00\x0A0\x00\x10X\x00\x02\x02\x00\x00\x00";
    let mut outer = vec![];
    outer.extend_from_slice(&23i32.to_le_bytes());
    outer.push(0x04);
    outer.extend_from_slice(b"a\x00");
    outer.extend_from_slice(bson);
    outer.push(0);

    let decoded = Document::from_slice(&outer).unwrap();
    assert_eq!(
        decoded.get_array("a").unwrap(),
        &vec![Bson::Null, Bson::Int32(514)]
    );
}

#[test]
fn test_roundtrip_all_types() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! {
        "double": 2.5,
        "string": "hello",
        "array": ["a", 1, true],
        "document": { "nested": null },
        "boolean": false,
        "null": null,
        "regex": Regex { pattern: "^a".to_owned(), options: "i".to_owned() },
        "js": Bson::JavaScriptCode("function() {}".to_owned()),
        "int32": i32::MIN,
        "int64": i64::MAX,
        "timestamp": Timestamp { time: 1, increment: 2 },
        "binary": Binary { subtype: BinarySubtype::UserDefined(0x80), bytes: vec![1, 2, 3] },
        "oid": ObjectId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]),
        "datetime": DateTime::from_millis(-1),
        "db_pointer": DbPointer {
            namespace: "db.coll".to_owned(),
            id: ObjectId::from_bytes([0; 12]),
        },
        "undefined": Bson::Undefined,
        "max": Bson::MaxKey,
        "min": Bson::MinKey,
    };

    let bytes = doc.to_vec();
    let decoded = Document::from_slice(&bytes).unwrap();
    assert_eq!(decoded, doc);
    assert_eq!(decoded.to_vec(), bytes);
}
