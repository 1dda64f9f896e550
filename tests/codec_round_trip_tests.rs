// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end encode/decode tests through an in-memory registry.

mod common;

use std::sync::Arc;

use serde_json::json;

use avrocodec::encoding::avro;
use avrocodec::encoding::{encode_frame, FORMAT_WARNING_TAG, LABEL_FIELDS};
use avrocodec::{AvroCodec, CodecConfig, CodecError, Event};
use common::{MemoryRegistry, BYTES_SCHEMA, LABEL_SCHEMA, LEVEL_SCHEMA};

const NS: &str = "shipping_label";

fn codec_with(schema_id: u32, definition: &str, binary: bool) -> AvroCodec<Arc<MemoryRegistry>> {
    let registry = Arc::new(MemoryRegistry::new().with_schema(schema_id, definition));
    let config = CodecConfig {
        schema_id: Some(schema_id),
        binary_encoded: binary,
        ..CodecConfig::default()
    };
    AvroCodec::new(config, registry)
}

/// Frame a record by hand, bypassing the outbound projection.
fn raw_frame(schema_id: u32, record: serde_json::Value) -> Vec<u8> {
    let schema = avro::parse_schema(LABEL_SCHEMA).unwrap();
    let body = avro::encode_record(record.as_object().unwrap(), &schema).unwrap();
    encode_frame(schema_id, &body, true).unwrap()
}

#[test]
fn test_hello_round_trip_with_defaults() {
    for binary in [true, false] {
        let codec = codec_with(21, LABEL_SCHEMA, binary);
        let event = Event::from_json(r#"{"message": "hello"}"#).unwrap();

        let frame = codec.encode(&event).unwrap();
        let decoded = codec.decode(&frame).unwrap();

        assert_eq!(decoded.to_json().unwrap(), event.to_json().unwrap());
        assert_eq!(decoded.get_metadata(&[NS, "submitted_from"]), Some(&json!("local")));
        assert_eq!(decoded.get_metadata(&[NS, "originating_host"]), Some(&json!("local")));
        assert_eq!(decoded.get_metadata(&[NS, "vertical"]), Some(&json!("unknown")));
        assert_eq!(decoded.get_metadata(&[NS, "environment"]), Some(&json!("unknown")));
        assert_eq!(decoded.get_metadata(&[NS, "processing_key"]), Some(&json!("none")));
        assert_eq!(decoded.get_metadata(&[NS, "message_format"]), Some(&json!("json")));
    }
}

#[test]
fn test_frame_mode_follows_config() {
    let event = Event::from_json(r#"{"message": "hello"}"#).unwrap();

    let binary = codec_with(3, LABEL_SCHEMA, true).encode(&event).unwrap();
    assert_eq!(&binary[..5], &[0, 0, 0, 0, 3]);

    let text = codec_with(3, LABEL_SCHEMA, false).encode(&event).unwrap();
    assert!(text.iter().all(|b| b.is_ascii_alphanumeric() || b"+/=".contains(b)));
    assert!(text.starts_with(b"AAAAAA"));
}

#[test]
fn test_outbound_record_fields() {
    let codec = codec_with(4, LABEL_SCHEMA, true);
    let mut event = Event::from_json(r#"{"message": "hello", "host": "web-01"}"#).unwrap();
    event.set_metadata(&[NS, "vertical"], "retail");
    event.set_metadata(&[NS, "environment"], "prod");

    let frame = codec.encode(&event).unwrap();
    let schema = avro::parse_schema(LABEL_SCHEMA).unwrap();
    let record = avro::decode_record(&frame[5..], &schema).unwrap();

    assert_eq!(record["submitted_from"], json!("web-01"));
    assert_eq!(record["originating_host"], json!("web-01"));
    assert_eq!(record["vertical"], json!("retail"));
    assert_eq!(record["environment"], json!("prod"));
    assert_eq!(record["processing_key"], json!("none"));
    assert_eq!(record["message_format"], json!("json"));
    assert_eq!(
        record["message"],
        json!(r#"{"host":"web-01","message":"hello"}"#)
    );
}

#[test]
fn test_schema_fields_carried_from_event() {
    let codec = codec_with(5, LEVEL_SCHEMA, true);
    let event = Event::from_json(r#"{"message": "disk full", "level": "error"}"#).unwrap();

    let frame = codec.encode(&event).unwrap();
    let schema = avro::parse_schema(LEVEL_SCHEMA).unwrap();
    let record = avro::decode_record(&frame[5..], &schema).unwrap();
    assert_eq!(record["level"], json!("error"));

    let without = Event::from_json(r#"{"message": "ok"}"#).unwrap();
    let frame = codec.encode(&without).unwrap();
    let record = avro::decode_record(&frame[5..], &schema).unwrap();
    assert_eq!(record["level"], json!(null));
}

#[test]
fn test_decode_binary_format_is_not_implemented() {
    let codec = codec_with(6, LABEL_SCHEMA, true);
    let frame = raw_frame(
        6,
        json!({
            "submitted_from": "a",
            "originating_host": "b",
            "vertical": "c",
            "environment": "d",
            "processing_key": "e",
            "message_format": "binary",
            "message": "opaque"
        }),
    );

    let err = codec.decode(&frame).unwrap_err();
    assert!(matches!(err, CodecError::NotImplemented { .. }));
}

#[test]
fn test_decode_unrecognized_format_tags_event() {
    let codec = codec_with(7, LABEL_SCHEMA, true);
    let frame = raw_frame(
        7,
        json!({
            "submitted_from": "a",
            "originating_host": "b",
            "vertical": "c",
            "environment": "d",
            "processing_key": "e",
            "message_format": "csv",
            "message": "1,2,3"
        }),
    );

    let event = codec.decode(&frame).unwrap();
    assert_eq!(event.get_str(&["message"]), Some("1,2,3"));
    assert!(event.has_tag(FORMAT_WARNING_TAG));
    for field in LABEL_FIELDS {
        assert!(event.get_metadata(&[NS, field]).is_some(), "{field} missing");
    }
    assert_eq!(event.get_metadata(&[NS, "message_format"]), Some(&json!("csv")));
}

#[test]
fn test_binary_format_encodes_raw_message() {
    let codec = codec_with(8, LABEL_SCHEMA, true);
    let mut event = Event::from_json(r#"{"message": "raw payload", "ignored": true}"#).unwrap();
    event.set_metadata(&[NS, "message_format"], "binary");

    let frame = codec.encode(&event).unwrap();
    let schema = avro::parse_schema(LABEL_SCHEMA).unwrap();
    let record = avro::decode_record(&frame[5..], &schema).unwrap();
    assert_eq!(record["message"], json!("raw payload"));
    assert_eq!(record["message_format"], json!("binary"));
}

#[test]
fn test_bytes_payload_round_trip() {
    let codec = codec_with(14, BYTES_SCHEMA, true);

    let event = Event::from_json(r#"{"message": "hello", "n": 1}"#).unwrap();
    let decoded = codec.decode(&codec.encode(&event).unwrap()).unwrap();
    assert_eq!(decoded.to_json().unwrap(), event.to_json().unwrap());

    let mut plain = Event::from_json(r#"{"message": "a,b,c"}"#).unwrap();
    plain.set_metadata(&[NS, "message_format"], "csv");
    let decoded = codec.decode(&codec.encode(&plain).unwrap()).unwrap();
    assert_eq!(decoded.get_str(&["message"]), Some("a,b,c"));
    assert!(decoded.has_tag(FORMAT_WARNING_TAG));
}

#[test]
fn test_decode_rejects_concatenated_frames() {
    let codec = codec_with(15, LABEL_SCHEMA, true);
    let mut frames = codec
        .encode(&Event::from_json(r#"{"message": "first"}"#).unwrap())
        .unwrap();
    let second = codec
        .encode(&Event::from_json(r#"{"message": "second"}"#).unwrap())
        .unwrap();
    frames.extend_from_slice(&second);

    assert!(matches!(
        codec.decode(&frames),
        Err(CodecError::ParseError { .. })
    ));
}

#[test]
fn test_schema_fetched_once_per_id() {
    let codec = codec_with(9, LABEL_SCHEMA, false);
    let event = Event::from_json(r#"{"message": "hello"}"#).unwrap();

    for _ in 0..5 {
        let frame = codec.encode(&event).unwrap();
        codec.decode(&frame).unwrap();
    }

    assert_eq!(codec.registry().calls("fetch_schema_by_id"), 1);
    assert_eq!(codec.schema_cache().ids().unwrap(), vec![9]);
}

#[test]
fn test_decode_unknown_schema_id() {
    let codec = codec_with(10, LABEL_SCHEMA, true);
    let err = codec.decode(&[0, 0, 0, 0, 99, 0]).unwrap_err();
    assert!(matches!(err, CodecError::RegistryFetch { .. }));
}

#[test]
fn test_decode_framing_errors() {
    let codec = codec_with(11, LABEL_SCHEMA, true);
    assert!(matches!(
        codec.decode(&[0, 0, 0]),
        Err(CodecError::FrameTooShort { length: 3 })
    ));
    assert!(matches!(
        codec.decode(&[2, 0, 0, 0, 11, 0]),
        Err(CodecError::BadMagicByte { found: 2 })
    ));
    assert_eq!(codec.registry().total_calls(), 0);
}

#[test]
fn test_encode_rejects_event_not_matching_schema() {
    let strict = r#"{
        "type": "record",
        "name": "Strict",
        "fields": [
            {"name": "message", "type": "string"},
            {"name": "required_count", "type": "long"}
        ]
    }"#;
    let codec = codec_with(12, strict, true);
    let event = Event::from_json(r#"{"message": "hello"}"#).unwrap();
    assert!(matches!(
        codec.encode(&event),
        Err(CodecError::EncodeError { .. })
    ));
}

#[test]
fn test_concurrent_encode_decode() {
    use std::thread;

    let codec = Arc::new(codec_with(13, LABEL_SCHEMA, false));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                let event = Event::from_json(&format!(r#"{{"message": "m{i}"}}"#)).unwrap();
                let frame = codec.encode(&event).unwrap();
                let decoded = codec.decode(&frame).unwrap();
                assert_eq!(decoded.get_str(&["message"]), Some(format!("m{i}").as_str()));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(codec.registry().calls("fetch_schema_by_id"), 1);
}
