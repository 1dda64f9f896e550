// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Avro binary datum encoding for JSON records.
//!
//! Thin layer over `apache-avro`: records travel through the codec as
//! `serde_json` objects and are converted to Avro values at the boundary.
//! Only the bare datum is produced; no container header or schema
//! fingerprint is written.

use apache_avro::schema::RecordSchema;
use apache_avro::types::Value as AvroValue;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};
use serde_json::{Map, Value};

use crate::core::{CodecError, Result};

/// Parse an Avro schema definition (JSON text).
pub fn parse_schema(definition: &str) -> Result<Schema> {
    Schema::parse_str(definition).map_err(|e| CodecError::parse("avro schema", format!("{e}")))
}

/// Encode a record as an Avro binary datum.
///
/// The record is resolved against the schema first, so JSON integers are
/// narrowed to `int`, strings are accepted for `bytes`, missing fields take
/// their schema defaults, and values are matched to union branches.
pub fn encode_record(record: &Map<String, Value>, schema: &Schema) -> Result<Vec<u8>> {
    let value = AvroValue::from(Value::Object(record.clone()))
        .resolve(schema)
        .map_err(|e| CodecError::encode("Avro", format!("record does not match schema: {e}")))?;
    Ok(to_avro_datum(schema, value)?)
}

/// Decode an Avro binary datum into a JSON value.
///
/// The datum must span the whole of `bytes`; leftover bytes are a
/// `CodecError::ParseError`.
pub fn decode_record(mut bytes: &[u8], schema: &Schema) -> Result<Value> {
    let value = from_avro_datum(schema, &mut bytes, None)?;
    if !bytes.is_empty() {
        return Err(CodecError::parse(
            "avro datum",
            format!("{} trailing bytes after record", bytes.len()),
        ));
    }
    Value::try_from(value).map_err(|e| CodecError::encode("Avro", format!("{e}")))
}

/// Top-level field names of a record schema; empty for other schema types.
pub fn record_field_names(schema: &Schema) -> Vec<&str> {
    match schema {
        Schema::Record(RecordSchema { fields, .. }) => {
            fields.iter().map(|field| field.name.as_str()).collect()
        }
        _ => Vec::new(),
    }
}
