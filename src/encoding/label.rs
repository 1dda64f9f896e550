// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shipping-label projection.
//!
//! Every record on the wire carries six routing/provenance strings next to
//! the payload, whatever the payload's shape:
//!
//! | Field | Fallback when absent |
//! |---|---|
//! | `submitted_from` | host identity fields, then `"local"` |
//! | `originating_host` | host identity fields, then `"local"` |
//! | `vertical` | `"unknown"` |
//! | `environment` | `"unknown"` |
//! | `processing_key` | `"none"` |
//! | `message_format` | `"json"` |
//!
//! On the event side the label lives in metadata under a configurable
//! namespace (`[@metadata][<namespace>][<field>]` in host terms). The
//! payload travels in the `message` field and is interpreted according to
//! `message_format`.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::event::json_type_name;
use crate::core::{CodecError, Event, Result};

/// Shipping-label field names, in wire order.
pub const LABEL_FIELDS: [&str; 6] = [
    "submitted_from",
    "originating_host",
    "vertical",
    "environment",
    "processing_key",
    "message_format",
];

/// Record field carrying the payload.
pub const PAYLOAD_FIELD: &str = "message";

/// Fields never emitted in an outbound record.
pub const EXCLUDE_ALWAYS: [&str; 2] = ["@timestamp", "@version"];

/// Tag added to events whose `message_format` is missing or unrecognised.
pub const FORMAT_WARNING_TAG: &str = "_message_format_unrecognized";

/// Host identity fields consulted, in order, for the host label fields.
const HOST_IDENTITY_FIELDS: [&[&str]; 5] = [
    &["host", "name"],
    &["host", "hostname"],
    &["host"],
    &["beat", "hostname"],
    &["agent", "hostname"],
];

const DEFAULT_HOST: &str = "local";
const DEFAULT_UNKNOWN: &str = "unknown";
const DEFAULT_PROCESSING_KEY: &str = "none";
const DEFAULT_MESSAGE_FORMAT: &str = "json";

/// How the payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFormat {
    /// Payload is the JSON text of an event
    Json,
    /// Payload is opaque bytes
    Binary,
    /// Format missing or unrecognised; payload is plain text
    Plain,
}

impl MessageFormat {
    /// Map a `message_format` value onto a variant.
    ///
    /// Matching is case-insensitive. Absent and unrecognised values map to
    /// [`MessageFormat::Plain`].
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => MessageFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("binary") => MessageFormat::Binary,
            _ => MessageFormat::Plain,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Json => "json",
            MessageFormat::Binary => "binary",
            MessageFormat::Plain => "plain",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing and provenance metadata carried by every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingLabel {
    pub submitted_from: String,
    pub originating_host: String,
    pub vertical: String,
    pub environment: String,
    pub processing_key: String,
    pub message_format: String,
}

impl Default for ShippingLabel {
    fn default() -> Self {
        Self {
            submitted_from: DEFAULT_HOST.to_string(),
            originating_host: DEFAULT_HOST.to_string(),
            vertical: DEFAULT_UNKNOWN.to_string(),
            environment: DEFAULT_UNKNOWN.to_string(),
            processing_key: DEFAULT_PROCESSING_KEY.to_string(),
            message_format: DEFAULT_MESSAGE_FORMAT.to_string(),
        }
    }
}

impl ShippingLabel {
    /// Read the label from event metadata, defaulting each field on its own.
    pub fn from_event(event: &Event, namespace: &str) -> Self {
        let host = host_identity(event);
        let read = |field: &str, fallback: &dyn Fn() -> String| {
            match event.get_metadata(&[namespace, field]).and_then(scalar_text) {
                Some(value) => value,
                None => {
                    let value = fallback();
                    debug!(context = "shipping_label", field, default = %value, "Label field defaulted");
                    value
                }
            }
        };

        Self {
            submitted_from: read("submitted_from", &|| host.clone()),
            originating_host: read("originating_host", &|| host.clone()),
            vertical: read("vertical", &|| DEFAULT_UNKNOWN.to_string()),
            environment: read("environment", &|| DEFAULT_UNKNOWN.to_string()),
            processing_key: read("processing_key", &|| DEFAULT_PROCESSING_KEY.to_string()),
            message_format: read("message_format", &|| DEFAULT_MESSAGE_FORMAT.to_string()),
        }
    }

    /// Parsed `message_format`.
    pub fn format(&self) -> MessageFormat {
        MessageFormat::parse(Some(&self.message_format))
    }

    /// Field name and value pairs, in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            (LABEL_FIELDS[0], self.submitted_from.as_str()),
            (LABEL_FIELDS[1], self.originating_host.as_str()),
            (LABEL_FIELDS[2], self.vertical.as_str()),
            (LABEL_FIELDS[3], self.environment.as_str()),
            (LABEL_FIELDS[4], self.processing_key.as_str()),
            (LABEL_FIELDS[5], self.message_format.as_str()),
        ]
    }
}

fn host_identity(event: &Event) -> String {
    HOST_IDENTITY_FIELDS
        .iter()
        .find_map(|path| event.get_str(path).filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_HOST)
        .to_string()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build the outbound record for an event.
///
/// The record holds the six label fields, the payload, and any other
/// top-level event field named in `schema_fields`. Fields in
/// [`EXCLUDE_ALWAYS`] are dropped.
pub fn project_outbound(
    event: &Event,
    namespace: &str,
    schema_fields: &[&str],
) -> Result<Map<String, Value>> {
    let label = ShippingLabel::from_event(event, namespace);
    let mut record = Map::new();

    for field in schema_fields {
        if *field == PAYLOAD_FIELD || LABEL_FIELDS.contains(field) {
            continue;
        }
        if let Some(value) = event.fields().get(*field) {
            record.insert(field.to_string(), value.clone());
        }
    }

    for (name, value) in label.fields() {
        record.insert(name.to_string(), Value::String(value.to_string()));
    }

    let payload = match label.format() {
        MessageFormat::Binary => event.get(&[PAYLOAD_FIELD]).cloned().ok_or_else(|| {
            CodecError::encode(
                "payload",
                "message_format is binary but the event has no message field",
            )
        })?,
        MessageFormat::Json => Value::String(event.to_json()?),
        MessageFormat::Plain => match event.get_str(&[PAYLOAD_FIELD]) {
            Some(text) => Value::String(text.to_string()),
            None => Value::String(event.to_json()?),
        },
    };
    record.insert(PAYLOAD_FIELD.to_string(), payload);

    for field in EXCLUDE_ALWAYS {
        record.remove(field);
    }

    Ok(record)
}

/// Build an event from a decoded record.
///
/// Label fields present in the record are copied verbatim into metadata
/// under `namespace`; the payload is interpreted by `message_format`.
///
/// # Errors
///
/// - `CodecError::NotImplemented` for `message_format = "binary"`
/// - `CodecError::ParseError` if a JSON payload is missing or malformed, or
///   the record is not an object
pub fn project_inbound(record: Value, namespace: &str) -> Result<Event> {
    let mut record = match record {
        Value::Object(record) => record,
        other => {
            return Err(CodecError::parse(
                "avro record",
                format!("expected a record, found {}", json_type_name(&other)),
            ))
        }
    };

    let format_value = record
        .get("message_format")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let format = MessageFormat::parse(format_value.as_deref());
    let payload = record.remove(PAYLOAD_FIELD).map(bytes_as_text);

    let mut event = match format {
        MessageFormat::Json => json_payload(payload)?,
        MessageFormat::Binary => {
            return Err(CodecError::not_implemented("binary message_format decode"))
        }
        MessageFormat::Plain => {
            warn!(
                context = "shipping_label",
                message_format = format_value.as_deref().unwrap_or("<missing>"),
                "Unrecognized message_format, passing payload through as text"
            );
            let mut event = Event::new();
            event.set(&[PAYLOAD_FIELD], payload.unwrap_or(Value::Null));
            event.add_tag(FORMAT_WARNING_TAG);
            event
        }
    };

    for field in LABEL_FIELDS {
        if let Some(value) = record.remove(field).filter(|v| !v.is_null()) {
            event.set_metadata(&[namespace, field], value);
        }
    }

    Ok(event)
}

/// Turn a `bytes`-typed payload (a JSON array of octets after decoding)
/// into text when it is valid UTF-8. Anything else is returned unchanged.
fn bytes_as_text(payload: Value) -> Value {
    let Value::Array(items) = &payload else {
        return payload;
    };
    let octets: Option<Vec<u8>> = items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect();
    match octets.map(String::from_utf8) {
        Some(Ok(text)) => Value::String(text),
        _ => payload,
    }
}

fn json_payload(payload: Option<Value>) -> Result<Event> {
    let text = match payload {
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(CodecError::parse(
                "json payload",
                format!("expected a string, found {}", json_type_name(&other)),
            ))
        }
        None => return Err(CodecError::parse("json payload", "record has no message field")),
    };

    let body: Value = serde_json::from_str(&text)
        .map_err(|e| CodecError::parse("json payload", format!("{e}")))?;
    match body {
        Value::Object(fields) => Ok(Event::from_fields(fields)),
        scalar => {
            let mut event = Event::new();
            event.set(&[PAYLOAD_FIELD], scalar);
            Ok(event)
        }
    }
}
