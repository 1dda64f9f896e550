// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Host event model.
//!
//! An [`Event`] is a JSON object body plus a separate metadata object that is
//! never serialized with the body. Nested fields are addressed by path
//! segments, e.g. `&["host", "name"]`.

use serde_json::{Map, Value};

use super::error::{CodecError, Result};

/// Name of the field holding event tags.
pub const TAGS_FIELD: &str = "tags";

/// Pipeline event: a JSON body and out-of-band metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    fields: Map<String, Value>,
    metadata: Map<String, Value>,
}

impl Event {
    /// Create an empty event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an event from a body object.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            metadata: Map::new(),
        }
    }

    /// Parse an event body from JSON text. The text must hold an object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| CodecError::parse("event json", format!("{e}")))?;
        match value {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(CodecError::parse(
                "event json",
                format!("expected a JSON object, found {}", json_type_name(&other)),
            )),
        }
    }

    /// Serialize the body (not the metadata) to compact JSON text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.fields)
            .map_err(|e| CodecError::encode("JSON", format!("{e}")))
    }

    /// Event body.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Event metadata.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Look up a body field.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.fields, path)
    }

    /// Look up a body field holding a string.
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Set a body field, creating intermediate objects as needed.
    pub fn set(&mut self, path: &[&str], value: impl Into<Value>) {
        insert(&mut self.fields, path, value.into());
    }

    /// Remove a body field.
    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        remove(&mut self.fields, path)
    }

    /// Look up a metadata field.
    pub fn get_metadata(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.metadata, path)
    }

    /// Set a metadata field, creating intermediate objects as needed.
    pub fn set_metadata(&mut self, path: &[&str], value: impl Into<Value>) {
        insert(&mut self.metadata, path, value.into());
    }

    /// Tags attached to this event.
    pub fn tags(&self) -> Vec<&str> {
        match self.fields.get(TAGS_FIELD) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(tag)) => vec![tag.as_str()],
            _ => Vec::new(),
        }
    }

    /// Check whether a tag is attached.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    /// Attach a tag. Adding an existing tag is a no-op.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return;
        }
        let mut tags: Vec<Value> = match self.fields.remove(TAGS_FIELD) {
            Some(Value::Array(items)) => items,
            Some(Value::String(existing)) => vec![Value::String(existing)],
            _ => Vec::new(),
        };
        tags.push(Value::String(tag));
        self.fields.insert(TAGS_FIELD.to_string(), Value::Array(tags));
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = map.get(*first)?;
    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

fn insert(map: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = map;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(inner) => inner,
            _ => return,
        };
    }
    current.insert(last.to_string(), value);
}

fn remove(map: &mut Map<String, Value>, path: &[&str]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    let mut current = map;
    for segment in parents {
        current = current.get_mut(*segment)?.as_object_mut()?;
    }
    current.remove(*last)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
