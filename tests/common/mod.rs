// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use avrocodec::{CodecError, Result, SchemaRegistry, SchemaVersion};

// ============================================================================
// Schemas
// ============================================================================

/// Shipping-label fields plus a string payload.
pub const LABEL_SCHEMA: &str = r#"{
    "type": "record",
    "name": "LabeledMessage",
    "namespace": "test.avrocodec",
    "fields": [
        {"name": "submitted_from", "type": "string"},
        {"name": "originating_host", "type": "string"},
        {"name": "vertical", "type": "string"},
        {"name": "environment", "type": "string"},
        {"name": "processing_key", "type": "string"},
        {"name": "message_format", "type": "string"},
        {"name": "message", "type": "string"}
    ]
}"#;

/// Label schema with an extra optional `level` field.
pub const LEVEL_SCHEMA: &str = r#"{
    "type": "record",
    "name": "LeveledMessage",
    "namespace": "test.avrocodec",
    "fields": [
        {"name": "submitted_from", "type": "string"},
        {"name": "originating_host", "type": "string"},
        {"name": "vertical", "type": "string"},
        {"name": "environment", "type": "string"},
        {"name": "processing_key", "type": "string"},
        {"name": "message_format", "type": "string"},
        {"name": "message", "type": "string"},
        {"name": "level", "type": ["null", "string"], "default": null}
    ]
}"#;

/// Label schema whose payload is typed as Avro `bytes`.
pub const BYTES_SCHEMA: &str = r#"{
    "type": "record",
    "name": "BytesMessage",
    "namespace": "test.avrocodec",
    "fields": [
        {"name": "submitted_from", "type": "string"},
        {"name": "originating_host", "type": "string"},
        {"name": "vertical", "type": "string"},
        {"name": "environment", "type": "string"},
        {"name": "processing_key", "type": "string"},
        {"name": "message_format", "type": "string"},
        {"name": "message", "type": "bytes"}
    ]
}"#;

// ============================================================================
// In-memory registry
// ============================================================================

/// Schema registry held in memory that counts every call.
#[derive(Default)]
pub struct MemoryRegistry {
    schemas: Mutex<HashMap<u32, String>>,
    subjects: Mutex<HashMap<String, Vec<u32>>>,
    incompatible: AtomicBool,
    next_id: AtomicU32,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            ..Self::default()
        }
    }

    /// Store a definition under a fixed id, outside any subject.
    pub fn with_schema(self, id: u32, definition: &str) -> Self {
        self.schemas
            .lock()
            .unwrap()
            .insert(id, definition.to_string());
        self
    }

    /// Register a definition as the next version of a subject.
    pub fn add_version(&self, subject: &str, definition: &str) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.schemas
            .lock()
            .unwrap()
            .insert(id, definition.to_string());
        self.subjects
            .lock()
            .unwrap()
            .entry(subject.to_string())
            .or_default()
            .push(id);
        id
    }

    /// Make every compatibility check fail.
    pub fn reject_compatibility(&self) {
        self.incompatible.store(true, Ordering::SeqCst);
    }

    /// Forget every schema and subject.
    pub fn clear(&self) {
        self.schemas.lock().unwrap().clear();
        self.subjects.lock().unwrap().clear();
    }

    /// Number of calls made to an operation.
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Number of calls made to any operation.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, operation: &'static str) {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
    }

    fn find(&self, subject: &str, definition: &str) -> Option<u32> {
        let schemas = self.schemas.lock().unwrap();
        let subjects = self.subjects.lock().unwrap();
        subjects.get(subject)?.iter().copied().find(|id| {
            schemas
                .get(id)
                .is_some_and(|existing| existing.trim() == definition.trim())
        })
    }
}

impl SchemaRegistry for MemoryRegistry {
    fn fetch_schema_by_id(&self, id: u32) -> Result<String> {
        self.record("fetch_schema_by_id");
        self.schemas
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| CodecError::registry("fetch_schema_by_id", "Schema not found"))
    }

    fn subject_version_id(&self, subject: &str, version: SchemaVersion) -> Result<u32> {
        self.record("subject_version_id");
        let subjects = self.subjects.lock().unwrap();
        let versions = subjects
            .get(subject)
            .ok_or_else(|| CodecError::registry("subject_version_id", "Subject not found"))?;
        let id = match version {
            SchemaVersion::Latest => versions.last().copied(),
            SchemaVersion::Number(n) => n
                .checked_sub(1)
                .and_then(|index| versions.get(index as usize).copied()),
        };
        id.ok_or_else(|| CodecError::registry("subject_version_id", "Version not found"))
    }

    fn is_compatible(&self, _subject: &str, _definition: &str) -> Result<bool> {
        self.record("is_compatible");
        Ok(!self.incompatible.load(Ordering::SeqCst))
    }

    fn is_registered(&self, subject: &str, definition: &str) -> Result<bool> {
        self.record("is_registered");
        Ok(self.find(subject, definition).is_some())
    }

    fn register_schema(&self, subject: &str, definition: &str) -> Result<u32> {
        self.record("register_schema");
        Ok(self.add_version(subject, definition))
    }

    fn verify_schema(&self, subject: &str, definition: &str) -> Result<u32> {
        self.record("verify_schema");
        self.find(subject, definition)
            .ok_or_else(|| CodecError::registry("verify_schema", "Schema not found"))
    }
}
