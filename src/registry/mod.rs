// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema registry client abstraction.
//!
//! The codec only needs a handful of registry operations: fetching a schema
//! definition by id, and a few subject-scoped operations used while resolving
//! the write schema. [`SchemaRegistry`] captures exactly those, and
//! [`HttpSchemaRegistry`] implements them against the Confluent REST API.

pub mod http;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::core::{CodecError, Result};

pub use http::{HttpSchemaRegistry, RetryPolicy};

/// Operations the codec needs from a schema registry.
///
/// All methods block until the registry answers or the implementation gives
/// up. Implementations must be shareable between threads.
pub trait SchemaRegistry: Send + Sync {
    /// Fetch the raw schema definition registered under `id`.
    fn fetch_schema_by_id(&self, id: u32) -> Result<String>;

    /// Get the schema id of a specific version of a subject.
    fn subject_version_id(&self, subject: &str, version: SchemaVersion) -> Result<u32>;

    /// Check a definition against the subject's compatibility rules.
    fn is_compatible(&self, subject: &str, definition: &str) -> Result<bool>;

    /// Check whether a definition is already registered under the subject.
    fn is_registered(&self, subject: &str, definition: &str) -> Result<bool>;

    /// Register a definition under the subject, returning its id.
    fn register_schema(&self, subject: &str, definition: &str) -> Result<u32>;

    /// Look up the id of a definition registered under the subject.
    fn verify_schema(&self, subject: &str, definition: &str) -> Result<u32>;
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for Arc<R> {
    fn fetch_schema_by_id(&self, id: u32) -> Result<String> {
        (**self).fetch_schema_by_id(id)
    }

    fn subject_version_id(&self, subject: &str, version: SchemaVersion) -> Result<u32> {
        (**self).subject_version_id(subject, version)
    }

    fn is_compatible(&self, subject: &str, definition: &str) -> Result<bool> {
        (**self).is_compatible(subject, definition)
    }

    fn is_registered(&self, subject: &str, definition: &str) -> Result<bool> {
        (**self).is_registered(subject, definition)
    }

    fn register_schema(&self, subject: &str, definition: &str) -> Result<u32> {
        (**self).register_schema(subject, definition)
    }

    fn verify_schema(&self, subject: &str, definition: &str) -> Result<u32> {
        (**self).verify_schema(subject, definition)
    }
}

/// Version selector within a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawVersion")]
pub enum SchemaVersion {
    /// Most recently registered version
    Latest,
    /// Specific version number
    Number(u32),
}

impl FromStr for SchemaVersion {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("latest") {
            return Ok(SchemaVersion::Latest);
        }
        trimmed.parse::<u32>().map(SchemaVersion::Number).map_err(|_| {
            CodecError::config(format!(
                "invalid schema_version '{s}', expected 'latest' or a version number"
            ))
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Latest => write!(f, "latest"),
            SchemaVersion::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Number(u32),
    Text(String),
}

impl TryFrom<RawVersion> for SchemaVersion {
    type Error = String;

    fn try_from(raw: RawVersion) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawVersion::Number(n) => Ok(SchemaVersion::Number(n)),
            RawVersion::Text(s) => s.parse().map_err(|e: CodecError| e.to_string()),
        }
    }
}
