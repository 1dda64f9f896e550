// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec configuration.
//!
//! A [`CodecConfig`] is built once per codec instance, usually from a TOML
//! file, and shared by reference with every component.
//!
//! ```toml
//! endpoint = "https://registry.internal:8081"
//! subject_name = "events-value"
//! schema_uri = "/etc/avrocodec/event.avsc"
//! register_schema = true
//! binary_encoded = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::{CodecError, Result};
use crate::registry::SchemaVersion;

/// Default metadata namespace for shipping-label fields.
pub const DEFAULT_METADATA_NAMESPACE: &str = "shipping_label";

/// Certificate verification mode for registry TLS connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Verify the registry's certificate chain
    #[default]
    Peer,
    /// Accept any certificate
    None,
}

/// Options recognised by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Schema registry base URL
    pub endpoint: String,
    /// Basic-auth user for the registry
    pub username: Option<String>,
    /// Basic-auth password for the registry
    pub password: Option<String>,

    /// Fixed write schema id; skips every registry lookup when set
    pub schema_id: Option<u32>,
    /// Registry subject for the write schema
    pub subject_name: Option<String>,
    /// Subject version to encode with
    pub schema_version: Option<SchemaVersion>,
    /// Inline schema definition
    pub schema_string: Option<String>,
    /// Local path, `file://` or `http(s)://` URI of a schema definition
    pub schema_uri: Option<String>,
    /// Check the loaded definition against the subject's compatibility rules
    pub check_compatibility: bool,
    /// Register the loaded definition if the subject does not have it yet
    pub register_schema: bool,

    /// Emit raw bytes; base64 text when false
    pub binary_encoded: bool,

    /// PEM client certificate for mutual TLS
    pub client_certificate: Option<PathBuf>,
    /// PEM private key for mutual TLS
    pub client_key: Option<PathBuf>,
    /// PEM CA certificate to trust
    pub ca_certificate: Option<PathBuf>,
    /// Certificate verification mode
    pub verify_mode: VerifyMode,

    /// Metadata object holding shipping-label fields
    pub metadata_namespace: String,

    /// Per-request timeout for registry and schema URI requests
    pub request_timeout_ms: u64,
    /// Retries after a failed registry request
    pub max_retries: u32,
    /// Backoff before the first retry, doubled for each further retry
    pub retry_backoff_ms: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8081".to_string(),
            username: None,
            password: None,
            schema_id: None,
            subject_name: None,
            schema_version: None,
            schema_string: None,
            schema_uri: None,
            check_compatibility: false,
            register_schema: false,
            binary_encoded: true,
            client_certificate: None,
            client_key: None,
            ca_certificate: None,
            verify_mode: VerifyMode::Peer,
            metadata_namespace: DEFAULT_METADATA_NAMESPACE.to_string(),
            request_timeout_ms: 10_000,
            max_retries: 3,
            retry_backoff_ms: 100,
        }
    }
}

/// Where the schema definition for encoding comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinition {
    /// Definition given inline
    Inline(String),
    /// Definition to load from a path or URI
    Uri(String),
}

/// How the write schema id is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Use this id verbatim
    Id(u32),
    /// Use the id of a subject version
    SubjectVersion {
        /// Registry subject
        subject: String,
        /// Version within the subject
        version: SchemaVersion,
    },
    /// Resolve a definition against a subject
    Definition {
        /// Registry subject
        subject: String,
        /// Definition source
        definition: SchemaDefinition,
    },
}

impl CodecConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CodecError::config(format!("invalid configuration: {e}")))
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CodecError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check option combinations up front.
    ///
    /// The write-schema resolver performs the same checks lazily; calling
    /// this at startup reports configuration mistakes before the first
    /// message is encoded.
    pub fn validate(&self) -> Result<()> {
        if self.client_certificate.is_some() != self.client_key.is_some() {
            return Err(CodecError::config(
                "client_certificate and client_key must be set together",
            ));
        }
        if self.metadata_namespace.is_empty() {
            return Err(CodecError::config("metadata_namespace must not be empty"));
        }
        self.schema_source().map(|_| ())
    }

    /// Map the schema selection options onto a [`SchemaSource`].
    ///
    /// Precedence: `schema_id`, then `subject_name` with `schema_version`,
    /// then `subject_name` with `schema_string`, then `subject_name` with
    /// `schema_uri`.
    pub fn schema_source(&self) -> Result<SchemaSource> {
        if let Some(id) = self.schema_id {
            return Ok(SchemaSource::Id(id));
        }

        let subject = self
            .subject_name
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CodecError::config("subject_name is required when schema_id is not set"))?;

        if let Some(version) = self.schema_version {
            return Ok(SchemaSource::SubjectVersion { subject, version });
        }

        let definition = match (&self.schema_string, &self.schema_uri) {
            (Some(inline), _) => SchemaDefinition::Inline(inline.clone()),
            (None, Some(uri)) => SchemaDefinition::Uri(uri.clone()),
            (None, None) => {
                return Err(CodecError::config(
                    "one of schema_version, schema_string or schema_uri is required with subject_name",
                ))
            }
        };
        Ok(SchemaSource::Definition {
            subject,
            definition,
        })
    }
}
