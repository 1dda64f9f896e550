// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! One-shot resolution of the schema id used for encoding.
//!
//! The write schema id is resolved on the first encode and memoized for the
//! lifetime of the codec. Resolution runs under a mutex, so concurrent first
//! encodes resolve exactly once.
//!
//! A failed compatibility check is terminal: the state becomes
//! [`WriteSchemaState::Failed`] and every later encode returns the same
//! error. Any other failure (registry unreachable, bad URI) leaves the state
//! unresolved, and the next encode tries again.

use std::fs;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{error, info};

use crate::config::{CodecConfig, SchemaDefinition, SchemaSource};
use crate::core::{CodecError, Result};
use crate::encoding::avro;
use crate::registry::SchemaRegistry;

/// Resolution state of the write schema id.
#[derive(Debug, Clone)]
pub enum WriteSchemaState {
    /// Not resolved yet
    Unresolved,
    /// Resolved; never recomputed
    Resolved(u32),
    /// Resolution failed terminally
    Failed(CodecError),
}

/// Memoizing resolver for the write schema id.
#[derive(Debug)]
pub struct WriteSchemaResolver {
    state: Mutex<WriteSchemaState>,
}

impl Default for WriteSchemaResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteSchemaResolver {
    /// Create an unresolved resolver.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WriteSchemaState::Unresolved),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> Result<WriteSchemaState> {
        let state = self.state.lock().map_err(poisoned)?;
        Ok(state.clone())
    }

    /// Get the write schema id, resolving it on the first call.
    ///
    /// Decision order:
    /// 1. `schema_id`, used verbatim with no registry access
    /// 2. `subject_name` is required from here on
    /// 3. `schema_version`: id of that subject version
    /// 4. definition from `schema_string` or `schema_uri`
    /// 5. with `check_compatibility`, the definition must pass the subject's
    ///    compatibility check
    /// 6. with `register_schema`, the definition is registered unless the
    ///    subject already has it
    /// 7. the definition is verified against the subject for its id
    ///
    /// # Errors
    ///
    /// `CodecError::Config` for missing options, `CodecError::RegistryFetch`
    /// for registry failures, `CodecError::ParseError` for an invalid
    /// definition and `CodecError::SchemaIncompatible` when the check fails.
    pub fn resolve<R>(&self, config: &CodecConfig, registry: &R) -> Result<u32>
    where
        R: SchemaRegistry + ?Sized,
    {
        let mut state = self.state.lock().map_err(poisoned)?;
        match &*state {
            WriteSchemaState::Resolved(id) => return Ok(*id),
            WriteSchemaState::Failed(e) => return Err(e.clone()),
            WriteSchemaState::Unresolved => {}
        }

        match resolve_id(config, registry) {
            Ok(id) => {
                info!(context = "write_schema", schema_id = id, "Resolved write schema");
                *state = WriteSchemaState::Resolved(id);
                Ok(id)
            }
            Err(e @ CodecError::SchemaIncompatible { .. }) => {
                error!(
                    context = "write_schema",
                    error = %e,
                    "Write schema failed compatibility check, encoding disabled"
                );
                *state = WriteSchemaState::Failed(e.clone());
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

fn resolve_id<R>(config: &CodecConfig, registry: &R) -> Result<u32>
where
    R: SchemaRegistry + ?Sized,
{
    let (subject, definition) = match config.schema_source()? {
        SchemaSource::Id(id) => return Ok(id),
        SchemaSource::SubjectVersion { subject, version } => {
            return registry.subject_version_id(&subject, version)
        }
        SchemaSource::Definition {
            subject,
            definition,
        } => (subject, definition),
    };

    let timeout = Duration::from_millis(config.request_timeout_ms);
    let definition = load_definition(&definition, timeout)?;
    avro::parse_schema(&definition)?;

    if config.check_compatibility && !registry.is_compatible(&subject, &definition)? {
        return Err(CodecError::incompatible(subject));
    }

    if config.register_schema && !registry.is_registered(&subject, &definition)? {
        let id = registry.register_schema(&subject, &definition)?;
        info!(
            context = "write_schema",
            subject = %subject,
            schema_id = id,
            "Registered write schema"
        );
    }

    registry.verify_schema(&subject, &definition)
}

/// Load a schema definition from its configured source.
///
/// URIs may be `http://` or `https://` (fetched with `timeout`), `file://`,
/// or a plain filesystem path.
pub fn load_definition(definition: &SchemaDefinition, timeout: Duration) -> Result<String> {
    let uri = match definition {
        SchemaDefinition::Inline(text) => return Ok(text.clone()),
        SchemaDefinition::Uri(uri) => uri,
    };

    if uri.starts_with("http://") || uri.starts_with("https://") {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CodecError::config(format!("failed to build HTTP client: {e}")))?;
        return client
            .get(uri)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| CodecError::config(format!("cannot fetch schema_uri {uri}: {e}")));
    }

    let path = uri.strip_prefix("file://").unwrap_or(uri);
    fs::read_to_string(path)
        .map_err(|e| CodecError::config(format!("cannot read schema_uri {uri}: {e}")))
}

fn poisoned<E: std::fmt::Display>(e: E) -> CodecError {
    CodecError::Other(format!("Write schema lock poisoned: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaVersion;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SCHEMA: &str = r#"{"type":"record","name":"E","fields":[{"name":"message","type":"string"}]}"#;

    /// Registry that panics on any access.
    struct Unreachable;

    impl SchemaRegistry for Unreachable {
        fn fetch_schema_by_id(&self, _: u32) -> Result<String> {
            panic!("registry accessed")
        }
        fn subject_version_id(&self, _: &str, _: SchemaVersion) -> Result<u32> {
            panic!("registry accessed")
        }
        fn is_compatible(&self, _: &str, _: &str) -> Result<bool> {
            panic!("registry accessed")
        }
        fn is_registered(&self, _: &str, _: &str) -> Result<bool> {
            panic!("registry accessed")
        }
        fn register_schema(&self, _: &str, _: &str) -> Result<u32> {
            panic!("registry accessed")
        }
        fn verify_schema(&self, _: &str, _: &str) -> Result<u32> {
            panic!("registry accessed")
        }
    }

    /// Registry whose subject has one incompatible definition.
    struct Rejecting {
        checks: AtomicUsize,
    }

    impl SchemaRegistry for Rejecting {
        fn fetch_schema_by_id(&self, _: u32) -> Result<String> {
            unreachable!()
        }
        fn subject_version_id(&self, _: &str, _: SchemaVersion) -> Result<u32> {
            unreachable!()
        }
        fn is_compatible(&self, _: &str, _: &str) -> Result<bool> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
        fn is_registered(&self, _: &str, _: &str) -> Result<bool> {
            unreachable!()
        }
        fn register_schema(&self, _: &str, _: &str) -> Result<u32> {
            unreachable!()
        }
        fn verify_schema(&self, _: &str, _: &str) -> Result<u32> {
            unreachable!()
        }
    }

    #[test]
    fn test_explicit_id_skips_registry() {
        let config = CodecConfig {
            schema_id: Some(12),
            ..CodecConfig::default()
        };
        let resolver = WriteSchemaResolver::new();
        assert_eq!(resolver.resolve(&config, &Unreachable).unwrap(), 12);
        assert!(matches!(
            resolver.state().unwrap(),
            WriteSchemaState::Resolved(12)
        ));
    }

    #[test]
    fn test_missing_subject_is_config_error_and_retryable() {
        let resolver = WriteSchemaResolver::new();
        let err = resolver
            .resolve(&CodecConfig::default(), &Unreachable)
            .unwrap_err();
        assert!(matches!(err, CodecError::Config { .. }));
        assert!(matches!(
            resolver.state().unwrap(),
            WriteSchemaState::Unresolved
        ));
    }

    #[test]
    fn test_incompatible_is_terminal() {
        let config = CodecConfig {
            subject_name: Some("events-value".into()),
            schema_string: Some(SCHEMA.into()),
            check_compatibility: true,
            ..CodecConfig::default()
        };
        let registry = Rejecting {
            checks: AtomicUsize::new(0),
        };
        let resolver = WriteSchemaResolver::new();

        for _ in 0..3 {
            let err = resolver.resolve(&config, &registry).unwrap_err();
            assert!(matches!(err, CodecError::SchemaIncompatible { .. }));
        }
        assert_eq!(registry.checks.load(Ordering::SeqCst), 1);
        assert!(matches!(
            resolver.state().unwrap(),
            WriteSchemaState::Failed(_)
        ));
    }

    #[test]
    fn test_invalid_inline_definition() {
        let config = CodecConfig {
            subject_name: Some("s".into()),
            schema_string: Some("{".into()),
            ..CodecConfig::default()
        };
        let err = WriteSchemaResolver::new()
            .resolve(&config, &Unreachable)
            .unwrap_err();
        assert!(matches!(err, CodecError::ParseError { .. }));
    }

    #[test]
    fn test_load_definition_from_path_and_file_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.avsc");
        fs::write(&path, SCHEMA).unwrap();
        let timeout = Duration::from_secs(1);

        let plain = SchemaDefinition::Uri(path.display().to_string());
        assert_eq!(load_definition(&plain, timeout).unwrap(), SCHEMA);

        let file_uri = SchemaDefinition::Uri(format!("file://{}", path.display()));
        assert_eq!(load_definition(&file_uri, timeout).unwrap(), SCHEMA);

        let missing = SchemaDefinition::Uri(dir.path().join("nope").display().to_string());
        assert!(matches!(
            load_definition(&missing, timeout),
            Err(CodecError::Config { .. })
        ));
    }
}
