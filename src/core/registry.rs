// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema cache keyed by registry-assigned schema id.
//!
//! Schemas are immutable and the registry never reuses an id, so entries are
//! kept for the lifetime of the cache with no expiry or invalidation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use apache_avro::Schema;
use tracing::debug;

use super::error::{CodecError, Result};
use crate::encoding::avro;
use crate::registry::SchemaRegistry;

/// Thread-safe cache of parsed Avro schemas.
///
/// Hits are served under a read lock with no registry access. A miss takes
/// a fetch lock for that id only, so concurrent callers asking for the same
/// unseen id trigger a single registry fetch while lookups of other ids go
/// on unblocked.
#[derive(Default)]
pub struct SchemaCache {
    schemas: RwLock<HashMap<u32, Arc<Schema>>>,
    fetching: Mutex<HashMap<u32, Arc<Mutex<()>>>>,
}

impl SchemaCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a schema by id, fetching and parsing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::RegistryFetch` if the registry is unreachable or
    /// does not know the id, and `CodecError::ParseError` if the returned
    /// definition is not a valid Avro schema. Failures are not cached.
    pub fn get_schema<R>(&self, id: u32, registry: &R) -> Result<Arc<Schema>>
    where
        R: SchemaRegistry + ?Sized,
    {
        if let Some(schema) = self.lookup(id)? {
            return Ok(schema);
        }

        let slot = {
            let mut fetching = self.fetching.lock().map_err(poisoned)?;
            Arc::clone(fetching.entry(id).or_default())
        };
        let _guard = slot.lock().map_err(poisoned)?;

        // Another caller may have finished the fetch while we waited.
        if let Some(schema) = self.lookup(id)? {
            return Ok(schema);
        }

        let definition = registry.fetch_schema_by_id(id)?;
        let schema = Arc::new(avro::parse_schema(&definition)?);
        self.schemas
            .write()
            .map_err(poisoned)?
            .insert(id, Arc::clone(&schema));
        self.fetching.lock().map_err(poisoned)?.remove(&id);
        debug!(context = "schema_cache", schema_id = id, "Cached schema");
        Ok(schema)
    }

    fn lookup(&self, id: u32) -> Result<Option<Arc<Schema>>> {
        let schemas = self.schemas.read().map_err(poisoned)?;
        Ok(schemas.get(&id).cloned())
    }

    /// Check if a schema id is cached.
    pub fn contains(&self, id: u32) -> Result<bool> {
        let schemas = self.schemas.read().map_err(poisoned)?;
        Ok(schemas.contains_key(&id))
    }

    /// Get all cached schema ids, sorted.
    pub fn ids(&self) -> Result<Vec<u32>> {
        let schemas = self.schemas.read().map_err(poisoned)?;
        let mut ids: Vec<u32> = schemas.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Get the number of cached schemas.
    pub fn len(&self) -> Result<usize> {
        let schemas = self.schemas.read().map_err(poisoned)?;
        Ok(schemas.len())
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> CodecError {
    CodecError::Other(format!("Schema cache lock poisoned: {e}"))
}
