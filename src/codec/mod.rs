// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The codec: events in, framed Avro out, and back.
//!
//! ## Decode path
//!
//! frame → schema cache → Avro datum → shipping-label projection → payload
//!
//! ## Encode path
//!
//! write schema id (once) → schema cache → shipping-label projection →
//! Avro datum → frame
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use avrocodec::{AvroCodec, CodecConfig, Event};
//!
//! let config = CodecConfig::from_file("codec.toml")?;
//! let codec = AvroCodec::from_config(config)?;
//!
//! let event = Event::from_json(r#"{"message": "hello"}"#)?;
//! let frame = codec.encode(&event)?;
//! let decoded = codec.decode(&frame)?;
//! # Ok(())
//! # }
//! ```

pub mod resolver;

use tracing::trace;

use crate::config::CodecConfig;
use crate::core::{Event, Result, SchemaCache};
use crate::encoding::{avro, decode_frame, encode_frame, project_inbound, project_outbound};
use crate::registry::{HttpSchemaRegistry, SchemaRegistry};

pub use resolver::{WriteSchemaResolver, WriteSchemaState};

/// Schema-registry backed Avro codec.
///
/// One instance serves both directions. It is `Send + Sync` when the registry
/// is: the schema cache and the write schema id are guarded internally, so a
/// host may call [`encode`](Self::encode) and [`decode`](Self::decode) from
/// several threads.
pub struct AvroCodec<R = HttpSchemaRegistry> {
    config: CodecConfig,
    registry: R,
    cache: SchemaCache,
    write_schema: WriteSchemaResolver,
}

impl AvroCodec<HttpSchemaRegistry> {
    /// Validate the configuration and connect to the registry it names.
    pub fn from_config(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        let registry = HttpSchemaRegistry::from_config(&config)?;
        Ok(Self::new(config, registry))
    }
}

impl<R: SchemaRegistry> AvroCodec<R> {
    /// Create a codec over an existing registry client.
    pub fn new(config: CodecConfig, registry: R) -> Self {
        Self {
            config,
            registry,
            cache: SchemaCache::new(),
            write_schema: WriteSchemaResolver::new(),
        }
    }

    /// Codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Registry client.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Schema cache shared by both directions.
    pub fn schema_cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Write schema id, resolved on first use.
    pub fn write_schema_id(&self) -> Result<u32> {
        self.write_schema.resolve(&self.config, &self.registry)
    }

    /// Current write schema resolution state.
    pub fn write_schema_state(&self) -> Result<WriteSchemaState> {
        self.write_schema.state()
    }

    /// Decode one message into an event.
    pub fn decode(&self, input: &[u8]) -> Result<Event> {
        let frame = decode_frame(input)?;
        let schema = self.cache.get_schema(frame.schema_id, &self.registry)?;
        let record = avro::decode_record(&frame.body, &schema)?;
        let event = project_inbound(record, &self.config.metadata_namespace)?;
        trace!(
            context = "decode",
            schema_id = frame.schema_id,
            body_len = frame.body.len(),
            "Decoded message"
        );
        Ok(event)
    }

    /// Encode one event into a message.
    pub fn encode(&self, event: &Event) -> Result<Vec<u8>> {
        let schema_id = self.write_schema_id()?;
        let schema = self.cache.get_schema(schema_id, &self.registry)?;
        let fields = avro::record_field_names(&schema);
        let record = project_outbound(event, &self.config.metadata_namespace, &fields)?;
        let body = avro::encode_record(&record, &schema)?;
        trace!(
            context = "encode",
            schema_id,
            body_len = body.len(),
            "Encoded message"
        );
        encode_frame(schema_id, &body, self.config.binary_encoded)
    }
}
