// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Avrocodec
//!
//! Message codec for a schema-registry governed Avro wire format.
//!
//! Messages on the queue are framed as a magic byte, a big-endian schema id
//! and an Avro binary datum, optionally carried as base64 text. Every record
//! carries a fixed set of shipping-label fields (routing and provenance)
//! next to its payload.
//!
//! ## Architecture
//!
//! - `core/` - Error taxonomy, host event model, schema cache
//! - `registry/` - Schema registry client trait and HTTP implementation
//! - `encoding/` - Frame codec, Avro datum encoding, shipping-label projection
//! - `codec/` - [`AvroCodec`] and the write-schema resolver
//! - `config` - [`CodecConfig`] loaded from TOML
//!
//! ## Example: Decoding
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use avrocodec::{AvroCodec, CodecConfig};
//!
//! let codec = AvroCodec::from_config(CodecConfig {
//!     endpoint: "http://registry:8081".to_string(),
//!     schema_id: Some(7),
//!     ..CodecConfig::default()
//! })?;
//! let event = codec.decode(b"AAAAAAcG...")?;
//! println!("{}", event.to_json()?);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use crate::core::{CodecError, Event, Result, SchemaCache};

// Configuration
pub mod config;

pub use config::{CodecConfig, SchemaDefinition, SchemaSource, VerifyMode};

// Schema registry clients
pub mod registry;

pub use registry::{HttpSchemaRegistry, RetryPolicy, SchemaRegistry, SchemaVersion};

// Framing, Avro and shipping-label projection
pub mod encoding;

pub use encoding::{Frame, MessageFormat, ShippingLabel};

// The codec
pub mod codec;

pub use codec::{AvroCodec, WriteSchemaResolver, WriteSchemaState};
