// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout avrocodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error taxonomy for every encode/decode failure
//! - [`Event`] - Host event model (body, metadata, tags)
//! - [`SchemaCache`] - Schema id to parsed schema cache

pub mod error;
pub mod event;
pub mod registry;

pub use error::{CodecError, Result};
pub use event::Event;
pub use registry::SchemaCache;
