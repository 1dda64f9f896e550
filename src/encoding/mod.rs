// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message encoding/decoding building blocks.
//!
//! - [`frame`] - Magic byte + schema id envelope, optional base64 text form
//! - [`avro`] - Avro binary datum encoding of JSON records
//! - [`label`] - Shipping-label projection between events and records

pub mod avro;
pub mod frame;
pub mod label;

pub use frame::{decode_frame, encode_frame, Frame, HEADER_LEN, MAGIC_BYTE};
pub use label::{
    project_inbound, project_outbound, MessageFormat, ShippingLabel, FORMAT_WARNING_TAG,
    LABEL_FIELDS,
};
