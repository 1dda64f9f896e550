// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire envelope framing.
//!
//! ```text
//! byte 0      magic byte, always 0x00
//! bytes 1..5  schema id, big-endian u32
//! bytes 5..   Avro binary datum
//! ```
//!
//! The whole frame may additionally be carried as base64 text (standard
//! alphabet, padded).
//!
//! # Dual-mode input
//!
//! [`decode_frame`] accepts both forms without being told which one it got:
//! it attempts base64 first and falls back to raw bytes. This keeps
//! producers that emit either form readable by the same consumer. The check
//! cannot misfire on a raw frame because its first byte, `0x00`, is not part
//! of the base64 alphabet.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::trace;

use crate::core::{CodecError, Result};

/// Marker byte identifying the envelope format version.
pub const MAGIC_BYTE: u8 = 0x00;

/// Magic byte plus schema id.
pub const HEADER_LEN: usize = 5;

/// Decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Registry id of the writer schema
    pub schema_id: u32,
    /// Avro binary datum
    pub body: Vec<u8>,
}

/// Build an envelope around an Avro body.
///
/// When `binary` is false the result is the base64 text of the frame, as
/// bytes.
pub fn encode_frame(schema_id: u32, body: &[u8], binary: bool) -> Result<Vec<u8>> {
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.write_u8(MAGIC_BYTE)?;
    frame.write_u32::<BigEndian>(schema_id)?;
    frame.extend_from_slice(body);

    if binary {
        Ok(frame)
    } else {
        Ok(STANDARD.encode(&frame).into_bytes())
    }
}

/// Split an envelope into schema id and Avro body.
///
/// # Errors
///
/// - `CodecError::FrameTooShort` if the input, or its base64-decoded form,
///   is shorter than [`HEADER_LEN`]
/// - `CodecError::BadMagicByte` if the frame does not start with
///   [`MAGIC_BYTE`]
pub fn decode_frame(input: &[u8]) -> Result<Frame> {
    if input.len() < HEADER_LEN {
        return Err(CodecError::frame_too_short(input.len()));
    }

    let decoded = STANDARD.decode(input.trim_ascii()).ok();
    let frame = match decoded.as_deref() {
        Some(bytes) => {
            trace!(context = "frame", "Input is base64 text");
            bytes
        }
        None => input,
    };

    if frame.len() < HEADER_LEN {
        return Err(CodecError::frame_too_short(frame.len()));
    }

    let mut header = &frame[..HEADER_LEN];
    let magic = header.read_u8()?;
    if magic != MAGIC_BYTE {
        trace!(
            context = "frame",
            header = %hex::encode(&frame[..HEADER_LEN]),
            "Rejected frame header"
        );
        return Err(CodecError::bad_magic_byte(magic));
    }
    let schema_id = header.read_u32::<BigEndian>()?;

    Ok(Frame {
        schema_id,
        body: frame[HEADER_LEN..].to_vec(),
    })
}
