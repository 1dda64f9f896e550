// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for avrocodec.
//!
//! Every failure on the encode and decode paths is surfaced to the caller as a
//! [`CodecError`]. The host pipeline decides whether to retry, dead-letter or
//! abort; the codec never substitutes defaults for schema, compatibility or
//! framing failures.

use std::fmt;

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Missing or contradictory configuration
    Config {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Envelope shorter than the 5-byte header
    FrameTooShort {
        /// Number of bytes available
        length: usize,
    },

    /// Envelope does not start with the expected magic byte
    BadMagicByte {
        /// Byte found at offset 0
        found: u8,
    },

    /// Schema registry could not be reached or rejected the request
    RegistryFetch {
        /// Registry operation (e.g. "fetch_schema_by_id")
        operation: String,
        /// Error message
        message: String,
    },

    /// Schema failed the subject's compatibility check
    SchemaIncompatible {
        /// Subject the schema was checked against
        subject: String,
    },

    /// Code path that is deliberately not implemented
    NotImplemented {
        /// What is not implemented
        feature: String,
    },

    /// Parse error in a schema, payload or field reference
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Encoding/decoding error
    EncodeError {
        /// Codec context (e.g., "Avro", "base64", "IO")
        codec: String,
        /// Error message
        message: String,
    },

    /// Other error
    Other(String),
}

impl CodecError {
    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        CodecError::Config {
            reason: reason.into(),
        }
    }

    /// Create a frame too short error.
    pub fn frame_too_short(length: usize) -> Self {
        CodecError::FrameTooShort { length }
    }

    /// Create a bad magic byte error.
    pub fn bad_magic_byte(found: u8) -> Self {
        CodecError::BadMagicByte { found }
    }

    /// Create a registry fetch error.
    pub fn registry(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::RegistryFetch {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a schema incompatible error.
    pub fn incompatible(subject: impl Into<String>) -> Self {
        CodecError::SchemaIncompatible {
            subject: subject.into(),
        }
    }

    /// Create a not implemented error.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        CodecError::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an encode/decode error.
    pub fn encode(codec: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::EncodeError {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by a malformed envelope.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            CodecError::FrameTooShort { .. } | CodecError::BadMagicByte { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::Config { reason } => vec![("reason", reason.clone())],
            CodecError::FrameTooShort { length } => vec![("length", length.to_string())],
            CodecError::BadMagicByte { found } => vec![("found", format!("0x{found:02x}"))],
            CodecError::RegistryFetch { operation, message } => {
                vec![("operation", operation.clone()), ("message", message.clone())]
            }
            CodecError::SchemaIncompatible { subject } => vec![("subject", subject.clone())],
            CodecError::NotImplemented { feature } => vec![("feature", feature.clone())],
            CodecError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::EncodeError { codec, message } => {
                vec![("codec", codec.clone()), ("message", message.clone())]
            }
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Config { reason } => write!(f, "Configuration error: {reason}"),
            CodecError::FrameTooShort { length } => write!(
                f,
                "Frame too short: {length} bytes, at least 5 bytes required"
            ),
            CodecError::BadMagicByte { found } => {
                write!(f, "Bad magic byte: expected 0x00, found 0x{found:02x}")
            }
            CodecError::RegistryFetch { operation, message } => {
                write!(f, "Schema registry {operation} failed: {message}")
            }
            CodecError::SchemaIncompatible { subject } => {
                write!(f, "Schema is not compatible with subject '{subject}'")
            }
            CodecError::NotImplemented { feature } => {
                write!(f, "Not implemented: '{feature}'")
            }
            CodecError::ParseError { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
            CodecError::EncodeError { codec, message } => {
                write!(f, "{codec} encode error: {message}")
            }
            CodecError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::EncodeError {
            codec: "IO".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<apache_avro::Error> for CodecError {
    fn from(err: apache_avro::Error) -> Self {
        CodecError::EncodeError {
            codec: "Avro".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for avrocodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
