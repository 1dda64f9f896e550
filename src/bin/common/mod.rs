// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use anyhow::Context as _;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use avrocodec::{AvroCodec, CodecConfig, Event};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Key under which event metadata is printed and read.
pub const METADATA_KEY: &str = "@metadata";

/// Install the stderr log subscriber, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Build a codec from a TOML configuration file.
pub fn load_codec(config: &Path) -> Result<AvroCodec> {
    let config = CodecConfig::from_file(config)?;
    Ok(AvroCodec::from_config(config)?)
}

/// Open a file, or stdin when no path is given.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Read a whole input as bytes.
pub fn read_all(path: Option<&Path>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    open_input(path)?.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Render an event as a JSON object, optionally with its metadata.
pub fn event_to_value(event: &Event, include_metadata: bool) -> Value {
    let mut fields = event.fields().clone();
    if include_metadata && !event.metadata().is_empty() {
        fields.insert(
            METADATA_KEY.to_string(),
            Value::Object(event.metadata().clone()),
        );
    }
    Value::Object(fields)
}

/// Parse a JSON line into an event, moving `@metadata` into metadata.
pub fn event_from_line(line: &str) -> Result<Event> {
    let mut fields: Map<String, Value> =
        serde_json::from_str(line).context("expected a JSON object per line")?;
    let metadata = fields.remove(METADATA_KEY);
    let mut event = Event::from_fields(fields);
    if let Some(Value::Object(metadata)) = metadata {
        for (key, value) in metadata {
            event.set_metadata(&[key.as_str()], value);
        }
    }
    Ok(event)
}
