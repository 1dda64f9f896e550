// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Avrocodec CLI
//!
//! Encode and decode registry-framed Avro messages from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Decode base64 frames, one per line
//! avrocodec decode --config codec.toml frames.txt
//!
//! # Decode a single raw binary frame
//! avrocodec decode --config codec.toml --raw message.bin
//!
//! # Encode JSON events, one per line
//! avrocodec encode --config codec.toml events.jsonl
//!
//! # Show a schema from the registry
//! avrocodec schema show --config codec.toml 42
//!
//! # Print the write schema id the codec would use
//! avrocodec schema resolve --config codec.toml
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{DecodeCmd, EncodeCmd, SchemaCmd};
use common::Result;

/// Avrocodec - schema-registry Avro message codec
///
/// Messages are framed as a zero magic byte, a big-endian schema id and an
/// Avro body, optionally base64 encoded.
#[derive(Parser, Clone)]
#[command(name = "avrocodec")]
#[command(about = "Encode and decode schema-registry framed Avro messages", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Decode framed messages into JSON events
    Decode(DecodeCmd),

    /// Encode JSON events into framed messages
    Encode(EncodeCmd),

    /// Schema registry operations (show, resolve)
    #[command(subcommand)]
    Schema(SchemaCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode(cmd) => cmd.run(),
        Commands::Encode(cmd) => cmd.run(),
        Commands::Schema(cmd) => cmd.run(),
    }
}

fn main() {
    common::init_tracing();

    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
