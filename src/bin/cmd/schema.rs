// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - registry lookups.

use std::path::PathBuf;

use clap::Subcommand;

use avrocodec::SchemaRegistry;

use crate::common::{load_codec, Result};

/// Schema registry operations.
#[derive(Subcommand, Clone, Debug)]
pub enum SchemaCmd {
    /// Fetch and print a schema definition by id
    Show {
        /// Codec configuration (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Registry schema id
        #[arg(value_name = "ID")]
        id: u32,
    },

    /// Print the write schema id the configuration resolves to
    Resolve {
        /// Codec configuration (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
}

impl SchemaCmd {
    pub fn run(self) -> Result<()> {
        match self {
            SchemaCmd::Show { config, id } => cmd_show(config, id),
            SchemaCmd::Resolve { config } => cmd_resolve(config),
        }
    }
}

/// Cmd: Show a schema
fn cmd_show(config: PathBuf, id: u32) -> Result<()> {
    let codec = load_codec(&config)?;
    let definition = codec.registry().fetch_schema_by_id(id)?;

    // Pretty-print when the definition is valid JSON.
    match serde_json::from_str::<serde_json::Value>(&definition) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{definition}"),
    }
    Ok(())
}

/// Cmd: Resolve the write schema id
fn cmd_resolve(config: PathBuf) -> Result<()> {
    let codec = load_codec(&config)?;
    println!("{}", codec.write_schema_id()?);
    Ok(())
}
