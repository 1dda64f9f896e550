// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode command - framed messages to JSON events.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use clap::Args;
use tracing::warn;

use crate::common::{event_to_value, load_codec, open_input, read_all, Result};

/// Decode framed messages.
///
/// Without `--raw`, every non-empty input line is one frame (base64 text or
/// raw bytes). With `--raw` the whole input is a single binary frame.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    /// Codec configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Input file (stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Treat the whole input as one raw binary frame
    #[arg(long)]
    raw: bool,

    /// Include shipping-label metadata under "@metadata"
    #[arg(long)]
    metadata: bool,

    /// Report failed lines on stderr and continue
    #[arg(long)]
    keep_going: bool,
}

impl DecodeCmd {
    pub fn run(self) -> Result<()> {
        let codec = load_codec(&self.config)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();

        if self.raw {
            let bytes = read_all(self.input.as_deref())?;
            let event = codec.decode(&bytes)?;
            writeln!(out, "{}", event_to_value(&event, self.metadata))?;
            return Ok(());
        }

        let mut failures = 0usize;
        for (index, line) in open_input(self.input.as_deref())?.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match codec.decode(line.as_bytes()) {
                Ok(event) => writeln!(out, "{}", event_to_value(&event, self.metadata))?,
                Err(e) if self.keep_going => {
                    failures += 1;
                    warn!(
                        context = "decode",
                        line = index + 1,
                        framing = e.is_framing(),
                        fields = %format_fields(&e.log_fields()),
                        "Skipping message"
                    );
                    eprintln!("line {}: {e}", index + 1);
                }
                Err(e) => return Err(e).with_context(|| format!("line {}", index + 1)),
            }
        }

        if failures > 0 {
            return Err(anyhow!("{failures} message(s) failed to decode"));
        }
        Ok(())
    }
}

fn format_fields(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
