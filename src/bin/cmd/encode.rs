// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode command - JSON events to framed messages.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::Args;

use crate::common::{event_from_line, load_codec, open_input, Result};

/// Encode JSON events, one object per line.
///
/// An `@metadata` object on a line becomes event metadata, so shipping-label
/// fields can be given as `{"@metadata": {"shipping_label": {...}}}`.
/// With `binary_encoded = false` each frame is written as a base64 line.
/// Raw frames carry no delimiter, so with `binary_encoded = true` the input
/// must hold exactly one event.
#[derive(Args, Clone, Debug)]
pub struct EncodeCmd {
    /// Codec configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Input file (stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl EncodeCmd {
    pub fn run(self) -> Result<()> {
        let codec = load_codec(&self.config)?;
        let binary = codec.config().binary_encoded;

        let mut out: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
            )),
            None => Box::new(BufWriter::new(io::stdout())),
        };

        let mut written = 0usize;
        for (index, line) in open_input(self.input.as_deref())?.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if binary && written == 1 {
                bail!(
                    "line {}: raw frames cannot be concatenated; encode one event per output or set binary_encoded = false",
                    index + 1
                );
            }

            let event = event_from_line(&line).with_context(|| format!("line {}", index + 1))?;
            let frame = codec
                .encode(&event)
                .with_context(|| format!("line {}", index + 1))?;
            out.write_all(&frame)?;
            if !binary {
                out.write_all(b"\n")?;
            }
            written += 1;
        }

        out.flush()?;
        Ok(())
    }
}
