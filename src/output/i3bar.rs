//! i3bar protocol output
//!
//! Emits the protocol header once, then an endless JSON array with one status
//! line (an array of blocks) per refresh.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::block::BlockResponse;

/// One i3bar block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct I3barBlock {
    pub name: String,
    pub instance: String,
    pub full_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator_block_width: Option<u32>,
}

/// The protocol header line
pub fn header() -> String {
    serde_json::json!({ "version": 1 }).to_string()
}

/// Converts a response into i3bar blocks, one per colored segment
///
/// Segments are glued together visually: only the last block keeps the
/// separator. The response color applies to segments without their own.
pub fn to_blocks(name: &str, response: &BlockResponse) -> Vec<I3barBlock> {
    let last = response.full_text.len().saturating_sub(1);

    response
        .full_text
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let glued = index != last;
            I3barBlock {
                name: name.to_string(),
                instance: index.to_string(),
                full_text: segment.text.clone(),
                color: segment.color.clone().or_else(|| response.color.clone()),
                separator: glued.then_some(false),
                separator_block_width: glued.then_some(0),
            }
        })
        .collect()
}

/// Writes status lines in the i3bar protocol
pub struct I3barWriter<W: Write> {
    out: W,
    first_line: bool,
}

impl<W: Write> I3barWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            first_line: true,
        }
    }

    /// Writes the header and opens the endless status array
    pub fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", header()).context("Failed to write i3bar header")?;
        writeln!(self.out, "[").context("Failed to write i3bar header")?;
        self.out.flush().context("Failed to flush i3bar output")
    }

    pub fn write_status(&mut self, blocks: &[I3barBlock]) -> Result<()> {
        let line = serde_json::to_string(blocks).context("Failed to serialize i3bar blocks")?;
        let written = if self.first_line {
            writeln!(self.out, "{line}")
        } else {
            writeln!(self.out, ",{line}")
        };
        written.context("Failed to write i3bar status line")?;
        self.first_line = false;
        self.out.flush().context("Failed to flush i3bar output")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
