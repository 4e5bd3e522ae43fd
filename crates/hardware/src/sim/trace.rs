//! Access Trace Loading.
//!
//! This module reads the text traces replayed by the simulator. It provides:
//! 1. **Event model:** Cache reads/writes, invalidations, flushes and branch outcomes.
//! 2. **Line parsing:** One event per line, `#` comments and blank lines ignored.
//! 3. **File loading:** Whole-file loading with line-numbered parse errors.
//!
//! ```text
//! # op  address/pc   [outcome]
//! R     0x80001000
//! W     4096
//! I     0x80001000
//! F
//! B     0x80000004   T
//! J     0x80000010
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::common::error::TraceError;

/// One trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Load from an address.
    Read(u64),
    /// Store to an address.
    Write(u64),
    /// Invalidate the line holding an address.
    Invalidate(u64),
    /// Invalidate the whole cache.
    Flush,
    /// Conditional branch at `pc` with its resolved direction.
    Branch {
        /// Branch PC.
        pc: u64,
        /// Actual direction.
        taken: bool,
    },
    /// Unconditional branch at `pc`.
    Jump(u64),
}

/// Parses a hex (`0x` prefixed) or decimal number.
fn parse_number(text: &str) -> Result<u64, String> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("bad number '{text}': {e}"))
}

impl FromStr for Event {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        let op = fields.next().ok_or("empty event")?;
        let mut operand = || fields.next().ok_or_else(|| format!("'{op}' needs an operand"));

        let event = match op.to_ascii_uppercase().as_str() {
            "R" => Self::Read(parse_number(operand()?)?),
            "W" => Self::Write(parse_number(operand()?)?),
            "I" => Self::Invalidate(parse_number(operand()?)?),
            "F" => Self::Flush,
            "J" => Self::Jump(parse_number(operand()?)?),
            "B" => {
                let pc = parse_number(operand()?)?;
                let taken = match operand()? {
                    "T" | "t" | "1" => true,
                    "N" | "n" | "0" => false,
                    other => return Err(format!("branch outcome must be T or N, got '{other}'")),
                };
                Self::Branch { pc, taken }
            }
            other => return Err(format!("unknown event '{other}'")),
        };

        if let Some(extra) = fields.next() {
            return Err(format!("unexpected trailing field '{extra}'"));
        }
        Ok(event)
    }
}

/// Parses a trace from any buffered reader.
///
/// # Errors
///
/// Returns [`TraceError::Io`] on read failure and [`TraceError::Parse`] with the
/// 1-based line number for the first malformed line.
pub fn parse_trace(reader: impl BufRead) -> Result<Vec<Event>, TraceError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let event = content.parse::<Event>().map_err(|reason| TraceError::Parse {
            line: idx + 1,
            reason,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Loads a trace file from disk.
///
/// # Errors
///
/// Same as [`parse_trace`], plus [`TraceError::Io`] if the file cannot be opened.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<Event>, TraceError> {
    let file = File::open(path)?;
    parse_trace(BufReader::new(file))
}
