//! Output of collected macros

use iocscan_core::CandidateMacro;
use std::io::{self, Write};

/// Write one line per macro: its token spellings as a bracketed list
pub fn write_macros<W: Write>(out: &mut W, macros: &[CandidateMacro]) -> io::Result<()> {
    for mac in macros {
        writeln!(out, "{}", mac)?;
    }
    out.flush()
}
