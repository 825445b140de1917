//! Interactive fallback for arguments left off the command line.
use std::io::{self, BufRead, Write};

use crate::error::WifiBfError;

/// Print `label`, read one line from `input` and return it trimmed. An empty
/// answer or end of input is [`WifiBfError::InvalidInput`].
pub fn ask<R: BufRead, W: Write>(
    label: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String, WifiBfError> {
    let io_err = |e: io::Error| WifiBfError::InvalidInput(format!("{}: {}", label, e));
    write!(output, "[*] {}: ", label).map_err(io_err)?;
    output.flush().map_err(io_err)?;
    let mut line = String::new();
    input.read_line(&mut line).map_err(io_err)?;
    let answer = line.trim();
    if answer.is_empty() {
        return Err(WifiBfError::InvalidInput(format!("{} is required", label)));
    }
    Ok(answer.to_string())
}

/// Use `given` when present, otherwise prompt for it.
pub fn value_or_ask<R: BufRead, W: Write>(
    given: Option<String>,
    label: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String, WifiBfError> {
    match given {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => ask(label, input, output),
    }
}

/// Use `given` when present. Without a terminal to prompt on, a missing
/// value is [`WifiBfError::InvalidInput`].
pub fn require(given: Option<String>, label: &str) -> Result<String, WifiBfError> {
    match given {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(WifiBfError::InvalidInput(format!("{} is required", label))),
    }
}
