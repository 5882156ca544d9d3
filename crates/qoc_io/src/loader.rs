//! Circuit file loading and saving.

use std::path::Path;

use anyhow::{Context, Result};
use qoc_common::Circuit;

use crate::parser::{format_circuit, parse_circuit};

/// Loads and parses a circuit file.
pub fn load_circuit<P: AsRef<Path>>(path: P) -> Result<Circuit> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read circuit file {}", path.display()))?;
    parse_circuit(&source).with_context(|| format!("failed to parse {}", path.display()))
}

/// Writes a circuit out in the text format.
pub fn save_circuit<P: AsRef<Path>>(path: P, circ: &Circuit) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, format_circuit(circ))
        .with_context(|| format!("failed to write circuit file {}", path.display()))
}
