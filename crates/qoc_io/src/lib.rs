//! I/O utilities for the circuit text format.
//!
//! Provides parsing of the line-oriented circuit description consumed by the
//! host tools, plus file-level load and save helpers. The format is a
//! minimal qasm-flavoured listing: a `qubits N;` header followed by one gate
//! per line.

/// File-level helpers: load a circuit from disk, write one back out.
pub mod loader;

/// Parser for the circuit text format.
pub mod parser;

pub use loader::{load_circuit, save_circuit};
pub use parser::{format_circuit, parse_circuit};
