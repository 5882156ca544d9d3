//! Error taxonomy for the chunked execution core.
//!
//! Every fallible operation in this crate returns [`Result`]. Errors
//! propagate to the engine's caller unchanged; there is no retry and no
//! partial-completion mode.

use thiserror::Error;

/// Convenience alias used throughout the core.
pub type Result<T> = std::result::Result<T, QocError>;

/// All failure kinds surfaced by the chunked execution core.
#[derive(Debug, Error)]
pub enum QocError {
    /// The `(Q, NP, NL)` triple is inconsistent, e.g. `NL > NP` or `NP > Q`.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A wrapper operation was invoked before a circuit was bound.
    #[error("no circuit bound to the wrapper")]
    WrapperUnset,

    /// A gate references classical bits; the chunked execution path is
    /// purely unitary.
    #[error("classical operation `{0}` is not supported in chunked execution")]
    ClassicalUnsupported(&'static str),

    /// A sub-circuit (or a single gate) needs more active qubits than the
    /// configuration allows.
    #[error(
        "sub-circuit needs {needed} active qubits but only {available} fit in primary storage"
    )]
    PartitioningOverflow { needed: usize, available: usize },

    /// The touched-qubit set reaching the manager is smaller than the local
    /// qubit set. This is a partitioner invariant violation.
    #[error("sub-circuit touches {got} qubits, fewer than the {need} local qubits")]
    InsufficientTouchedQubits { got: usize, need: usize },

    /// A computed chunk slice index fell outside the chunk. Internal
    /// invariant violation, fatal.
    #[error("chunk slice {isub} out of range, chunk holds {max} storage units")]
    ChunkMisaligned { isub: usize, max: usize },

    /// Reading or writing a storage unit against the backing store failed.
    #[error("storage unit {unit}: {source}")]
    StorageIo {
        unit: usize,
        #[source]
        source: std::io::Error,
    },

    /// The external dense simulator broke its contract (wrong output
    /// length or failed status).
    #[error("simulator returned {actual} amplitudes, expected {expected}")]
    SimulatorContract { expected: usize, actual: usize },

    /// Aggregated failure from the parallel executor: at least one worker
    /// task returned an error.
    #[error(
        "{} of {total} parallel tasks failed, first: {}",
        .messages.len(),
        .messages.first().map(|m| m.as_str()).unwrap_or("<none>")
    )]
    TaskFailure { total: usize, messages: Vec<String> },
}
