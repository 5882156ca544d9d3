//! Top-level execution driver.
//!
//! The engine wires a wrapped circuit, a partitioner, the storage manager,
//! and a dense simulator together: partition once, initialize storage, then
//! for every sub-circuit stream each chunk through load -> simulate ->
//! store. Sub-circuits run strictly in emission order; chunks run in
//! ascending index order.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info};
use qoc_common::{Amplitude, SimInput};

use crate::error::{QocError, Result};
use crate::manager::SvManager;
use crate::partition::Partitioner;
use crate::storage::StorageBackend;
use crate::wrapper::CircuitWrapper;

/// Capability of a dense state-vector kernel.
///
/// Given an initial amplitude array of length `2^NP` and a gate list over
/// the primary register, returns the evolved array of the same length.
pub trait Simulator {
    fn run(&self, input: SimInput) -> Result<Vec<Amplitude>>;
}

/// Wall-time breakdown of one engine run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReport {
    pub num_subcircuits: usize,
    pub num_chunks: usize,
    pub load_time: Duration,
    pub sim_time: Duration,
    pub store_time: Duration,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sub-circuits: {}", self.num_subcircuits)?;
        writeln!(f, "chunks each:  {}", self.num_chunks)?;
        writeln!(f, "load:  {:?}", self.load_time)?;
        writeln!(f, "sim:   {:?}", self.sim_time)?;
        write!(f, "store: {:?}", self.store_time)
    }
}

/// Out-of-core execution engine.
pub struct Engine<W, P, S, B>
where
    W: CircuitWrapper,
    P: Partitioner,
    S: Simulator,
    B: StorageBackend,
{
    wrapper: W,
    partitioner: P,
    simulator: S,
    manager: SvManager<B>,
}

impl<W, P, S, B> Engine<W, P, S, B>
where
    W: CircuitWrapper,
    P: Partitioner,
    S: Simulator,
    B: StorageBackend,
{
    /// Builds an engine over an already-bound wrapper.
    ///
    /// The manager carries the `(Q, NP, NL)` configuration; the wrapped
    /// circuit must match its qubit count.
    pub fn new(wrapper: W, partitioner: P, simulator: S, manager: SvManager<B>) -> Result<Self> {
        let circuit_qubits = wrapper.num_qubits()?;
        if circuit_qubits != manager.num_qubits() {
            return Err(QocError::Configuration(format!(
                "circuit spans {circuit_qubits} qubits but storage is laid out for {}",
                manager.num_qubits()
            )));
        }
        for gate in wrapper.gates()? {
            if gate.qubits.len() != gate.kind.arity()
                || gate.qubits.iter().any(|&q| q >= circuit_qubits)
            {
                return Err(QocError::Configuration(format!(
                    "gate {} on qubits {:?} is malformed for a {circuit_qubits}-qubit circuit",
                    gate.kind.mnemonic(),
                    gate.qubits
                )));
            }
        }
        Ok(Self {
            wrapper,
            partitioner,
            simulator,
            manager,
        })
    }

    /// Runs the whole circuit chunk by chunk.
    ///
    /// On success the backing store holds the final state vector: the
    /// concatenation of units `0..NSU` in natural basis order.
    pub fn run(&mut self) -> Result<RunReport> {
        let num_primary = self.manager.num_primary();
        let chunk_len = 1usize << num_primary;

        let parts = self.partitioner.run(&self.wrapper)?;
        info!("partitioned circuit into {} sub-circuits", parts.len());

        // A partitioner may emit a sub-circuit around a gate too wide for
        // the primary register (with a warning); chunked execution cannot
        // be correct for it, so refuse before touching storage.
        for sub in &parts {
            if sub.qubits.len() > num_primary {
                return Err(QocError::PartitioningOverflow {
                    needed: sub.qubits.len(),
                    available: num_primary,
                });
            }
        }

        self.manager.initialize()?;

        let mut report = RunReport {
            num_subcircuits: parts.len(),
            num_chunks: self.manager.num_chunks(),
            ..RunReport::default()
        };

        for (isub, sub) in parts.iter().enumerate() {
            debug!(
                "sub-circuit {isub}: {} gates on qubits {:?}",
                sub.circ.gates.len(),
                sub.qubits
            );
            for ichunk in 0..self.manager.num_chunks() {
                self.manager.set_chunk_idx(ichunk)?;

                let start = Instant::now();
                let chunk = self.manager.load_sv(&sub.qubits)?.to_vec();
                report.load_time += start.elapsed();

                let input = self.wrapper.init_from_sv(sub, chunk)?;

                let start = Instant::now();
                let evolved = self.simulator.run(input)?;
                report.sim_time += start.elapsed();

                if evolved.len() != chunk_len {
                    return Err(QocError::SimulatorContract {
                        expected: chunk_len,
                        actual: evolved.len(),
                    });
                }

                let start = Instant::now();
                self.manager.set_chunk(evolved)?;
                self.manager.store_sv(&sub.qubits)?;
                report.store_time += start.elapsed();
            }
        }

        Ok(report)
    }

    /// The storage manager, e.g. to gather the final state vector.
    pub fn manager(&self) -> &SvManager<B> {
        &self.manager
    }
}
