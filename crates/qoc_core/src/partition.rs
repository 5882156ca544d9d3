//! Circuit partitioning strategies.
//!
//! A partitioner consumes a wrapped circuit and emits an ordered list of
//! [`SubCircuit`]s, each touching at most `NP` distinct qubits with the low
//! `NL` qubits always counted as active. Concatenating the emitted gate
//! lists reproduces the input gate sequence (the dependency-driven
//! partitioner in [`crate::uniq`] may reorder across qubit-disjoint groups).

use std::collections::BTreeSet;

use log::{info, warn};

use crate::error::{QocError, Result};
use crate::wrapper::{CircuitWrapper, SubCircuit};

/// Capability every partitioning strategy provides.
pub trait Partitioner {
    /// Partitions the wrapped circuit into an ordered list of sub-circuits.
    fn run(&self, wrapper: &dyn CircuitWrapper) -> Result<Vec<SubCircuit>>;
}

impl<P: Partitioner + ?Sized> Partitioner for Box<P> {
    fn run(&self, wrapper: &dyn CircuitWrapper) -> Result<Vec<SubCircuit>> {
        (**self).run(wrapper)
    }
}

fn check_dims(num_primary: usize, num_local: usize) -> Result<()> {
    if num_local > num_primary {
        return Err(QocError::Configuration(format!(
            "num_local ({num_local}) exceeds num_primary ({num_primary})"
        )));
    }
    Ok(())
}

/// Greedy linear scan over the original gate order.
///
/// Gates are absorbed into the open sub-circuit while the union of non-local
/// qubits stays within `NP - NL`; the first gate that would overflow flushes
/// the open sub-circuit and starts a new one. Output order equals input
/// order exactly.
#[derive(Debug, Clone, Copy)]
pub struct StaticPartitioner {
    num_primary: usize,
    num_local: usize,
}

impl StaticPartitioner {
    pub fn new(num_primary: usize, num_local: usize) -> Self {
        Self {
            num_primary,
            num_local,
        }
    }
}

impl Partitioner for StaticPartitioner {
    fn run(&self, wrapper: &dyn CircuitWrapper) -> Result<Vec<SubCircuit>> {
        check_dims(self.num_primary, self.num_local)?;
        let budget = self.num_primary - self.num_local;

        let gates = wrapper.gates()?;
        let mut subs = Vec::new();
        let mut open: Vec<qoc_common::Gate> = Vec::new();
        let mut qset: BTreeSet<usize> = BTreeSet::new();

        for gate in gates {
            let qs: BTreeSet<usize> = wrapper
                .qubits_of(gate)
                .into_iter()
                .filter(|&q| q >= self.num_local)
                .collect();

            let merged: BTreeSet<usize> = qset.union(&qs).copied().collect();
            if merged.len() <= budget {
                qset = merged;
                open.push(gate.clone());
            } else {
                if !open.is_empty() {
                    subs.push(wrapper.make_subcircuit(&open, self.num_local, self.num_primary)?);
                }
                if qs.len() > budget {
                    // The gate alone cannot fit; it is still emitted and the
                    // engine refuses to execute the resulting sub-circuit.
                    warn!(
                        "gate {:?} touches {} non-local qubits, more than the {} available",
                        gate.kind,
                        qs.len(),
                        budget
                    );
                }
                open = vec![gate.clone()];
                qset = qs;
            }
        }
        if !open.is_empty() {
            subs.push(wrapper.make_subcircuit(&open, self.num_local, self.num_primary)?);
        }

        info!("static partitioner emitted {} sub-circuits", subs.len());
        Ok(subs)
    }
}

/// One sub-circuit per gate. Diagnostic only: correct whenever each single
/// gate fits within `NP`, but maximizes chunk traffic.
#[derive(Debug, Clone, Copy)]
pub struct BaselinePartitioner {
    num_primary: usize,
    num_local: usize,
}

impl BaselinePartitioner {
    pub fn new(num_primary: usize, num_local: usize) -> Self {
        Self {
            num_primary,
            num_local,
        }
    }
}

impl Partitioner for BaselinePartitioner {
    fn run(&self, wrapper: &dyn CircuitWrapper) -> Result<Vec<SubCircuit>> {
        check_dims(self.num_primary, self.num_local)?;

        let gates = wrapper.gates()?;
        let mut subs = Vec::with_capacity(gates.len());
        for gate in gates {
            let sub = wrapper.make_subcircuit(
                std::slice::from_ref(gate),
                self.num_local,
                self.num_primary,
            )?;
            subs.push(sub);
        }

        info!("baseline partitioner emitted {} sub-circuits", subs.len());
        Ok(subs)
    }
}
