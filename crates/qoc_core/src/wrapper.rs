//! Backend-neutral view of an input circuit.
//!
//! The engine and the partitioners never touch a frontend circuit type
//! directly; they go through the [`CircuitWrapper`] capability, which exposes
//! the qubit count, the gate sequence, per-gate qubit sets, sub-circuit
//! construction, and initial-state injection. [`NativeWrapper`] implements it
//! for the plain IR in `qoc_common`.

use std::collections::BTreeSet;

use qoc_common::{Amplitude, Circuit, Gate, SimInput};

use crate::error::{QocError, Result};

/// A gate list restricted to at most `NP` qubits, with its qubit remapping.
///
/// `qubits` is the sorted set of original qubit indices the sub-circuit
/// touches; position `i` of this list is qubit `i` of the remapped `circ`.
/// The low `NL` qubits are always present, so the chunk layout is uniform
/// across sub-circuits.
#[derive(Debug, Clone)]
pub struct SubCircuit {
    /// Remapped circuit over the primary register.
    pub circ: Circuit,
    /// Sorted original qubit indices (the touched set).
    pub qubits: Vec<usize>,
}

/// Capability set an input-circuit adapter must provide.
pub trait CircuitWrapper {
    /// Qubit count of the bound circuit.
    fn num_qubits(&self) -> Result<usize>;

    /// Ordered gate sequence of the bound circuit.
    fn gates(&self) -> Result<&[Gate]>;

    /// All qubits a gate acts on, controls and targets alike.
    fn qubits_of(&self, gate: &Gate) -> BTreeSet<usize> {
        gate.qubits.iter().copied().collect()
    }

    /// Builds a sub-circuit over `num_primary` qubits from `gates`.
    ///
    /// The touched set is `{0..num_local-1}` united with every gate's
    /// qubits; each original qubit `q` is renumbered to its rank within the
    /// sorted touched set. Gates referencing classical bits are rejected.
    fn make_subcircuit(
        &self,
        gates: &[Gate],
        num_local: usize,
        num_primary: usize,
    ) -> Result<SubCircuit>;

    /// Builds the input consumed by the dense kernel: the sub-circuit's gate
    /// list with `state` as its starting amplitudes.
    fn init_from_sv(&self, sub: &SubCircuit, state: Vec<Amplitude>) -> Result<SimInput>;
}

/// [`CircuitWrapper`] implementation over the native IR.
///
/// The wrapper starts unbound; every operation before [`NativeWrapper::bind`]
/// fails with [`QocError::WrapperUnset`].
#[derive(Debug, Default)]
pub struct NativeWrapper {
    circ: Option<Circuit>,
}

impl NativeWrapper {
    pub fn new(circ: Circuit) -> Self {
        Self { circ: Some(circ) }
    }

    /// Creates an unbound wrapper; bind a circuit before use.
    pub fn unbound() -> Self {
        Self { circ: None }
    }

    pub fn bind(&mut self, circ: Circuit) {
        self.circ = Some(circ);
    }

    fn circ(&self) -> Result<&Circuit> {
        self.circ.as_ref().ok_or(QocError::WrapperUnset)
    }
}

impl CircuitWrapper for NativeWrapper {
    fn num_qubits(&self) -> Result<usize> {
        Ok(self.circ()?.num_qubits)
    }

    fn gates(&self) -> Result<&[Gate]> {
        Ok(&self.circ()?.gates)
    }

    fn make_subcircuit(
        &self,
        gates: &[Gate],
        num_local: usize,
        num_primary: usize,
    ) -> Result<SubCircuit> {
        self.circ()?;

        let mut qset: BTreeSet<usize> = (0..num_local).collect();
        for gate in gates {
            if gate.kind.is_classical() {
                return Err(QocError::ClassicalUnsupported(gate.kind.mnemonic()));
            }
            qset.extend(gate.qubits.iter().copied());
        }
        let qubits: Vec<usize> = qset.into_iter().collect();

        // rank of each original qubit within the sorted touched set
        let rank = |q: usize| qubits.iter().position(|&r| r == q).unwrap();

        let mut circ = Circuit::new(num_primary);
        for gate in gates {
            let remapped: Vec<usize> = gate.qubits.iter().map(|&q| rank(q)).collect();
            circ.push(Gate::new(gate.kind, gate.params.clone(), remapped));
        }

        Ok(SubCircuit { circ, qubits })
    }

    fn init_from_sv(&self, sub: &SubCircuit, state: Vec<Amplitude>) -> Result<SimInput> {
        self.circ()?;
        Ok(SimInput::new(state, sub.circ.clone()))
    }
}
