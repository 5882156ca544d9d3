//! Dense in-memory state-vector kernel.
//!
//! This crate is the compute unit behind the core's [`Simulator`]
//! capability: it takes a [`SimInput`] (initial amplitudes plus a gate list
//! over the primary register) and returns the evolved amplitudes. It is
//! also usable stand-alone as a one-shot reference simulator for whole
//! circuits, which is how the equivalence tests check the chunked engine.

pub mod kernels;

use qoc_common::{Amplitude, Circuit, SimInput};
use qoc_core::{QocError, Result, Simulator};

/// Dense state-vector simulator over a single in-memory register.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseSimulator;

impl DenseSimulator {
    pub fn new() -> Self {
        Self
    }

    /// Runs a whole circuit from the |0...0> state in one shot.
    pub fn run_circuit(&self, circ: &Circuit) -> Result<Vec<Amplitude>> {
        let mut state = vec![Amplitude::ZERO; 1 << circ.num_qubits];
        state[0] = Amplitude::ONE;
        self.run(SimInput::new(state, circ.clone()))
    }
}

impl Simulator for DenseSimulator {
    fn run(&self, input: SimInput) -> Result<Vec<Amplitude>> {
        let SimInput { mut state, circ } = input;

        let expected = 1usize << circ.num_qubits;
        if state.len() != expected {
            return Err(QocError::SimulatorContract {
                expected,
                actual: state.len(),
            });
        }

        for gate in &circ.gates {
            kernels::apply_gate(&mut state, gate)?;
        }
        Ok(state)
    }
}
