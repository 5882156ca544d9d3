//! Gate unitaries and their application to a dense state vector.
//!
//! Matrices are row-major over the gate's own little-endian basis: qubit
//! `i` of `gate.qubits` is bit `i` of the local basis index, so entry
//! `m[out * dim + in]` is the amplitude taking local state `in` to `out`.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;
use qoc_common::{Amplitude, Gate, GateKind};
use qoc_core::{QocError, Result};

/// Builds the unitary matrix of a gate, `2^arity` square, row-major.
pub fn matrix(gate: &Gate) -> Result<Vec<Amplitude>> {
    if gate.kind.is_classical() {
        return Err(QocError::ClassicalUnsupported(gate.kind.mnemonic()));
    }
    if gate.params.len() != gate.kind.num_params() {
        return Err(QocError::Configuration(format!(
            "{} expects {} parameters, got {}",
            gate.kind.mnemonic(),
            gate.kind.num_params(),
            gate.params.len()
        )));
    }

    let r = |x: f64| Complex64::new(x, 0.0);
    let i = |x: f64| Complex64::new(0.0, x);
    let phase = |t: f64| Complex64::new(0.0, t).exp();
    let z = Complex64::ZERO;
    let o = Complex64::ONE;

    let m = match gate.kind {
        GateKind::H => vec![
            r(FRAC_1_SQRT_2),
            r(FRAC_1_SQRT_2),
            r(FRAC_1_SQRT_2),
            r(-FRAC_1_SQRT_2),
        ],
        GateKind::X => vec![z, o, o, z],
        GateKind::Y => vec![z, i(-1.0), i(1.0), z],
        GateKind::Z => vec![o, z, z, r(-1.0)],
        GateKind::S => vec![o, z, z, i(1.0)],
        GateKind::Sdg => vec![o, z, z, i(-1.0)],
        GateKind::T => vec![o, z, z, phase(std::f64::consts::FRAC_PI_4)],
        GateKind::Tdg => vec![o, z, z, phase(-std::f64::consts::FRAC_PI_4)],
        GateKind::Sx => {
            let p = Complex64::new(0.5, 0.5);
            let n = Complex64::new(0.5, -0.5);
            vec![p, n, n, p]
        }
        GateKind::Rx => {
            let half = gate.params[0] / 2.0;
            let (c, s) = (r(half.cos()), i(-half.sin()));
            vec![c, s, s, c]
        }
        GateKind::Ry => {
            let half = gate.params[0] / 2.0;
            let (c, s) = (r(half.cos()), r(half.sin()));
            vec![c, -s, s, c]
        }
        GateKind::Rz => {
            let half = gate.params[0] / 2.0;
            vec![phase(-half), z, z, phase(half)]
        }
        GateKind::P => vec![o, z, z, phase(gate.params[0])],
        // Two-qubit basis: bit 0 = first listed qubit (control), bit 1 =
        // second (target).
        GateKind::Cx => vec![
            o, z, z, z, //
            z, z, z, o, //
            z, z, o, z, //
            z, o, z, z,
        ],
        GateKind::Cz => {
            let mut m = identity(4);
            m[3 * 4 + 3] = r(-1.0);
            m
        }
        GateKind::Cp => {
            let mut m = identity(4);
            m[3 * 4 + 3] = phase(gate.params[0]);
            m
        }
        GateKind::Swap => {
            let mut m = vec![z; 16];
            m[0] = o;
            m[1 * 4 + 2] = o;
            m[2 * 4 + 1] = o;
            m[3 * 4 + 3] = o;
            m
        }
        GateKind::Ccx => {
            // Flip bit 2 (the target) when bits 0 and 1 are both set.
            let mut m = vec![z; 64];
            for input in 0..8usize {
                let out = if input & 0b011 == 0b011 {
                    input ^ 0b100
                } else {
                    input
                };
                m[out * 8 + input] = o;
            }
            m
        }
        GateKind::Measure => unreachable!("rejected above"),
    };
    Ok(m)
}

fn identity(dim: usize) -> Vec<Amplitude> {
    let mut m = vec![Amplitude::ZERO; dim * dim];
    for d in 0..dim {
        m[d * dim + d] = Amplitude::ONE;
    }
    m
}

/// Extracts the gate-local basis index of a global state index.
#[inline]
fn extract_gate_bits(state: usize, qubits: &[usize]) -> usize {
    let mut local = 0usize;
    for (i, &q) in qubits.iter().enumerate() {
        local |= ((state >> q) & 1) << i;
    }
    local
}

/// Overwrites the gate-local bits of a global state index.
#[inline]
fn set_gate_bits(state: usize, qubits: &[usize], local: usize) -> usize {
    let mut out = state;
    for (i, &q) in qubits.iter().enumerate() {
        if (local >> i) & 1 == 1 {
            out |= 1 << q;
        } else {
            out &= !(1 << q);
        }
    }
    out
}

/// Applies one gate to a dense state vector in place.
pub fn apply_gate(state: &mut Vec<Amplitude>, gate: &Gate) -> Result<()> {
    let num_qubits = state.len().trailing_zeros() as usize;
    if gate.qubits.len() != gate.kind.arity() {
        return Err(QocError::Configuration(format!(
            "{} acts on {} qubits, got {:?}",
            gate.kind.mnemonic(),
            gate.kind.arity(),
            gate.qubits
        )));
    }
    for (i, &q) in gate.qubits.iter().enumerate() {
        if q >= num_qubits || gate.qubits[..i].contains(&q) {
            return Err(QocError::Configuration(format!(
                "{} qubit list {:?} is out of range or duplicated for a \
                 {num_qubits}-qubit register",
                gate.kind.mnemonic(),
                gate.qubits
            )));
        }
    }

    let m = matrix(gate)?;
    let dim = 1usize << gate.kind.arity();

    let mut next = vec![Amplitude::ZERO; state.len()];
    for (idx, out) in next.iter_mut().enumerate() {
        let local_out = extract_gate_bits(idx, &gate.qubits);
        let mut acc = Amplitude::ZERO;
        for local_in in 0..dim {
            let src = set_gate_bits(idx, &gate.qubits, local_in);
            acc += m[local_out * dim + local_in] * state[src];
        }
        *out = acc;
    }
    *state = next;
    Ok(())
}
