//! Common definitions shared across the out-of-core state-vector simulator.
//!
//! This crate holds the backend-neutral gate set, the plain circuit IR that
//! every other crate consumes, and the `SimInput` handed to a dense compute
//! kernel. It contains data types only: the partitioner, the storage
//! manager, and the kernels all depend on this crate, never on each other's
//! internals.

use num_complex::Complex64;

/// A single complex amplitude of the state vector (complex128).
pub type Amplitude = Complex64;

/// The gate vocabulary understood by the partitioner and the dense kernels.
///
/// Each variant names a unitary (or, for `Measure`, a classical operation
/// that the chunked execution path must reject). Parameterized rotations
/// carry their angles in `Gate::params`, not in the kind itself, so the kind
/// stays `Copy` and cheap to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// Hadamard.
    H,
    /// Pauli-X (NOT).
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
    /// Phase gate S (sqrt(Z)).
    S,
    /// Conjugate phase gate S†.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// Conjugate T†.
    Tdg,
    /// Sqrt(X).
    Sx,
    /// Rotation around X by `params[0]` radians.
    Rx,
    /// Rotation around Y by `params[0]` radians.
    Ry,
    /// Rotation around Z by `params[0]` radians.
    Rz,
    /// Phase rotation diag(1, e^{i·params[0]}).
    P,
    /// Controlled-X on (control, target).
    Cx,
    /// Controlled-Z.
    Cz,
    /// Controlled phase rotation by `params[0]`.
    Cp,
    /// Swap of two qubits.
    Swap,
    /// Toffoli: doubly-controlled X on (control, control, target).
    Ccx,
    /// Z-basis measurement. Parseable from circuit files but unsupported by
    /// the purely unitary chunked execution path.
    Measure,
}

impl GateKind {
    /// Number of qubits this kind acts on.
    pub fn arity(self) -> usize {
        match self {
            Self::H
            | Self::X
            | Self::Y
            | Self::Z
            | Self::S
            | Self::Sdg
            | Self::T
            | Self::Tdg
            | Self::Sx
            | Self::Rx
            | Self::Ry
            | Self::Rz
            | Self::P
            | Self::Measure => 1,
            Self::Cx | Self::Cz | Self::Cp | Self::Swap => 2,
            Self::Ccx => 3,
        }
    }

    /// Number of angle parameters this kind expects.
    pub fn num_params(self) -> usize {
        match self {
            Self::Rx | Self::Ry | Self::Rz | Self::P | Self::Cp => 1,
            _ => 0,
        }
    }

    /// Whether this operation involves classical bits (measurement).
    pub fn is_classical(self) -> bool {
        matches!(self, Self::Measure)
    }

    /// Lower-case mnemonic used by the circuit text format.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::H => "h",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::S => "s",
            Self::Sdg => "sdg",
            Self::T => "t",
            Self::Tdg => "tdg",
            Self::Sx => "sx",
            Self::Rx => "rx",
            Self::Ry => "ry",
            Self::Rz => "rz",
            Self::P => "p",
            Self::Cx => "cx",
            Self::Cz => "cz",
            Self::Cp => "cp",
            Self::Swap => "swap",
            Self::Ccx => "ccx",
            Self::Measure => "measure",
        }
    }
}

/// One gate application: a kind, its angle parameters, and the ordered list
/// of qubits it acts on (controls before targets, as written in the source
/// circuit).
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub kind: GateKind,
    pub params: Vec<f64>,
    pub qubits: Vec<usize>,
}

impl Gate {
    pub fn new(kind: GateKind, params: Vec<f64>, qubits: Vec<usize>) -> Self {
        Self {
            kind,
            params,
            qubits,
        }
    }

    pub fn h(q: usize) -> Self {
        Self::new(GateKind::H, vec![], vec![q])
    }

    pub fn x(q: usize) -> Self {
        Self::new(GateKind::X, vec![], vec![q])
    }

    pub fn rz(theta: f64, q: usize) -> Self {
        Self::new(GateKind::Rz, vec![theta], vec![q])
    }

    pub fn cx(control: usize, target: usize) -> Self {
        Self::new(GateKind::Cx, vec![], vec![control, target])
    }

    pub fn cz(a: usize, b: usize) -> Self {
        Self::new(GateKind::Cz, vec![], vec![a, b])
    }

    pub fn swap(a: usize, b: usize) -> Self {
        Self::new(GateKind::Swap, vec![], vec![a, b])
    }

    pub fn ccx(c0: usize, c1: usize, target: usize) -> Self {
        Self::new(GateKind::Ccx, vec![], vec![c0, c1, target])
    }
}

/// An ordered gate sequence over a fixed qubit register.
///
/// This is the frontend-neutral IR consumed by the partitioner and the dense
/// kernels. Qubit indices are integers in `[0, num_qubits)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    pub num_qubits: usize,
    pub gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    pub fn with_gates(num_qubits: usize, gates: Vec<Gate>) -> Self {
        Self { num_qubits, gates }
    }

    pub fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }
}

/// Input handed to a dense compute kernel: the initial amplitudes of the
/// sub-circuit's register and the gate list to evolve them by.
///
/// Carrying the initial state as plain data (instead of an initialize
/// instruction prepended to the circuit) keeps the wrapper and the kernels
/// decoupled: both consume this type, neither imports the other.
#[derive(Debug, Clone)]
pub struct SimInput {
    pub state: Vec<Amplitude>,
    pub circ: Circuit,
}

impl SimInput {
    pub fn new(state: Vec<Amplitude>, circ: Circuit) -> Self {
        Self { state, circ }
    }
}
