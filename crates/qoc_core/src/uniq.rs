//! Dependency-driven partitioner.
//!
//! Minimizes the number of emitted sub-circuits by repeatedly selecting the
//! largest gate set whose qubit union fits the active budget, respecting
//! gate dependencies. Dependencies are tracked in a matrix of per-qubit
//! closures: `bits[i][j]` is the `u64` mask of qubits that any gate touching
//! qubit `j` within the first `i` gates is transitively entangled with, and
//! `ops[i][j]` is the bitset of those gates' positions. Cells are fixed-width
//! words, so closure unions are word-parallel.

use bitvec::prelude::*;
use log::info;

use crate::error::{QocError, Result};
use crate::partition::Partitioner;
use crate::wrapper::{CircuitWrapper, SubCircuit};

/// Dependency matrix over a remaining gate list.
///
/// Row `i` describes the prefix of the first `i` gates; row 0 is the
/// identity (`bits[0][j] = {j}`, `ops[0][j]` empty).
struct DepMatrix {
    num_qubits: usize,
    rows: usize,
    bits: Vec<u64>,
    ops: Vec<BitVec>,
}

impl DepMatrix {
    fn build(gates: &[qoc_common::Gate], num_qubits: usize) -> Self {
        let n = gates.len();
        let rows = n + 1;
        let mut bits = vec![0u64; rows * num_qubits];
        let mut ops = vec![bitvec![0; n]; rows * num_qubits];

        for j in 0..num_qubits {
            bits[j] = 1u64 << j;
        }

        for (i, gate) in gates.iter().enumerate() {
            let (prev, row) = (i * num_qubits, (i + 1) * num_qubits);
            for j in 0..num_qubits {
                bits[row + j] = bits[prev + j];
                ops[row + j] = ops[prev + j].clone();
            }
            for &j in &gate.qubits {
                ops[row + j].set(i, true);
                for &k in &gate.qubits {
                    bits[row + j] |= bits[prev + k];
                    for pos in ops[prev + k].iter_ones().collect::<Vec<_>>() {
                        ops[row + j].set(pos, true);
                    }
                }
            }
        }

        Self {
            num_qubits,
            rows,
            bits,
            ops,
        }
    }

    /// Picks the cell with the most gates whose qubit closure, together
    /// with the already-claimed set, still fits in `num_primary` qubits.
    /// Ties go to the last examined cell. Returns the selected gate set and
    /// its qubit mask, or `None` when no cell holds any eligible gate.
    fn select(&self, num_primary: usize, claimed: u64) -> Option<(BitVec, u64)> {
        let mut best: Option<(usize, usize)> = None;
        let mut best_score = 0usize;

        for i in 0..self.rows {
            for j in 0..self.num_qubits {
                let cell = i * self.num_qubits + j;
                if (self.bits[cell] | claimed).count_ones() as usize > num_primary {
                    continue;
                }
                let score = self.ops[cell].count_ones();
                if score > 0 && score >= best_score {
                    best_score = score;
                    best = Some((i, j));
                }
            }
        }

        best.map(|(i, j)| {
            let cell = i * self.num_qubits + j;
            (self.ops[cell].clone(), self.bits[cell])
        })
    }
}

/// Dependency-driven partitioner.
///
/// Each outer round opens a fresh sub-circuit with the local qubits already
/// claimed, then keeps selecting the largest dependency-closed gate group
/// that fits the remaining qubit budget until the budget is exhausted or
/// nothing fits. Selected groups are emitted in ascending position order,
/// which preserves the relative order of any two gates connected by a data
/// dependency; only qubit-disjoint (hence commuting) groups may be
/// reordered relative to each other.
#[derive(Debug, Clone, Copy)]
pub struct UniqPartitioner {
    num_primary: usize,
    num_local: usize,
}

impl UniqPartitioner {
    pub fn new(num_primary: usize, num_local: usize) -> Self {
        Self {
            num_primary,
            num_local,
        }
    }
}

impl Partitioner for UniqPartitioner {
    fn run(&self, wrapper: &dyn CircuitWrapper) -> Result<Vec<SubCircuit>> {
        if self.num_local > self.num_primary {
            return Err(QocError::Configuration(format!(
                "num_local ({}) exceeds num_primary ({})",
                self.num_local, self.num_primary
            )));
        }
        let num_qubits = wrapper.num_qubits()?;
        if num_qubits > 64 {
            return Err(QocError::Configuration(format!(
                "{num_qubits} qubits exceed the 64-qubit index width"
            )));
        }

        let local_mask = if self.num_local == 0 {
            0
        } else {
            (!0u64) >> (64 - self.num_local)
        };

        let mut remaining: Vec<qoc_common::Gate> = wrapper.gates()?.to_vec();
        for gate in &remaining {
            if let Some(&q) = gate.qubits.iter().find(|&&q| q >= num_qubits) {
                return Err(QocError::Configuration(format!(
                    "gate {} references qubit {q} outside the {num_qubits}-qubit register",
                    gate.kind.mnemonic()
                )));
            }
        }
        let mut subs = Vec::new();

        while !remaining.is_empty() {
            let mut picked: Vec<qoc_common::Gate> = Vec::new();
            let mut claimed = local_mask;

            while (claimed.count_ones() as usize) < self.num_primary && !remaining.is_empty() {
                let matrix = DepMatrix::build(&remaining, num_qubits);
                let Some((selected, mask)) = matrix.select(self.num_primary, claimed) else {
                    break;
                };
                claimed |= mask;

                // Ascending order keeps dependent gates in their original
                // relative order; removal walks right-to-left so earlier
                // positions stay valid.
                let positions: Vec<usize> = selected.iter_ones().collect();
                for &pos in &positions {
                    picked.push(remaining[pos].clone());
                }
                for &pos in positions.iter().rev() {
                    remaining.remove(pos);
                }
            }

            if picked.is_empty() {
                // The front gate (it has no unmet dependencies) is wider
                // than the whole primary register.
                let needed = {
                    let mut mask = local_mask;
                    for &q in &remaining[0].qubits {
                        mask |= 1u64 << q;
                    }
                    mask.count_ones() as usize
                };
                return Err(QocError::PartitioningOverflow {
                    needed,
                    available: self.num_primary,
                });
            }

            subs.push(wrapper.make_subcircuit(&picked, self.num_local, self.num_primary)?);
        }

        info!("uniq partitioner emitted {} sub-circuits", subs.len());
        Ok(subs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::NativeWrapper;
    use qoc_common::{Circuit, Gate, GateKind};

    fn wrap(nq: usize, gates: Vec<Gate>) -> NativeWrapper {
        NativeWrapper::new(Circuit::with_gates(nq, gates))
    }

    #[test]
    fn matrix_closes_over_shared_qubits() {
        // g0 on {0}, g1 on {1}, g2 on {0,1}: after g2 the closure of
        // qubit 0 holds all three gates over both qubits.
        let gates = vec![Gate::h(0), Gate::h(1), Gate::cx(0, 1)];
        let m = DepMatrix::build(&gates, 2);

        let cell = 3 * 2; // row 3, qubit 0
        assert_eq!(m.bits[cell], 0b11);
        assert_eq!(m.ops[cell].iter_ones().collect::<Vec<_>>(), vec![0, 1, 2]);

        // Before g2 the two qubits are independent.
        let cell = 2 * 2;
        assert_eq!(m.bits[cell], 0b01);
        assert_eq!(m.ops[cell].iter_ones().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn groups_commuting_gates_across_disjoint_qubits() {
        // Static would need three sub-circuits here; grouping the two
        // cx(0,1) gates gets it done in two.
        let gates = vec![Gate::cx(0, 1), Gate::cx(2, 3), Gate::cx(0, 1)];
        let w = wrap(4, gates);
        let subs = UniqPartitioner::new(2, 0).run(&w).unwrap();

        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].qubits, vec![0, 1]);
        assert_eq!(subs[0].circ.gates.len(), 2);
        assert_eq!(subs[1].qubits, vec![2, 3]);
    }

    #[test]
    fn conserves_gates_and_respects_bound() {
        let gates = vec![
            Gate::h(0),
            Gate::cx(0, 1),
            Gate::cx(1, 2),
            Gate::h(3),
            Gate::cx(2, 3),
            Gate::cx(0, 3),
        ];
        let w = wrap(4, gates.clone());
        let subs = UniqPartitioner::new(3, 1).run(&w).unwrap();

        let total: usize = subs.iter().map(|s| s.circ.gates.len()).sum();
        assert_eq!(total, gates.len());
        for sub in &subs {
            assert!(sub.qubits.len() <= 3);
            assert!(sub.qubits.contains(&0));
        }
    }

    #[test]
    fn preserves_dependency_order() {
        let gates = vec![
            Gate::cx(0, 1),
            Gate::cx(2, 3),
            Gate::cx(1, 2),
            Gate::cx(0, 1),
        ];
        let w = wrap(4, gates.clone());
        let subs = UniqPartitioner::new(4, 0).run(&w).unwrap();

        // Identify each output gate with its original position (all gates
        // are distinguishable by qubits except 0 and 3, which share qubits
        // and therefore must stay ordered).
        let out: Vec<Vec<usize>> = subs
            .iter()
            .flat_map(|s| {
                s.circ
                    .gates
                    .iter()
                    .map(|g| g.qubits.iter().map(|&q| s.qubits[q]).collect())
            })
            .collect();

        for (a, ga) in gates.iter().enumerate() {
            for (b, gb) in gates.iter().enumerate().skip(a + 1) {
                if ga.qubits.iter().any(|q| gb.qubits.contains(q)) {
                    let pa = out.iter().position(|q| *q == ga.qubits).unwrap();
                    let pb = out.iter().rposition(|q| *q == gb.qubits).unwrap();
                    assert!(pa < pb, "gates {a} and {b} were reordered");
                }
            }
        }
    }

    #[test]
    fn dependency_order_preserved_on_random_circuits() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let num_qubits = 6;
        for seed in 0..20u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            // Tag every gate with a unique angle so outputs can be traced
            // back to their input position.
            let gates: Vec<Gate> = (0..24)
                .map(|tag| {
                    let a = rng.gen_range(0..num_qubits);
                    if rng.r#gen::<bool>() {
                        Gate::new(GateKind::Rz, vec![tag as f64], vec![a])
                    } else {
                        let mut b = rng.gen_range(0..num_qubits);
                        while b == a {
                            b = rng.gen_range(0..num_qubits);
                        }
                        Gate::new(GateKind::Cp, vec![tag as f64], vec![a, b])
                    }
                })
                .collect();

            let w = wrap(num_qubits, gates.clone());
            let subs = UniqPartitioner::new(4, 1).run(&w).unwrap();

            let order: Vec<usize> = subs
                .iter()
                .flat_map(|s| s.circ.gates.iter().map(|g| g.params[0] as usize))
                .collect();
            assert_eq!(order.len(), gates.len(), "seed {seed}");

            let pos =
                |tag: usize| order.iter().position(|&t| t == tag).unwrap();
            for a in 0..gates.len() {
                for b in a + 1..gates.len() {
                    let shares = gates[a].qubits.iter().any(|q| gates[b].qubits.contains(q));
                    if shares {
                        assert!(pos(a) < pos(b), "seed {seed}: gates {a} and {b} reordered");
                    }
                }
            }
        }
    }

    #[test]
    fn oversized_gate_overflows() {
        let w = wrap(3, vec![Gate::ccx(0, 1, 2)]);
        let err = UniqPartitioner::new(2, 0).run(&w).unwrap_err();
        assert!(matches!(
            err,
            QocError::PartitioningOverflow {
                needed: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn local_qubits_count_against_the_budget() {
        // One gate on qubits {2,3}: with NL = 2 the touched set is
        // {0,1,2,3}, which must still fit NP = 4.
        let w = wrap(4, vec![Gate::cx(2, 3)]);
        let subs = UniqPartitioner::new(4, 2).run(&w).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].qubits, vec![0, 1, 2, 3]);

        // With NP = 3 it cannot fit at all.
        let err = UniqPartitioner::new(3, 2).run(&w).unwrap_err();
        assert!(matches!(err, QocError::PartitioningOverflow { .. }));
    }
}
