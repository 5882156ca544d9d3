//! Random circuit generator for benchmarks and correctness testing.
//!
//! Emits layered circuits in the text format: each layer applies one random
//! single-qubit gate per qubit, followed by random two-qubit gates over
//! distinct qubit pairs. Seeded generation keeps benchmark inputs
//! reproducible across runs.

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use qoc_common::{Circuit, Gate, GateKind};

/// Generates a random layered circuit and writes it to `out`.
///
/// # Arguments
///
/// * `out` - Output path for the circuit file
/// * `num_qubits` - Register size
/// * `depth` - Number of layers
/// * `seed` - RNG seed for reproducible output
pub fn generate_random_circuit(out: &str, num_qubits: usize, depth: usize, seed: u64) -> Result<()> {
    println!("Generating {num_qubits}-qubit depth-{depth} circuit (seed {seed})...");

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut circ = Circuit::new(num_qubits);

    for _ in 0..depth {
        for q in 0..num_qubits {
            let gate = match rng.gen_range(0..5) {
                0 => Gate::h(q),
                1 => Gate::x(q),
                2 => Gate::new(GateKind::T, vec![], vec![q]),
                3 => Gate::rz(rng.r#gen::<f64>() * std::f64::consts::TAU, q),
                _ => Gate::new(
                    GateKind::Ry,
                    vec![rng.r#gen::<f64>() * std::f64::consts::TAU],
                    vec![q],
                ),
            };
            circ.push(gate);
        }

        for _ in 0..num_qubits / 2 {
            let a = rng.gen_range(0..num_qubits);
            let mut b = rng.gen_range(0..num_qubits);
            while b == a {
                b = rng.gen_range(0..num_qubits);
            }
            let gate = match rng.gen_range(0..3) {
                0 => Gate::cx(a, b),
                1 => Gate::cz(a, b),
                _ => Gate::new(
                    GateKind::Cp,
                    vec![rng.r#gen::<f64>() * std::f64::consts::TAU],
                    vec![a, b],
                ),
            };
            circ.push(gate);
        }
    }

    qoc_io::save_circuit(out, &circ)?;
    println!("Wrote {} gates to {out}.", circ.gates.len());
    Ok(())
}
