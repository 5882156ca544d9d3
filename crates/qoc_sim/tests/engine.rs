//! End-to-end tests of the chunked execution engine against the dense
//! reference simulator.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use qoc_common::{Amplitude, Circuit, Gate};
use qoc_core::{
    BaselinePartitioner, Engine, FileBackend, MemoryBackend, NativeWrapper, Partitioner, QocError,
    RunReport, StaticPartitioner, SvManager, UniqPartitioner,
};
use qoc_sim::DenseSimulator;

fn run_chunked<P: Partitioner>(
    circ: &Circuit,
    partitioner: P,
    num_primary: usize,
    num_local: usize,
    parallel: bool,
) -> qoc_core::Result<(Vec<Amplitude>, RunReport)> {
    let nq = circ.num_qubits;
    let backend = MemoryBackend::new(1 << (nq - num_local), 1 << num_local);
    let manager = SvManager::new(nq, num_primary, num_local, parallel, backend)?;
    let mut engine = Engine::new(
        NativeWrapper::new(circ.clone()),
        partitioner,
        DenseSimulator::new(),
        manager,
    )?;
    let report = engine.run()?;
    Ok((engine.manager().gather_full_sv()?, report))
}

fn l2_distance(a: &[Amplitude], b: &[Amplitude]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).norm_sqr())
        .sum::<f64>()
        .sqrt()
}

fn random_circuit(num_qubits: usize, depth: usize, seed: u64) -> Circuit {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut circ = Circuit::new(num_qubits);
    for _ in 0..depth {
        for _ in 0..num_qubits {
            let q = rng.gen_range(0..num_qubits);
            match rng.gen_range(0..5) {
                0 => circ.push(Gate::h(q)),
                1 => circ.push(Gate::x(q)),
                2 => circ.push(Gate::rz(rng.r#gen::<f64>() * std::f64::consts::TAU, q)),
                _ => {
                    let mut other = rng.gen_range(0..num_qubits);
                    while other == q {
                        other = rng.gen_range(0..num_qubits);
                    }
                    if rng.r#gen::<bool>() {
                        circ.push(Gate::cx(q, other));
                    } else {
                        circ.push(Gate::cz(q, other));
                    }
                }
            }
        }
    }
    circ
}

#[test]
fn ghz_state_across_two_subcircuits() {
    let circ = Circuit::with_gates(3, vec![Gate::h(0), Gate::cx(0, 1), Gate::cx(1, 2)]);
    let (sv, report) = run_chunked(&circ, StaticPartitioner::new(2, 0), 2, 0, false).unwrap();

    assert_eq!(report.num_subcircuits, 2);
    assert_eq!(report.num_chunks, 2);

    let amp = std::f64::consts::FRAC_1_SQRT_2;
    assert!((sv[0].re - amp).abs() < 1e-12);
    assert!((sv[7].re - amp).abs() < 1e-12);
    for idx in 1..7 {
        assert!(sv[idx].norm() < 1e-12, "leak into basis state {idx}");
    }
}

#[test]
fn hadamard_layer_spreads_uniformly() {
    let circ = Circuit::with_gates(
        4,
        vec![Gate::h(0), Gate::h(1), Gate::h(2), Gate::h(3)],
    );
    let (sv, _) = run_chunked(&circ, StaticPartitioner::new(3, 2), 3, 2, false).unwrap();

    for amp in &sv {
        assert!((amp.re - 0.25).abs() < 1e-12);
        assert!(amp.im.abs() < 1e-12);
    }
}

#[test]
fn x_on_every_qubit_reaches_top_state() {
    let circ = Circuit::with_gates(5, (0..5).map(Gate::x).collect());
    let (sv, _) = run_chunked(&circ, StaticPartitioner::new(3, 2), 3, 2, false).unwrap();

    assert!((sv[31].re - 1.0).abs() < 1e-12);
    for (idx, amp) in sv.iter().enumerate().take(31) {
        assert!(amp.norm() < 1e-12, "leak into basis state {idx}");
    }
}

#[test]
fn empty_circuit_preserves_ground_state() {
    let circ = Circuit::new(4);
    let (sv, report) = run_chunked(&circ, StaticPartitioner::new(4, 2), 4, 2, false).unwrap();

    assert_eq!(report.num_subcircuits, 0);
    assert!((sv[0].re - 1.0).abs() < 1e-12);
    assert!(sv[1..].iter().all(|a| a.norm() < 1e-12));
}

#[test]
fn partitioners_agree_with_dense_reference() {
    for seed in [7u64, 21, 1234] {
        let circ = random_circuit(6, 6, seed);
        let reference = DenseSimulator::new().run_circuit(&circ).unwrap();

        let (static_sv, _) =
            run_chunked(&circ, StaticPartitioner::new(4, 2), 4, 2, false).unwrap();
        let (uniq_sv, _) = run_chunked(&circ, UniqPartitioner::new(4, 2), 4, 2, false).unwrap();
        let (baseline_sv, _) =
            run_chunked(&circ, BaselinePartitioner::new(4, 2), 4, 2, false).unwrap();

        assert!(l2_distance(&static_sv, &reference) < 1e-10, "seed {seed}");
        assert!(l2_distance(&uniq_sv, &reference) < 1e-10, "seed {seed}");
        assert!(l2_distance(&baseline_sv, &reference) < 1e-10, "seed {seed}");
    }
}

#[test]
fn uniq_handles_local_free_layouts() {
    for seed in [3u64, 99] {
        let circ = random_circuit(5, 4, seed);
        let reference = DenseSimulator::new().run_circuit(&circ).unwrap();
        let (sv, _) = run_chunked(&circ, UniqPartitioner::new(3, 0), 3, 0, false).unwrap();
        assert!(l2_distance(&sv, &reference) < 1e-10, "seed {seed}");
    }
}

#[test]
fn toffoli_too_wide_for_primary_register() {
    let circ = Circuit::with_gates(3, vec![Gate::ccx(0, 1, 2)]);

    // The static partitioner still emits the oversized sub-circuit; the
    // engine refuses to execute it.
    let err = run_chunked(&circ, StaticPartitioner::new(2, 1), 2, 1, false).unwrap_err();
    assert!(matches!(err, QocError::PartitioningOverflow { .. }));

    // The dependency-driven partitioner rejects it outright.
    let err = run_chunked(&circ, UniqPartitioner::new(2, 1), 2, 1, false).unwrap_err();
    assert!(matches!(err, QocError::PartitioningOverflow { .. }));
}

#[test]
fn disk_backend_matches_memory_backend() {
    let circ = random_circuit(5, 5, 42);
    let (memory_sv, _) = run_chunked(&circ, StaticPartitioner::new(3, 1), 3, 1, false).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path(), 1 << 4, 1 << 1).unwrap();
    let manager = SvManager::new(5, 3, 1, true, backend).unwrap();
    let mut engine = Engine::new(
        NativeWrapper::new(circ.clone()),
        StaticPartitioner::new(3, 1),
        DenseSimulator::new(),
        manager,
    )
    .unwrap();
    engine.run().unwrap();
    let disk_sv = engine.manager().gather_full_sv().unwrap();

    assert!(l2_distance(&memory_sv, &disk_sv) < 1e-12);

    // Unit files survive the run under stable names.
    assert!(dir.path().join("sv0").exists());
    assert!(dir.path().join("sv15").exists());
}

#[test]
fn parallel_run_matches_serial_run() {
    let circ = random_circuit(6, 4, 11);
    let (serial, _) = run_chunked(&circ, StaticPartitioner::new(4, 2), 4, 2, false).unwrap();
    let (parallel, _) = run_chunked(&circ, StaticPartitioner::new(4, 2), 4, 2, true).unwrap();
    assert!(l2_distance(&serial, &parallel) < 1e-12);
}
