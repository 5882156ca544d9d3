use std::time::Instant;

use anyhow::{Result, bail};
use clap::ValueEnum;

use qoc_common::Amplitude;
use qoc_core::{
    BaselinePartitioner, Engine, FileBackend, MemoryBackend, NativeWrapper, Partitioner,
    StaticPartitioner, StorageBackend, SvManager, UniqPartitioner,
};
use qoc_sim::DenseSimulator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PartitionerKind {
    Static,
    Uniq,
    Baseline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Location {
    Memory,
    Disk,
}

fn l2_distance(a: &[Amplitude], b: &[Amplitude]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).norm_sqr())
        .sum::<f64>()
        .sqrt()
}

#[allow(clippy::too_many_arguments)]
pub fn run_circuit_file(
    path: &str,
    primary: usize,
    local: usize,
    partitioner: PartitionerKind,
    location: Location,
    data_dir: &str,
    parallel: bool,
    verify: bool,
    amplitudes: usize,
) -> Result<()> {
    let circ = qoc_io::load_circuit(path)?;
    let num_qubits = circ.num_qubits;
    println!("Circuit: {} qubits, {} gates", num_qubits, circ.gates.len());
    println!(
        "Layout: NP={primary} NL={local}, {} chunks of {} amplitudes",
        1usize << (num_qubits.saturating_sub(primary)),
        1usize << primary,
    );

    let num_units = 1usize << (num_qubits.saturating_sub(local));
    let unit_len = 1usize << local;
    let backend: Box<dyn StorageBackend> = match location {
        Location::Memory => Box::new(MemoryBackend::new(num_units, unit_len)),
        Location::Disk => Box::new(FileBackend::new(data_dir, num_units, unit_len)?),
    };
    let manager = SvManager::new(num_qubits, primary, local, parallel, backend)?;

    let partitioner: Box<dyn Partitioner> = match partitioner {
        PartitionerKind::Static => Box::new(StaticPartitioner::new(primary, local)),
        PartitionerKind::Uniq => Box::new(UniqPartitioner::new(primary, local)),
        PartitionerKind::Baseline => Box::new(BaselinePartitioner::new(primary, local)),
    };

    let mut engine = Engine::new(
        NativeWrapper::new(circ.clone()),
        partitioner,
        DenseSimulator::new(),
        manager,
    )?;

    let start = Instant::now();
    let report = engine.run()?;
    println!("Run finished in {:?}", start.elapsed());
    println!("{report}");

    let sv = engine.manager().gather_full_sv()?;
    for (idx, amp) in sv.iter().take(amplitudes).enumerate() {
        println!(
            "|{idx:0width$b}>: {re:+.6} {im:+.6}i",
            width = num_qubits,
            re = amp.re,
            im = amp.im
        );
    }

    if verify {
        let reference = DenseSimulator::new().run_circuit(&circ)?;
        let dist = l2_distance(&sv, &reference);
        println!("L2 distance to dense reference: {dist:.3e}");
        if dist > 1e-10 {
            bail!("chunked result diverges from the dense reference");
        }
        println!("Verification passed.");
    }

    Ok(())
}
