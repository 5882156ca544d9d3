mod generator;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

use run::{Location, PartitionerKind};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(short, long)]
        circuit: String,
        #[arg(short, long, default_value_t = 4)]
        primary: usize,
        #[arg(short, long, default_value_t = 2)]
        local: usize,
        #[arg(long, value_enum, default_value = "static")]
        partitioner: PartitionerKind,
        #[arg(long, value_enum, default_value = "memory")]
        location: Location,
        #[arg(long, default_value = "data")]
        data_dir: String,
        #[arg(long)]
        parallel: bool,
        #[arg(long)]
        verify: bool,
        #[arg(short, long, default_value_t = 8)]
        amplitudes: usize,
    },
    Gen {
        #[arg(short, long, default_value = "circuit.qoc")]
        out: String,
        #[arg(short, long, default_value_t = 6)]
        qubits: usize,
        #[arg(short, long, default_value_t = 8)]
        depth: usize,
        #[arg(short, long, default_value_t = 12345)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            circuit,
            primary,
            local,
            partitioner,
            location,
            data_dir,
            parallel,
            verify,
            amplitudes,
        } => {
            run::run_circuit_file(
                &circuit,
                primary,
                local,
                partitioner,
                location,
                &data_dir,
                parallel,
                verify,
                amplitudes,
            )?;
        }
        Commands::Gen {
            out,
            qubits,
            depth,
            seed,
        } => {
            generator::generate_random_circuit(&out, qubits, depth, seed)?;
        }
    }
    Ok(())
}
