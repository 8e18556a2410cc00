//! nexus_sim - Headless fast-forward runner for the nexus simulation

mod simulation;

use clap::Parser;
use simulation::{run, RunSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nexus_sim", version, about = "Run the nexus simulation without a frontend")]
struct Args {
    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 600.0)]
    seconds: f64,

    /// Seed for every random roll in the run
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Content file layered over the built-in tables
    #[arg(long)]
    content: Option<PathBuf>,

    /// Simulation constants file
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Start from a saved snapshot
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write a snapshot when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Assign workers before the first tick, as KEY=WORKERS (repeatable)
    #[arg(long = "job")]
    jobs: Vec<String>,

    /// Log progress every N simulated seconds
    #[arg(long)]
    report_every: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = RunSettings {
        seconds: args.seconds,
        seed: args.seed,
        content: args.content,
        constants: args.constants,
        load: args.load,
        save: args.save,
        jobs: args.jobs,
        report_every: args.report_every,
    };

    match run(&settings) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("failed to encode report: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                report.print_summary();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
