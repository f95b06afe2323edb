//! Benchmark runner for the instrumented min-heap
//!
//! Runs a build-and-drain trial for every (size, distribution) pair, prints
//! one summary line per trial and writes the CSV report.
//!
//! ## Running
//!
//! ```bash
//! cargo run --release --bin heap-bench                  # default sizes
//! cargo run --release --bin heap-bench -- 500 5000      # custom sizes
//! RUST_LOG=info cargo run --release --bin heap-bench -- -d random -o out/heap.csv
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use instrumented_heap::harness::{run_trial, write_report, Distribution, DEFAULT_SIZES};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "heap-bench",
    about = "Measure min-heap build and drain over synthetic datasets",
    version
)]
struct Cli {
    /// Dataset sizes (defaults to 100 1000 10000 100000)
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    sizes: Vec<u64>,

    /// Where to write the CSV report
    #[arg(short, long, default_value = "benchmarks.csv")]
    output: PathBuf,

    /// Seed for the random distribution
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Only run these distributions (repeatable)
    #[arg(short, long = "distribution", value_enum)]
    distributions: Vec<Distribution>,
}

impl Cli {
    /// Requested sizes, or the defaults when none were given
    fn sizes(&self) -> Result<Vec<usize>> {
        if self.sizes.is_empty() {
            return Ok(DEFAULT_SIZES.to_vec());
        }
        self.sizes
            .iter()
            .map(|&n| usize::try_from(n).with_context(|| format!("size {n} is too large")))
            .collect()
    }

    /// Requested distributions, or all of them
    fn distributions(&self) -> Vec<Distribution> {
        if self.distributions.is_empty() {
            Distribution::ALL.to_vec()
        } else {
            self.distributions.clone()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sizes = cli.sizes()?;
    let distributions = cli.distributions();

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut reports = Vec::with_capacity(sizes.len() * distributions.len());
    for &n in &sizes {
        for &distribution in &distributions {
            let report = run_trial(n, distribution, &mut rng);
            if !report.verified {
                bail!("heap drain for n={n} dist={distribution} was not sorted");
            }
            println!("{report}");
            reports.push(report);
        }
    }

    write_report(&cli.output, &reports)
        .with_context(|| format!("failed to write report to {}", cli.output.display()))?;
    let shown = std::fs::canonicalize(&cli.output).unwrap_or_else(|_| cli.output.clone());
    println!("Benchmark results saved to {}", shown.display());
    Ok(())
}
