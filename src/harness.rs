//! Benchmark harness: synthetic datasets, timed trials and the CSV report
//!
//! A trial builds a fresh [`MinHeap`] over one dataset with `build_heap`,
//! drains it completely, and records wall-clock time together with the
//! heap's [`Counters`].
//!
//! # Example
//!
//! ```rust
//! use instrumented_heap::harness::{run_trial, Distribution};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let report = run_trial(1000, Distribution::Random, &mut rng);
//! assert!(report.verified);
//! assert_eq!(report.counters.allocations, 1000);
//! ```

use crate::binary::MinHeap;
use crate::counters::{CounterSnapshot, Counters};
use crate::traits::Heap;
use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Dataset sizes used when none are given
pub const DEFAULT_SIZES: [usize; 4] = [100, 1_000, 10_000, 100_000];

/// Header row of the CSV report
pub const CSV_HEADER: &str =
    "n,distribution,time(ms),comparisons,swaps,arrayAccesses,allocations,recursiveCalls";

/// Shape of a generated dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Distribution {
    /// A uniform shuffle of `0..n`
    Random,
    /// `0..n` ascending
    Sorted,
    /// `0..n` descending
    Reverse,
    /// Ascending with a few short-range swaps near the front
    NearlySorted,
}

impl Distribution {
    /// Every distribution, in report order
    pub const ALL: [Distribution; 4] = [
        Distribution::Random,
        Distribution::Sorted,
        Distribution::Reverse,
        Distribution::NearlySorted,
    ];

    /// Name used on the command line and in the report
    pub fn name(&self) -> &'static str {
        match self {
            Distribution::Random => "random",
            Distribution::Sorted => "sorted",
            Distribution::Reverse => "reverse",
            Distribution::NearlySorted => "nearly-sorted",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown distribution name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDistribution(pub String);

impl fmt::Display for UnknownDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown distribution `{}`", self.0)
    }
}

impl std::error::Error for UnknownDistribution {}

impl FromStr for Distribution {
    type Err = UnknownDistribution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Distribution::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownDistribution(s.to_string()))
    }
}

/// Generates `n` keys shaped by `distribution`
///
/// Every dataset is a permutation of `0..n`.
pub fn generate<R: Rng + ?Sized>(n: usize, distribution: Distribution, rng: &mut R) -> Vec<i64> {
    let mut data: Vec<i64> = (0..n as i64).collect();
    match distribution {
        Distribution::Random => data.shuffle(rng),
        Distribution::Sorted => {}
        Distribution::Reverse => data.reverse(),
        Distribution::NearlySorted => {
            for i in 0..n / 20 {
                data.swap(i, (i + 5).min(n - 1));
            }
        }
    }
    data
}

/// Outcome of one timed build-and-drain run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialReport {
    pub n: usize,
    pub distribution: Distribution,
    pub elapsed: Duration,
    pub counters: CounterSnapshot,
    /// Whether the drained keys came out in ascending order
    pub verified: bool,
}

impl TrialReport {
    /// One CSV row matching [`CSV_HEADER`]
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{}",
            self.n,
            self.distribution,
            self.elapsed.as_millis(),
            self.counters.comparisons,
            self.counters.swaps,
            self.counters.slot_accesses,
            self.counters.allocations,
            self.counters.recursive_calls,
        )
    }
}

impl fmt::Display for TrialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} dist={} time={}ms metrics={}",
            self.n,
            self.distribution,
            self.elapsed.as_millis(),
            self.counters
        )
    }
}

/// Builds a heap over a fresh dataset, drains it, and reports the work done
pub fn run_trial<R: Rng + ?Sized>(n: usize, distribution: Distribution, rng: &mut R) -> TrialReport {
    let data = generate(n, distribution, rng);
    let counters = Rc::new(Counters::new());
    let mut heap = MinHeap::with_counters(Rc::clone(&counters));

    let start = Instant::now();
    heap.build_heap(data);
    let drained = heap.drain_to_list();
    let elapsed = start.elapsed();

    let verified = drained.len() == n && drained.windows(2).all(|w| w[0] <= w[1]);
    if !verified {
        warn!(n, %distribution, "drained keys are not in ascending order");
    }
    info!(n, %distribution, elapsed_ms = elapsed.as_millis() as u64, "trial finished");

    TrialReport {
        n,
        distribution,
        elapsed,
        counters: counters.snapshot(),
        verified,
    }
}

/// Writes the header and one row per report to `path`
///
/// Missing parent directories are created.
pub fn write_report(path: &Path, reports: &[TrialReport]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = BufWriter::new(fs::File::create(path)?);
    writeln!(out, "{CSV_HEADER}")?;
    for report in reports {
        writeln!(out, "{}", report.csv_row())?;
    }
    out.flush()
}
