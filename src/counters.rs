//! Operation counters for empirical complexity measurement
//!
//! A [`Counters`] instance tallies the primitive steps a heap performs:
//! key comparisons, slot swaps, slot accesses, element allocations and
//! recursive calls. The fields are `Cell`s so that several heaps can report
//! into the same instance through an `Rc<Counters>` while the caller keeps
//! reading it. `Counters` is deliberately `!Sync`.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use instrumented_heap::{Counters, Heap, MinHeap};
//!
//! let counters = Rc::new(Counters::new());
//! let mut heap: MinHeap<i32> = MinHeap::with_counters(Rc::clone(&counters));
//! heap.insert(3);
//! heap.insert(1);
//! assert_eq!(counters.allocations(), 2);
//! assert!(counters.comparisons() >= 1);
//! ```

use std::cell::Cell;
use std::fmt;
use std::ops::Sub;

/// Running totals of heap operations
#[derive(Debug, Default)]
pub struct Counters {
    comparisons: Cell<u64>,
    swaps: Cell<u64>,
    slot_accesses: Cell<u64>,
    allocations: Cell<u64>,
    recursive_calls: Cell<u64>,
}

#[inline]
fn bump(cell: &Cell<u64>) {
    cell.set(cell.get() + 1);
}

impl Counters {
    /// Creates a tracker with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one key comparison
    #[inline]
    pub fn add_comparison(&self) {
        bump(&self.comparisons);
    }

    /// Records one swap of two slots
    #[inline]
    pub fn add_swap(&self) {
        bump(&self.swaps);
    }

    /// Records one read or write of a slot
    #[inline]
    pub fn add_slot_access(&self) {
        bump(&self.slot_accesses);
    }

    /// Records one element allocation
    #[inline]
    pub fn add_allocation(&self) {
        bump(&self.allocations);
    }

    /// Records one recursive call
    #[inline]
    pub fn add_recursive_call(&self) {
        bump(&self.recursive_calls);
    }

    /// Key comparisons so far
    pub fn comparisons(&self) -> u64 {
        self.comparisons.get()
    }

    /// Slot swaps so far
    pub fn swaps(&self) -> u64 {
        self.swaps.get()
    }

    /// Slot reads and writes so far
    pub fn slot_accesses(&self) -> u64 {
        self.slot_accesses.get()
    }

    /// Elements allocated so far
    pub fn allocations(&self) -> u64 {
        self.allocations.get()
    }

    /// Recursive calls so far
    pub fn recursive_calls(&self) -> u64 {
        self.recursive_calls.get()
    }

    /// Zeroes every counter
    pub fn reset(&self) {
        self.comparisons.set(0);
        self.swaps.set(0);
        self.slot_accesses.set(0);
        self.allocations.set(0);
        self.recursive_calls.set(0);
    }

    /// Copies the current totals out
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            comparisons: self.comparisons(),
            swaps: self.swaps(),
            slot_accesses: self.slot_accesses(),
            allocations: self.allocations(),
            recursive_calls: self.recursive_calls(),
        }
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

/// Point-in-time copy of a [`Counters`] instance
///
/// Subtracting two snapshots gives the work done between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Key comparisons
    pub comparisons: u64,
    /// Slot swaps
    pub swaps: u64,
    /// Slot reads and writes
    pub slot_accesses: u64,
    /// Element allocations
    pub allocations: u64,
    /// Recursive calls; always 0 for the iterative heap
    pub recursive_calls: u64,
}

impl Sub for CounterSnapshot {
    type Output = CounterSnapshot;

    fn sub(self, earlier: CounterSnapshot) -> CounterSnapshot {
        CounterSnapshot {
            comparisons: self.comparisons.saturating_sub(earlier.comparisons),
            swaps: self.swaps.saturating_sub(earlier.swaps),
            slot_accesses: self.slot_accesses.saturating_sub(earlier.slot_accesses),
            allocations: self.allocations.saturating_sub(earlier.allocations),
            recursive_calls: self.recursive_calls.saturating_sub(earlier.recursive_calls),
        }
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "comparisons={}, swaps={}, arrayAccesses={}, allocations={}, recursiveCalls={}",
            self.comparisons, self.swaps, self.slot_accesses, self.allocations, self.recursive_calls
        )
    }
}
