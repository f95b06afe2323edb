//! Instrumented Binary Min-Heap
//!
//! This crate provides an array-backed binary min-heap with stable handles for
//! `decrease_key`, together with operation counters that record every
//! comparison, swap, slot access and allocation the heap performs. A small
//! benchmark harness drives the heap over synthetic input distributions and
//! exports the counters as CSV.
//!
//! # Modules
//!
//! - [`binary`]: the heap itself ([`MinHeap`], [`HeapHandle`])
//! - [`counters`]: the operation tally ([`Counters`], [`CounterSnapshot`])
//! - [`harness`]: dataset generation, timed trials and the CSV report
//! - [`traits`]: the [`Heap`] trait and [`HeapError`]
//!
//! # Example
//!
//! ```rust
//! use instrumented_heap::{Heap, MinHeap};
//!
//! let mut heap: MinHeap<i32> = MinHeap::new();
//! let h5 = heap.insert(5);
//! heap.insert(3);
//! heap.decrease_key(&h5, 1).unwrap();
//! assert_eq!(heap.peek(), Ok(&1));
//! assert_eq!(heap.drain_to_list(), vec![1, 3]);
//! ```

pub mod binary;
pub mod counters;
pub mod harness;
pub mod traits;

pub use binary::{HeapHandle, MinHeap};
pub use counters::{CounterSnapshot, Counters};
pub use traits::{Heap, HeapError};
