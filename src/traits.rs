//! Common traits and the error type for heap operations
//!
//! [`Heap`] is the operation surface the benchmark harness and the generic
//! tests are written against. [`MinHeap`](crate::binary::MinHeap) is its
//! implementation in this crate.
//!
//! Unlike `std::collections::BinaryHeap`, the methods that need a non-empty
//! heap return `Result` with [`HeapError::Empty`] instead of `Option`, and
//! `insert` hands back a [`Handle`] that can later be passed to
//! [`Heap::decrease_key`].

use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The heap has no elements
    Empty,
    /// The new key compares greater than the element's current key
    KeyIncreased,
    /// The handle was produced by a different heap instance
    ForeignHandle,
    /// The handle's element is no longer in the heap (extracted or rebuilt)
    StaleHandle,
    /// A key sequence contained an absent entry
    MissingKey,
}

impl HeapError {
    /// Returns true for the errors caused by a bad `decrease_key` argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            HeapError::KeyIncreased | HeapError::ForeignHandle | HeapError::StaleHandle
        )
    }
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Empty => write!(f, "heap is empty"),
            HeapError::KeyIncreased => {
                write!(f, "new key is greater than current key")
            }
            HeapError::ForeignHandle => {
                write!(f, "handle does not belong to this heap")
            }
            HeapError::StaleHandle => {
                write!(f, "handle is no longer valid (element was removed)")
            }
            HeapError::MissingKey => write!(f, "key must not be absent"),
        }
    }
}

impl std::error::Error for HeapError {}

/// A handle to an element in the heap, used for decrease_key operations
///
/// This is an opaque token that identifies a specific element. It stays
/// valid while the element moves between slots and becomes stale once the
/// element leaves the heap.
pub trait Handle: Clone + PartialEq + Eq {}

/// Min-heap operations over keys with a total order
///
/// # Example
///
/// ```rust
/// use instrumented_heap::{Heap, MinHeap};
///
/// let mut heap: MinHeap<i32> = MinHeap::new();
/// heap.insert(50);
/// let h = heap.insert(100);
/// heap.decrease_key(&h, 25).unwrap();
/// assert_eq!(heap.peek(), Ok(&25));
/// ```
pub trait Heap<K: Ord> {
    /// The handle type returned by `insert`
    type Handle: Handle;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Inserts a key, returning a handle to its element
    ///
    /// # Time Complexity
    /// O(log n), O(1) when no sift is needed.
    fn insert(&mut self, key: K) -> Self::Handle;

    /// Returns the minimum key without removing it
    ///
    /// # Errors
    /// Returns `HeapError::Empty` if the heap has no elements.
    fn peek(&self) -> Result<&K, HeapError>;

    /// Removes and returns the minimum key
    ///
    /// # Errors
    /// Returns `HeapError::Empty` if the heap has no elements.
    ///
    /// # Time Complexity
    /// O(log n)
    fn extract_min(&mut self) -> Result<K, HeapError>;

    /// Replaces the key of the element identified by `handle` with a key that
    /// is less than or equal to it
    ///
    /// # Errors
    /// - `HeapError::KeyIncreased` if `new_key` compares greater than the
    ///   current key
    /// - `HeapError::ForeignHandle` if the handle came from another heap
    /// - `HeapError::StaleHandle` if the element was already removed
    ///
    /// The heap is left unchanged on error.
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError>;

    /// Extracts every element, returning the keys in ascending order
    ///
    /// Destructive: the heap is empty afterwards.
    fn drain_to_list(&mut self) -> Vec<K> {
        let mut out = Vec::new();
        while !self.is_empty() {
            match self.extract_min() {
                Ok(key) => out.push(key),
                Err(_) => break,
            }
        }
        out
    }
}
