//! Instrumented binary min-heap with decrease-key handles
//!
//! An array-backed min-heap whose elements live in a generational arena
//! (`slotmap`). The backing sequence holds arena keys in heap order and every
//! arena record remembers its current slot, so a [`HeapHandle`] stays valid
//! while its element moves and can be handed back to
//! [`decrease_key`](Heap::decrease_key).
//!
//! Every primitive step is reported to the heap's [`Counters`].
//!
//! # Time Complexity
//!
//! | Operation      | Complexity |
//! |----------------|------------|
//! | `insert`       | O(log n)   |
//! | `extract_min`  | O(log n)   |
//! | `peek`         | O(1)       |
//! | `decrease_key` | O(log n)   |
//! | `build_heap`   | O(n)       |
//! | `merge`        | O(n + m)   |
//!
//! # Example
//!
//! ```rust
//! use instrumented_heap::{Heap, MinHeap};
//!
//! let mut heap = MinHeap::new();
//! let handles = heap.build_heap(vec![7, 3, 9]);
//! heap.decrease_key(&handles[2], 1).unwrap();
//!
//! assert_eq!(heap.extract_min(), Ok(1));
//! assert_eq!(heap.drain_to_list(), vec![3, 7]);
//! assert!(heap.counters().comparisons() > 0);
//! ```

use crate::counters::Counters;
use crate::traits::{Handle, Heap, HeapError};
use slotmap::{new_key_type, SlotMap};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

new_key_type! {
    struct NodeKey;
}

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to an element in a [`MinHeap`]
///
/// A copyable token made of the owning heap's id and the element's arena key.
/// Read the key or the current slot through [`MinHeap::key_of`] and
/// [`MinHeap::position_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapHandle {
    heap: u64,
    node: NodeKey,
}

impl Handle for HeapHandle {}

/// Arena record for one element
#[derive(Debug)]
struct Node<K> {
    key: K,
    /// Slot this element currently occupies in `MinHeap::slots`
    index: usize,
}

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

#[inline]
fn left(i: usize) -> usize {
    2 * i + 1
}

#[inline]
fn right(i: usize) -> usize {
    2 * i + 2
}

/// A binary min-heap reporting its work to a [`Counters`] instance
#[derive(Debug)]
pub struct MinHeap<K> {
    id: u64,
    nodes: SlotMap<NodeKey, Node<K>>,
    /// Heap order; `nodes[slots[i]].index == i` for every live slot
    slots: Vec<NodeKey>,
    counters: Rc<Counters>,
}

impl<K: Ord> MinHeap<K> {
    /// Creates an empty heap with its own fresh counters
    pub fn new() -> Self {
        Self::with_counters(Rc::new(Counters::new()))
    }

    /// Creates an empty heap reporting to `counters`
    ///
    /// The same instance may be shared by several heaps.
    pub fn with_counters(counters: Rc<Counters>) -> Self {
        Self {
            id: NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            slots: Vec::new(),
            counters,
        }
    }

    /// The counters this heap reports to
    pub fn counters(&self) -> &Rc<Counters> {
        &self.counters
    }

    /// Replaces the contents with `keys` and heapifies bottom-up
    ///
    /// Handles are returned in input order, not heap order. Handles issued
    /// before the call become stale.
    ///
    /// # Time Complexity
    /// O(n)
    pub fn build_heap<I>(&mut self, keys: I) -> Vec<HeapHandle>
    where
        I: IntoIterator<Item = K>,
    {
        self.nodes.clear();
        self.slots.clear();
        self.counters.add_slot_access();

        let keys = keys.into_iter();
        let mut handles = Vec::with_capacity(keys.size_hint().0);
        for key in keys {
            let node = self.allocate(key, self.slots.len());
            self.slots.push(node);
            handles.push(self.handle(node));
            self.counters.add_slot_access();
        }

        let len = self.slots.len();
        if len > 1 {
            for i in (0..=parent(len - 1)).rev() {
                self.sift_down(i);
            }
        }
        debug!(len, heap = self.id, "built heap bottom-up");
        handles
    }

    /// Like [`build_heap`](Self::build_heap), but for sources that may hold
    /// absent keys
    ///
    /// # Errors
    /// Returns `HeapError::MissingKey` if any entry is `None`; the heap is left
    /// untouched in that case.
    pub fn try_build_heap<I>(&mut self, keys: I) -> Result<Vec<HeapHandle>, HeapError>
    where
        I: IntoIterator<Item = Option<K>>,
    {
        let keys: Vec<K> = keys
            .into_iter()
            .collect::<Option<_>>()
            .ok_or(HeapError::MissingKey)?;
        Ok(self.build_heap(keys))
    }

    /// Like [`insert`](Heap::insert), for a key that may be absent
    ///
    /// # Errors
    /// Returns `HeapError::MissingKey` for `None`; nothing is counted or
    /// stored in that case.
    pub fn try_insert(&mut self, key: Option<K>) -> Result<HeapHandle, HeapError> {
        let key = key.ok_or(HeapError::MissingKey)?;
        Ok(self.insert(key))
    }

    /// Builds a new heap holding every key of `a` and `b`
    ///
    /// Neither input is modified. The result reports to fresh counters, which
    /// also record the reads of the inputs' slots.
    ///
    /// # Time Complexity
    /// O(n + m)
    pub fn merge(a: &MinHeap<K>, b: &MinHeap<K>) -> MinHeap<K>
    where
        K: Clone,
    {
        let mut result = MinHeap::new();
        let mut keys = Vec::with_capacity(a.slots.len() + b.slots.len());
        for key in a.keys().chain(b.keys()) {
            keys.push(key.clone());
            result.counters.add_slot_access();
        }
        debug!(left = a.slots.len(), right = b.slots.len(), "merging heaps");
        result.build_heap(keys);
        result
    }

    /// Returns the current key of the handle's element
    ///
    /// # Errors
    /// `HeapError::ForeignHandle` or `HeapError::StaleHandle`.
    pub fn key_of(&self, handle: &HeapHandle) -> Result<&K, HeapError> {
        let node = self.resolve(handle)?;
        self.counters.add_slot_access();
        Ok(&self.nodes[node].key)
    }

    /// Returns the slot the handle's element currently occupies
    ///
    /// # Errors
    /// `HeapError::ForeignHandle` or `HeapError::StaleHandle`.
    pub fn position_of(&self, handle: &HeapHandle) -> Result<usize, HeapError> {
        let node = self.resolve(handle)?;
        Ok(self.nodes[node].index)
    }

    /// Keys in slot order, without counting
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.slots.iter().map(move |&node| &self.nodes[node].key)
    }

    /// Checks heap order and that every element knows its own slot
    pub fn check_invariants(&self) -> bool {
        if self.nodes.len() != self.slots.len() {
            return false;
        }
        for (i, &node) in self.slots.iter().enumerate() {
            match self.nodes.get(node) {
                Some(entry) if entry.index == i => {}
                _ => return false,
            }
        }
        (1..self.slots.len()).all(|i| self.key_at(parent(i)) <= self.key_at(i))
    }

    fn handle(&self, node: NodeKey) -> HeapHandle {
        HeapHandle {
            heap: self.id,
            node,
        }
    }

    fn allocate(&mut self, key: K, index: usize) -> NodeKey {
        self.counters.add_allocation();
        self.nodes.insert(Node { key, index })
    }

    fn resolve(&self, handle: &HeapHandle) -> Result<NodeKey, HeapError> {
        if handle.heap != self.id {
            return Err(HeapError::ForeignHandle);
        }
        if !self.nodes.contains_key(handle.node) {
            return Err(HeapError::StaleHandle);
        }
        Ok(handle.node)
    }

    #[inline]
    fn key_at(&self, index: usize) -> &K {
        &self.nodes[self.slots[index]].key
    }

    /// Move element at index up to maintain heap property
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = parent(index);
            self.counters.add_slot_access();
            self.counters.add_slot_access();
            self.counters.add_comparison();
            if self.key_at(index) < self.key_at(parent) {
                self.swap_slots(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at index down to maintain heap property
    fn sift_down(&mut self, mut index: usize) {
        let len = self.slots.len();
        loop {
            let left = left(index);
            let right = right(index);
            let mut smallest = index;

            if left < len {
                self.counters.add_slot_access();
                self.counters.add_slot_access();
                self.counters.add_comparison();
                if self.key_at(left) < self.key_at(smallest) {
                    smallest = left;
                }
            }
            if right < len {
                self.counters.add_slot_access();
                self.counters.add_slot_access();
                self.counters.add_comparison();
                if self.key_at(right) < self.key_at(smallest) {
                    smallest = right;
                }
            }

            if smallest != index {
                self.swap_slots(index, smallest);
                index = smallest;
            } else {
                break;
            }
        }
    }

    fn swap_slots(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.slots.swap(i, j);
        self.nodes[self.slots[i]].index = i;
        self.nodes[self.slots[j]].index = j;
        self.counters.add_swap();
        self.counters.add_slot_access();
        self.counters.add_slot_access();
    }
}

impl<K: Ord> Heap<K> for MinHeap<K> {
    type Handle = HeapHandle;

    fn len(&self) -> usize {
        self.counters.add_slot_access();
        self.slots.len()
    }

    fn is_empty(&self) -> bool {
        self.counters.add_slot_access();
        self.slots.is_empty()
    }

    fn insert(&mut self, key: K) -> HeapHandle {
        let index = self.slots.len();
        let node = self.allocate(key, index);
        self.slots.push(node);
        self.counters.add_slot_access();
        self.sift_up(index);
        self.handle(node)
    }

    fn peek(&self) -> Result<&K, HeapError> {
        if self.is_empty() {
            return Err(HeapError::Empty);
        }
        self.counters.add_slot_access();
        Ok(self.key_at(0))
    }

    fn extract_min(&mut self) -> Result<K, HeapError> {
        if self.is_empty() {
            return Err(HeapError::Empty);
        }
        self.counters.add_slot_access();

        let last = self.slots.len() - 1;
        if last == 0 {
            // the root trades places with itself
            self.counters.add_swap();
        } else {
            self.swap_slots(0, last);
        }
        let root = self.slots.pop();
        self.counters.add_slot_access();
        if last > 0 {
            self.sift_down(0);
        }

        root.and_then(|node| self.nodes.remove(node))
            .map(|node| node.key)
            .ok_or(HeapError::Empty)
    }

    fn decrease_key(&mut self, handle: &HeapHandle, new_key: K) -> Result<(), HeapError> {
        let node = self.resolve(handle)?;
        self.counters.add_comparison();
        let entry = &mut self.nodes[node];
        if new_key > entry.key {
            return Err(HeapError::KeyIncreased);
        }
        entry.key = new_key;
        let index = entry.index;
        self.counters.add_slot_access();
        self.sift_up(index);
        Ok(())
    }
}

impl<K: Ord> Default for MinHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> FromIterator<K> for MinHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut heap = MinHeap::new();
        heap.build_heap(iter);
        heap
    }
}

impl<K: Ord> Extend<K> for MinHeap<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CounterSnapshot;

    #[test]
    fn test_basic_operations() {
        let mut heap: MinHeap<i32> = MinHeap::new();

        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);

        heap.insert(3);
        heap.insert(1);
        heap.insert(2);

        assert!(!heap.is_empty());
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek(), Ok(&1));

        assert_eq!(heap.extract_min(), Ok(1));
        assert_eq!(heap.extract_min(), Ok(2));
        assert_eq!(heap.extract_min(), Ok(3));
        assert_eq!(heap.extract_min(), Err(HeapError::Empty));
    }

    #[test]
    fn test_handles_track_positions() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        let handles: Vec<_> = (0..10).rev().map(|k| heap.insert(k)).collect();

        for handle in &handles {
            let pos = heap.position_of(handle).unwrap();
            assert_eq!(heap.key_at(pos), heap.key_of(handle).unwrap());
        }
        // last inserted key (0) bubbled to the root
        assert_eq!(heap.position_of(&handles[9]), Ok(0));
        assert!(heap.check_invariants());
    }

    #[test]
    fn test_build_heap_returns_input_order() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        let keys = vec![9, 4, 7, 1, 8];
        let handles = heap.build_heap(keys.clone());

        assert_eq!(handles.len(), keys.len());
        for (handle, key) in handles.iter().zip(&keys) {
            assert_eq!(heap.key_of(handle), Ok(key));
        }
        assert!(heap.check_invariants());
        assert_eq!(heap.peek(), Ok(&1));
    }

    #[test]
    fn test_build_heap_discards_previous_contents() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        let old = heap.insert(100);
        heap.build_heap(vec![5, 6]);

        assert_eq!(heap.len(), 2);
        assert_eq!(heap.key_of(&old), Err(HeapError::StaleHandle));
        assert_eq!(heap.decrease_key(&old, 1), Err(HeapError::StaleHandle));
        assert_eq!(heap.drain_to_list(), vec![5, 6]);
    }

    #[test]
    fn test_build_heap_empty_and_single() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        assert!(heap.build_heap(Vec::new()).is_empty());
        assert!(heap.is_empty());

        heap.build_heap(vec![42]);
        assert_eq!(heap.peek(), Ok(&42));
    }

    #[test]
    fn test_try_build_heap_rejects_missing_key() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        heap.insert(1);

        let result = heap.try_build_heap(vec![Some(3), None, Some(2)]);
        assert_eq!(result, Err(HeapError::MissingKey));
        assert_eq!(heap.len(), 1);

        let handles = heap.try_build_heap(vec![Some(3), Some(2)]).unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(heap.drain_to_list(), vec![2, 3]);
    }

    #[test]
    fn test_try_insert_rejects_missing_key() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        heap.insert(4);
        let before = heap.counters().snapshot();

        assert_eq!(heap.try_insert(None), Err(HeapError::MissingKey));
        assert_eq!(heap.counters().snapshot(), before);

        let h = heap.try_insert(Some(2)).unwrap();
        assert_eq!(heap.position_of(&h), Ok(0));
        assert_eq!(heap.drain_to_list(), vec![2, 4]);
    }

    #[test]
    fn test_decrease_key_to_root() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        heap.insert(50);
        let h = heap.insert(100);

        heap.decrease_key(&h, 25).unwrap();
        assert_eq!(heap.peek(), Ok(&25));
        assert_eq!(heap.position_of(&h), Ok(0));
        assert!(heap.check_invariants());
    }

    #[test]
    fn test_decrease_key_equal_is_allowed() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        let h = heap.insert(7);
        assert_eq!(heap.decrease_key(&h, 7), Ok(()));
        assert_eq!(heap.key_of(&h), Ok(&7));
    }

    #[test]
    fn test_decrease_key_rejects_increase() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        heap.insert(5);
        let h = heap.insert(10);

        assert_eq!(heap.decrease_key(&h, 11), Err(HeapError::KeyIncreased));
        assert_eq!(heap.key_of(&h), Ok(&10));
        assert_eq!(heap.drain_to_list(), vec![5, 10]);
    }

    #[test]
    fn test_decrease_key_rejects_foreign_handle() {
        let mut a: MinHeap<i32> = MinHeap::new();
        let mut b: MinHeap<i32> = MinHeap::new();
        let ha = a.insert(10);
        b.insert(10);

        assert_eq!(b.decrease_key(&ha, 1), Err(HeapError::ForeignHandle));
        assert_eq!(b.peek(), Ok(&10));
        assert_eq!(b.key_of(&ha), Err(HeapError::ForeignHandle));
    }

    #[test]
    fn test_extracted_handle_is_stale() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        let h = heap.insert(1);
        heap.insert(2);
        assert_eq!(heap.extract_min(), Ok(1));
        assert_eq!(heap.decrease_key(&h, 0), Err(HeapError::StaleHandle));
        assert_eq!(heap.position_of(&h), Err(HeapError::StaleHandle));
    }

    #[test]
    fn test_merge_leaves_inputs_intact() {
        let mut a: MinHeap<i32> = MinHeap::new();
        let mut b: MinHeap<i32> = MinHeap::new();
        a.insert(1);
        a.insert(5);
        b.insert(2);
        b.insert(4);
        let a_before = a.counters().snapshot();

        let mut merged = MinHeap::merge(&a, &b);
        assert!(!Rc::ptr_eq(merged.counters(), a.counters()));
        assert_eq!(a.counters().snapshot(), a_before);
        assert_eq!(merged.counters().allocations(), 4);

        assert_eq!(merged.drain_to_list(), vec![1, 2, 4, 5]);
        assert_eq!(a.drain_to_list(), vec![1, 5]);
        assert_eq!(b.drain_to_list(), vec![2, 4]);
    }

    #[test]
    fn test_insert_and_decrease_counts() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        heap.insert(50);
        let h = heap.insert(100);
        assert_eq!(
            heap.counters().snapshot(),
            CounterSnapshot {
                comparisons: 1,
                swaps: 0,
                slot_accesses: 4,
                allocations: 2,
                recursive_calls: 0,
            }
        );

        heap.decrease_key(&h, 25).unwrap();
        let counts = heap.counters().snapshot();
        assert_eq!(counts.comparisons, 3);
        assert_eq!(counts.swaps, 1);
        assert_eq!(counts.slot_accesses, 9);
    }

    #[test]
    fn test_single_extract_counts() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        heap.insert(42);
        assert_eq!(heap.extract_min(), Ok(42));

        let counts = heap.counters().snapshot();
        assert_eq!(counts.slot_accesses, 4);
        assert_eq!(counts.swaps, 1);
        assert_eq!(counts.comparisons, 0);
    }

    #[test]
    fn test_build_heap_counts() {
        let mut heap: MinHeap<i32> = MinHeap::new();
        heap.build_heap(vec![3, 1, 2]);

        let counts = heap.counters().snapshot();
        assert_eq!(counts.allocations, 3);
        assert_eq!(counts.comparisons, 2);
        assert_eq!(counts.swaps, 1);
        assert_eq!(counts.slot_accesses, 10);
    }

    #[test]
    fn test_shared_counters() {
        let counters = Rc::new(Counters::new());
        let mut a: MinHeap<i32> = MinHeap::with_counters(Rc::clone(&counters));
        let mut b: MinHeap<i32> = MinHeap::with_counters(Rc::clone(&counters));
        a.insert(1);
        b.insert(2);
        assert_eq!(counters.allocations(), 2);
    }

    #[test]
    fn test_collect_and_extend() {
        let mut heap: MinHeap<i32> = vec![4, 2, 8].into_iter().collect();
        heap.extend(vec![1, 9]);
        assert!(heap.check_invariants());
        assert_eq!(heap.drain_to_list(), vec![1, 2, 4, 8, 9]);
    }
}
