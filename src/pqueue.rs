//! Min-priority queue used by the ranked search.
//!
//! A thin wrapper over [`std::collections::BinaryHeap`] that pops the
//! smallest priority first and breaks ties by insertion order. The search
//! needs a couple of operations a plain heap does not offer directly:
//! draining every entry at or below a priority threshold
//! ([`PQueue::split_at_priority`]) and taking a fixed-length prefix in
//! priority order ([`PQueue::split_at_length`]).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A min-priority queue with insertion-order tie-breaking.
#[derive(Debug)]
pub struct PQueue<T, P: Ord + Copy> {
    heap: BinaryHeap<Entry<T, P>>,
    counter: u64,
}

#[derive(Debug)]
struct Entry<T, P> {
    priority: P,
    seq: u64,
    item: T,
}

// BinaryHeap is a max-heap; reverse the ordering so the smallest
// (priority, seq) pops first. Only (priority, seq) participate.
impl<T, P: Ord + Copy> Ord for Entry<T, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T, P: Ord + Copy> PartialOrd for Entry<T, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, P: Ord + Copy> Eq for Entry<T, P> {}

impl<T, P: Ord + Copy> PartialEq for Entry<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T, P: Ord + Copy> Default for PQueue<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord + Copy> PQueue<T, P> {
    /// Create an empty queue.
    pub fn new() -> Self {
        PQueue {
            heap: BinaryHeap::new(),
            counter: 0,
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queue an item at the given priority.
    pub fn add(&mut self, item: T, priority: P) {
        let seq = self.counter;
        self.counter += 1;
        self.heap.push(Entry {
            priority,
            seq,
            item,
        });
    }

    /// Remove and return the minimum-priority item.
    pub fn pop(&mut self) -> Option<(T, P)> {
        self.heap.pop().map(|e| (e.item, e.priority))
    }

    /// The smallest queued priority, if any.
    pub fn peek_priority(&self) -> Option<P> {
        self.heap.peek().map(|e| e.priority)
    }

    /// Move every item of `other` into `self`, preserving `other`'s
    /// relative order among equal priorities.
    pub fn append(&mut self, mut other: PQueue<T, P>) {
        while let Some((item, priority)) = other.pop() {
            self.add(item, priority);
        }
    }

    /// Drain every item with priority at most `threshold`, in priority
    /// order, leaving the rest queued.
    pub fn split_at_priority(&mut self, threshold: P) -> PQueue<T, P> {
        let mut below = PQueue::new();
        while self.peek_priority().is_some_and(|p| p <= threshold) {
            if let Some((item, priority)) = self.pop() {
                below.add(item, priority);
            }
        }
        below
    }

    /// Remove and return the first `k` items in priority order, or `None`
    /// (removing nothing) if fewer than `k` are queued.
    pub fn split_at_length(&mut self, k: usize) -> Option<Vec<(T, P)>> {
        if self.len() < k {
            return None;
        }
        let mut items = Vec::with_capacity(k);
        while items.len() < k {
            if let Some(entry) = self.pop() {
                items.push(entry);
            }
        }
        Some(items)
    }

    /// Consume the queue, returning all items in ascending priority order.
    pub fn into_sorted_vec(mut self) -> Vec<(T, P)> {
        let mut items = Vec::with_capacity(self.len());
        while let Some(entry) = self.pop() {
            items.push(entry);
        }
        items
    }
}
