//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use rust_skew_heaps::{
    BoxedNodes, Heap, HeapConfig, MergeStrategy, MinOrder, SkewHeap, SkewHeapArena,
};

/// Pool-backed min-heap
pub type Arena<T> = SkewHeapArena<T>;

/// Boxed min-heap that melds with the recursive strategy
pub struct RecursiveHeap<T: Ord>(pub SkewHeap<T>);

impl<T: Ord> Heap<T> for RecursiveHeap<T> {
    fn new() -> Self {
        RecursiveHeap(SkewHeap::with_config(
            MinOrder,
            BoxedNodes::default(),
            HeapConfig::default().with_merge_strategy(MergeStrategy::Recursive),
        ))
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn push(&mut self, item: T) {
        self.0.push(item)
    }

    fn peek(&self) -> Option<&T> {
        self.0.peek()
    }

    fn pop(&mut self) -> Option<T> {
        self.0.pop()
    }

    fn merge(&mut self, other: &mut Self) {
        self.0.merge(&mut other.0)
    }

    fn clear(&mut self) {
        self.0.clear()
    }
}

/// Pops everything, returning the elements in pop order
pub fn drain<T, H: Heap<T>>(heap: &mut H) -> Vec<T> {
    let mut out = Vec::with_capacity(heap.len());
    while let Some(x) = heap.pop() {
        out.push(x);
    }
    out
}

/// Ordered element that counts how many times it has been dropped
#[derive(Debug)]
pub struct Tracked {
    pub key: i32,
    drops: Rc<Cell<usize>>,
}

impl Tracked {
    pub fn new(key: i32, drops: &Rc<Cell<usize>>) -> Self {
        Self {
            key,
            drops: Rc::clone(drops),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Tracked {}

impl PartialOrd for Tracked {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tracked {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}
