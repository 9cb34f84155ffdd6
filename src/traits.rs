//! Common trait for mergeable heaps
//!
//! [`Heap`] captures the operations every heap variant in this crate supports,
//! independent of its ordering and node storage. It mirrors the shape of
//! `std::collections::BinaryHeap` (`push`/`peek`/`pop`) plus a destructive
//! `merge`.

/// Base trait for mergeable heap/priority queue data structures
///
/// The element returned by `peek`/`pop` is the one that precedes all others
/// under the heap's ordering: the minimum for the default order.
///
/// # Example
///
/// ```rust
/// use rust_skew_heaps::{Heap, SkewHeapArena};
///
/// fn drain<H: Heap<u32>>(mut heap: H) -> Vec<u32> {
///     let mut out = Vec::new();
///     while let Some(x) = heap.pop() {
///         out.push(x);
///     }
///     out
/// }
///
/// let mut heap = SkewHeapArena::<u32>::default();
/// heap.push(3);
/// heap.push(1);
/// heap.push(2);
/// assert_eq!(drain(heap), vec![1, 2, 3]);
/// ```
pub trait Heap<T> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element
    ///
    /// # Time Complexity
    /// O(log n) amortized for skew heaps.
    fn push(&mut self, item: T);

    /// Returns the first element without removing it
    ///
    /// # Time Complexity
    /// O(1)
    fn peek(&self) -> Option<&T>;

    /// Removes and returns the first element
    ///
    /// # Time Complexity
    /// O(log n) amortized for skew heaps.
    fn pop(&mut self) -> Option<T>;

    /// Moves every element of `other` into this heap, leaving `other` empty
    ///
    /// # Time Complexity
    /// O(log n) amortized for skew heaps; elements are relinked, not copied.
    fn merge(&mut self, other: &mut Self);

    /// Removes every element
    fn clear(&mut self);
}
