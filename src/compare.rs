//! Ordering strategies for heaps
//!
//! A heap keeps the element that *precedes* every other element at its root.
//! [`MinOrder`] (the default) yields a min-heap, [`MaxOrder`] a max-heap, and
//! [`OrderBy`] adapts any closure.

use std::fmt;

/// A strict weak ordering over `T`
///
/// `precedes(a, b)` returns true when `a` must come out of the heap before
/// `b`. It must be irreflexive and transitive; elements for which neither
/// precedes the other are equivalent and leave the heap in unspecified order.
pub trait Compare<T: ?Sized> {
    fn precedes(&self, a: &T, b: &T) -> bool;
}

/// Ascending order via [`Ord`]; produces a min-heap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinOrder;

impl<T: Ord + ?Sized> Compare<T> for MinOrder {
    #[inline]
    fn precedes(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Descending order via [`Ord`]; produces a max-heap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxOrder;

impl<T: Ord + ?Sized> Compare<T> for MaxOrder {
    #[inline]
    fn precedes(&self, a: &T, b: &T) -> bool {
        a > b
    }
}

/// Ordering backed by a `Fn(&T, &T) -> bool` "precedes" predicate
///
/// ```rust
/// use rust_skew_heaps::{OrderBy, SkewHeap};
///
/// // Order by string length, shortest first
/// let mut heap = SkewHeap::with_comparator(OrderBy::new(|a: &&str, b: &&str| a.len() < b.len()));
/// heap.push("ccc");
/// heap.push("a");
/// heap.push("bb");
/// assert_eq!(heap.pop(), Some("a"));
/// ```
#[derive(Clone, Copy)]
pub struct OrderBy<F> {
    precedes: F,
}

impl<F> OrderBy<F> {
    pub fn new(precedes: F) -> Self {
        Self { precedes }
    }
}

impl<F> fmt::Debug for OrderBy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBy").finish_non_exhaustive()
    }
}

impl<T: ?Sized, F: Fn(&T, &T) -> bool> Compare<T> for OrderBy<F> {
    #[inline]
    fn precedes(&self, a: &T, b: &T) -> bool {
        (self.precedes)(a, b)
    }
}
