//! Skew heap implementation
//!
//! A skew heap is a self-adjusting heap-ordered binary tree. Every mutating
//! operation is a *meld* of two trees:
//!
//! 1. if either tree is empty, the other one is the result;
//! 2. the root that precedes the other stays on top;
//! 3. the other tree is melded into that root's right subtree;
//! 4. the root's children are swapped unconditionally.
//!
//! No balance information is stored. The unconditional swap in step 4 keeps
//! right spines short on average, which gives O(log n) amortized push, pop and
//! merge (Sleator & Tarjan, 1986).
//!
//! | Operation | Complexity         |
//! |-----------|--------------------|
//! | `push`    | O(log n) amortized |
//! | `pop`     | O(log n) amortized |
//! | `peek`    | O(1)               |
//! | `merge`   | O(log n) amortized |
//! | `clear`   | O(n)               |
//!
//! # Example
//!
//! ```rust
//! use rust_skew_heaps::SkewHeap;
//!
//! let mut a = SkewHeap::new();
//! let mut b = SkewHeap::new();
//! for x in [5, 1, 9] {
//!     a.push(x);
//! }
//! for x in [2, 6, 3] {
//!     b.push(x);
//! }
//!
//! a.merge(&mut b);
//! assert!(b.is_empty());
//! assert_eq!(a.into_sorted_vec(), vec![1, 2, 3, 5, 6, 9]);
//! ```
//!
//! Merging a heap into itself cannot be expressed, so it can never corrupt
//! the tree:
//!
//! ```compile_fail
//! use rust_skew_heaps::SkewHeap;
//!
//! let mut heap: SkewHeap<i32> = SkewHeap::new();
//! heap.merge(&mut heap);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use smallvec::SmallVec;
use tracing::{error, trace};

use crate::compare::{Compare, MinOrder};
use crate::config::{HeapConfig, MergeStrategy, PoolConfig};
use crate::error::{HeapError, Result, Violation};
use crate::pool::{handle_alloc_failure, NodePool};
use crate::storage::{BoxedNodes, Link, Node, NodeSource};
use crate::traits::Heap;

/// Worklist for spine walks; most spines are short enough to stay inline
type Spine<T> = SmallVec<[NonNull<Node<T>>; 32]>;

/// A mergeable priority queue
///
/// `C` decides which element comes out first ([`MinOrder`] by default) and
/// `S` provides node storage ([`BoxedNodes`] by default, see
/// [`SkewHeapArena`] for the pool-backed variant). Both are fixed at
/// construction.
///
/// The order in which equivalent elements are popped is unspecified.
pub struct SkewHeap<T, C = MinOrder, S = BoxedNodes<T>>
where
    S: NodeSource<T>,
{
    root: Link<T>,
    len: usize,
    cmp: C,
    source: S,
    config: HeapConfig,
    _owns: PhantomData<T>,
}

/// Skew heap whose nodes are recycled through a [`NodePool`]
///
/// Use this for workloads with heavy push/pop churn; the pool can be
/// pre-sized with [`SkewHeap::reserve_nodes`].
pub type SkewHeapArena<T, C = MinOrder> = SkewHeap<T, C, NodePool<Node<T>>>;

// SAFETY: the heap uniquely owns every node reachable from `root`
unsafe impl<T: Send, C: Send, S: NodeSource<T> + Send> Send for SkewHeap<T, C, S> {}

impl<T: Ord> SkewHeap<T> {
    /// Creates an empty min-heap with independently allocated nodes
    pub fn new() -> Self {
        Self::with_source(MinOrder, BoxedNodes::default())
    }
}

impl<T, C: Compare<T>> SkewHeap<T, C> {
    /// Creates an empty heap ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_source(cmp, BoxedNodes::default())
    }
}

impl<T: Ord> SkewHeapArena<T> {
    /// Creates an empty pool-backed min-heap with the default [`PoolConfig`]
    pub fn new_arena() -> Self {
        Self::with_source(MinOrder, NodePool::new())
    }
}

impl<T, C: Compare<T>> SkewHeapArena<T, C> {
    /// Creates an empty pool-backed heap with a validated pool configuration
    pub fn with_pool_config(cmp: C, config: PoolConfig) -> Result<Self> {
        Ok(Self::with_source(cmp, NodePool::with_config(config)?))
    }

    /// The pool serving this heap's nodes
    pub fn pool(&self) -> &NodePool<Node<T>> {
        &self.source
    }
}

impl<T, C, S> SkewHeap<T, C, S>
where
    C: Compare<T>,
    S: NodeSource<T>,
{
    /// Creates an empty heap with an explicit comparator and node source
    pub fn with_source(cmp: C, source: S) -> Self {
        Self::with_config(cmp, source, HeapConfig::default())
    }

    /// Creates an empty heap with every knob explicit
    pub fn with_config(cmp: C, source: S, config: HeapConfig) -> Self {
        Self {
            root: None,
            len: 0,
            cmp,
            source,
            config,
            _owns: PhantomData,
        }
    }

    /// Returns true if the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of elements in the heap
    pub fn len(&self) -> usize {
        self.len
    }

    /// The ordering fixed at construction
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Settings fixed at construction
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// The source that creates and reclaims this heap's nodes
    pub fn node_source(&self) -> &S {
        &self.source
    }

    /// Returns the first element without removing it
    pub fn peek(&self) -> Option<&T> {
        // SAFETY: root is a live node owned by this heap
        self.root.map(|root| unsafe { &(*root.as_ptr()).key })
    }

    /// Returns the first element
    ///
    /// # Panics
    /// Panics if the heap is empty. Use [`peek`](Self::peek) or
    /// [`try_top`](Self::try_top) when emptiness is possible.
    pub fn top(&self) -> &T {
        match self.peek() {
            Some(key) => key,
            None => panic!("SkewHeap::top() called on an empty heap"),
        }
    }

    /// Checked form of [`top`](Self::top)
    pub fn try_top(&self) -> Result<&T> {
        self.peek().ok_or(HeapError::PreconditionViolated(Violation::EmptyHeap))
    }

    /// Inserts an element
    ///
    /// Aborts through [`std::alloc::handle_alloc_error`] if no node can be
    /// allocated, like the std collections do.
    pub fn push(&mut self, item: T) {
        if let Err(err) = self.try_push(item) {
            handle_alloc_failure::<Node<T>>(err);
        }
    }

    /// Fallible form of [`push`](Self::push); the heap is unchanged on error
    pub fn try_push(&mut self, item: T) -> Result<()> {
        self.try_emplace_with(|| item)
    }

    /// Inserts the element produced by `make`, called once a node is secured
    pub fn emplace_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        if let Err(err) = self.try_emplace_with(make) {
            handle_alloc_failure::<Node<T>>(err);
        }
    }

    /// Fallible form of [`emplace_with`](Self::emplace_with)
    pub fn try_emplace_with<F>(&mut self, make: F) -> Result<()>
    where
        F: FnOnce() -> T,
    {
        let node = self.source.create_with(make)?;

        // The new node goes back to the source if the comparator panics
        let pending = PendingNode {
            source: &mut self.source,
            node,
        };
        // SAFETY: the new node is not linked into the heap's tree yet
        let root = unsafe { meld(&self.cmp, self.config.merge_strategy, self.root, Some(node)) };
        mem::forget(pending);

        self.root = root;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the first element
    pub fn pop(&mut self) -> Option<T> {
        let root = self.root?;

        // SAFETY: root is live and owned by this heap. Its subtrees are
        // disjoint, and the root is only reclaimed once they are melded.
        let item = unsafe {
            let node = root.as_ref();
            let rest = meld(&self.cmp, self.config.merge_strategy, node.left, node.right);
            self.root = rest;
            self.source.reclaim(root)
        };

        self.len -= 1;
        Some(item)
    }

    /// Checked form of `pop` for callers that treat emptiness as a bug
    pub fn try_pop(&mut self) -> Result<T> {
        self.pop()
            .ok_or(HeapError::PreconditionViolated(Violation::EmptyHeap))
    }

    /// Moves every element of `other` into `self`, leaving `other` empty
    ///
    /// Trees are relinked, not copied. When both heaps are pool-backed,
    /// `self`'s pool absorbs `other`'s blocks so each node is still recycled
    /// by the pool that owns its storage. Elements are ordered by `self`'s
    /// comparator.
    pub fn merge(&mut self, other: &mut Self) {
        if other.root.is_none() {
            return;
        }

        trace!(into = self.len, from = other.len, "merging skew heaps");

        // SAFETY: the two heaps own disjoint trees
        let root = unsafe { meld(&self.cmp, self.config.merge_strategy, self.root, other.root) };

        self.source.absorb(&mut other.source);
        self.root = root;
        other.root = None;
        self.len += other.len;
        other.len = 0;
    }

    /// Consuming form of [`merge`](Self::merge)
    pub fn append(&mut self, mut other: Self) {
        self.merge(&mut other);
    }

    /// Destroys every element, returning nodes to the node source
    pub fn clear(&mut self) {
        let mut pending: Spine<T> = SmallVec::new();
        pending.extend(self.root.take());
        self.len = 0;

        while let Some(ptr) = pending.pop() {
            // SAFETY: every pending node is live, owned by this heap and
            // reachable only through `pending`.
            unsafe {
                let node = &mut *ptr.as_ptr();
                pending.extend(node.left.take());
                pending.extend(node.right.take());
                drop(self.source.reclaim(ptr));
            }
        }
    }

    /// Pre-allocates storage for `n` nodes; a no-op for independently
    /// allocated nodes
    pub fn reserve_nodes(&mut self, n: usize) {
        if let Err(err) = self.try_reserve_nodes(n) {
            handle_alloc_failure::<Node<T>>(err);
        }
    }

    /// Fallible form of [`reserve_nodes`](Self::reserve_nodes)
    pub fn try_reserve_nodes(&mut self, n: usize) -> Result<()> {
        self.source.reserve(n)
    }

    /// Returns the node source's storage to the system
    ///
    /// The heap must be empty. This is asserted in debug builds; otherwise
    /// the request is logged and ignored. See
    /// [`try_release_pool_storage`](Self::try_release_pool_storage).
    pub fn release_pool_storage(&mut self) {
        debug_assert!(
            self.root.is_none(),
            "release_pool_storage() requires an empty heap"
        );
        if let Err(err) = self.try_release_pool_storage() {
            error!(%err, len = self.len, "pool storage not released");
        }
    }

    /// Checked form of [`release_pool_storage`](Self::release_pool_storage)
    pub fn try_release_pool_storage(&mut self) -> Result<()> {
        if self.root.is_some() {
            return Err(Violation::HeapNotEmpty { len: self.len }.into());
        }
        self.source.release()
    }

    /// Pops every element in order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        while let Some(item) = self.pop() {
            out.push(item);
        }
        out
    }

    /// Iterator popping elements in order; anything left is dropped with it
    pub fn drain_sorted(&mut self) -> DrainSorted<'_, T, C, S> {
        DrainSorted { heap: self }
    }

    /// Walks the whole tree checking heap order and the element count
    #[cfg(test)]
    fn assert_invariants(&self) {
        let mut pending: Vec<NonNull<Node<T>>> = self.root.into_iter().collect();
        let mut count = 0;
        while let Some(ptr) = pending.pop() {
            count += 1;
            let node = unsafe { ptr.as_ref() };
            for child in [node.left, node.right].into_iter().flatten() {
                let child_key = unsafe { &child.as_ref().key };
                assert!(
                    !self.cmp.precedes(child_key, &node.key),
                    "child precedes its parent"
                );
                pending.push(child);
            }
        }
        assert_eq!(count, self.len);
    }
}

/// Melds two trees with the chosen strategy
///
/// Both strategies run every comparison before rewriting the first link, so
/// a comparator that panics leaves `a` and `b` exactly as they were.
///
/// # Safety
/// `a` and `b` must be disjoint trees of live nodes.
unsafe fn meld<T, C: Compare<T>>(
    cmp: &C,
    strategy: MergeStrategy,
    a: Link<T>,
    b: Link<T>,
) -> Link<T> {
    match strategy {
        MergeStrategy::Iterative => meld_iterative(cmp, a, b),
        MergeStrategy::Recursive => meld_recursive(cmp, a, b),
    }
}

/// A freshly created node not yet linked into the tree
///
/// Dropping it hands the node back to its source; it is forgotten once the
/// node is linked.
struct PendingNode<'a, T, S: NodeSource<T>> {
    source: &'a mut S,
    node: NonNull<Node<T>>,
}

impl<T, S: NodeSource<T>> Drop for PendingNode<'_, T, S> {
    fn drop(&mut self) {
        // SAFETY: the node came from `source` and was never linked
        drop(unsafe { self.source.reclaim(self.node) });
    }
}

/// Recursive meld; stack depth is the combined right-spine length
///
/// # Safety
/// `a` and `b` must be disjoint trees of live nodes.
unsafe fn meld_recursive<T, C: Compare<T>>(cmp: &C, a: Link<T>, b: Link<T>) -> Link<T> {
    let (mut a, mut b) = match (a, b) {
        (None, rest) | (rest, None) => return rest,
        (Some(a), Some(b)) => (a, b),
    };
    if cmp.precedes(&(*b.as_ptr()).key, &(*a.as_ptr()).key) {
        mem::swap(&mut a, &mut b);
    }
    let top = &mut *a.as_ptr();
    top.right = meld_recursive(cmp, top.right, Some(b));
    mem::swap(&mut top.left, &mut top.right);
    Some(a)
}

/// Same meld as [`meld_recursive`], with the descent kept on an explicit spine
///
/// # Safety
/// `a` and `b` must be disjoint trees of live nodes.
unsafe fn meld_iterative<T, C: Compare<T>>(cmp: &C, mut a: Link<T>, mut b: Link<T>) -> Link<T> {
    let mut spine: Spine<T> = SmallVec::new();

    // Descend: the preceding root stays, the other tree goes down its right side
    let mut tail = loop {
        let (mut x, mut y) = match (a, b) {
            (None, rest) | (rest, None) => break rest,
            (Some(x), Some(y)) => (x, y),
        };
        if cmp.precedes(&(*y.as_ptr()).key, &(*x.as_ptr()).key) {
            mem::swap(&mut x, &mut y);
        }
        spine.push(x);
        a = (*x.as_ptr()).right;
        b = Some(y);
    };

    // Unwind: attach the merged tail, then swap children
    while let Some(ptr) = spine.pop() {
        let node = &mut *ptr.as_ptr();
        node.right = tail;
        mem::swap(&mut node.left, &mut node.right);
        tail = Some(ptr);
    }
    tail
}

impl<T, C, S> Drop for SkewHeap<T, C, S>
where
    S: NodeSource<T>,
{
    fn drop(&mut self) {
        let mut pending: Spine<T> = SmallVec::new();
        pending.extend(self.root.take());
        while let Some(ptr) = pending.pop() {
            // SAFETY: same traversal as `clear`, which needs `C: Compare<T>`
            unsafe {
                let node = &mut *ptr.as_ptr();
                pending.extend(node.left.take());
                pending.extend(node.right.take());
                drop(self.source.reclaim(ptr));
            }
        }
    }
}

impl<T, C, S> Default for SkewHeap<T, C, S>
where
    C: Compare<T> + Default,
    S: NodeSource<T> + Default,
{
    fn default() -> Self {
        Self::with_source(C::default(), S::default())
    }
}

impl<T, C, S> fmt::Debug for SkewHeap<T, C, S>
where
    T: fmt::Debug,
    C: Compare<T>,
    S: NodeSource<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkewHeap")
            .field("len", &self.len)
            .field("top", &self.peek())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T, C, S> Extend<T> for SkewHeap<T, C, S>
where
    C: Compare<T>,
    S: NodeSource<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T, C, S> FromIterator<T> for SkewHeap<T, C, S>
where
    C: Compare<T> + Default,
    S: NodeSource<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}

impl<T, C, S> Heap<T> for SkewHeap<T, C, S>
where
    C: Compare<T> + Default,
    S: NodeSource<T> + Default,
{
    fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        SkewHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        SkewHeap::len(self)
    }

    fn push(&mut self, item: T) {
        SkewHeap::push(self, item)
    }

    fn peek(&self) -> Option<&T> {
        SkewHeap::peek(self)
    }

    fn pop(&mut self) -> Option<T> {
        SkewHeap::pop(self)
    }

    fn merge(&mut self, other: &mut Self) {
        SkewHeap::merge(self, other)
    }

    fn clear(&mut self) {
        SkewHeap::clear(self)
    }
}

/// Draining iterator returned by [`SkewHeap::drain_sorted`]
pub struct DrainSorted<'a, T, C, S>
where
    C: Compare<T>,
    S: NodeSource<T>,
{
    heap: &'a mut SkewHeap<T, C, S>,
}

impl<T, C, S> Iterator for DrainSorted<'_, T, C, S>
where
    C: Compare<T>,
    S: NodeSource<T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.heap.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len, Some(self.heap.len))
    }
}

impl<T, C: Compare<T>, S: NodeSource<T>> ExactSizeIterator for DrainSorted<'_, T, C, S> {}

impl<T, C: Compare<T>, S: NodeSource<T>> FusedIterator for DrainSorted<'_, T, C, S> {}

impl<T, C, S> Drop for DrainSorted<'_, T, C, S>
where
    C: Compare<T>,
    S: NodeSource<T>,
{
    fn drop(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{MaxOrder, OrderBy};
    use std::cell::Cell;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn drain<T, C: Compare<T>, S: NodeSource<T>>(heap: &mut SkewHeap<T, C, S>) -> Vec<T> {
        let mut out = Vec::new();
        while !heap.is_empty() {
            heap.assert_invariants();
            out.push(heap.pop().unwrap());
        }
        out
    }

    fn recursive<T: Ord>() -> SkewHeap<T> {
        SkewHeap::with_config(
            MinOrder,
            BoxedNodes::default(),
            HeapConfig::default().with_merge_strategy(MergeStrategy::Recursive),
        )
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = SkewHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);

        for x in [5, 3, 7, 2, 9, 1, 8] {
            heap.push(x);
            heap.assert_invariants();
        }
        assert_eq!(heap.len(), 7);
        assert_eq!(heap.top(), &1);
        assert_eq!(drain(&mut heap), vec![1, 2, 3, 5, 7, 8, 9]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_max_order() {
        let mut heap = SkewHeap::with_comparator(MaxOrder);
        heap.extend([5, 3, 7, 2, 9, 1, 8]);
        assert_eq!(drain(&mut heap), vec![9, 8, 7, 5, 3, 2, 1]);
    }

    #[test]
    fn test_merge_empties_donor() {
        let mut a = SkewHeap::new();
        let mut b = SkewHeap::new();
        a.extend([5, 1, 9]);
        b.extend([2, 6, 3]);

        a.merge(&mut b);
        assert!(b.is_empty());
        assert_eq!(b.len(), 0);
        assert_eq!(a.len(), 6);
        a.assert_invariants();
        assert_eq!(drain(&mut a), vec![1, 2, 3, 5, 6, 9]);
    }

    #[test]
    fn test_merge_into_empty() {
        let mut a: SkewHeap<i32> = SkewHeap::new();
        let mut b = SkewHeap::new();
        b.extend([4, 2]);
        a.merge(&mut b);
        assert_eq!(a.len(), 2);
        assert!(b.is_empty());
        assert_eq!(a.pop(), Some(2));
    }

    #[test]
    fn test_strategies_build_identical_trees() {
        let values = [13, 4, 8, 4, 21, 0, -3, 17, 9, 9, 2, 30, 1];
        let mut iterative = SkewHeap::new();
        let mut rec = recursive();
        for v in values {
            iterative.push(v);
            rec.push(v);
        }

        // Compare shapes by pre-order walk
        fn preorder(heap: &SkewHeap<i32>) -> Vec<Option<i32>> {
            let mut out = Vec::new();
            let mut pending = vec![heap.root];
            while let Some(link) = pending.pop() {
                match link {
                    None => out.push(None),
                    Some(ptr) => {
                        let node = unsafe { ptr.as_ref() };
                        out.push(Some(node.key));
                        pending.push(node.right);
                        pending.push(node.left);
                    }
                }
            }
            out
        }

        assert_eq!(preorder(&iterative), preorder(&rec));
        iterative.pop();
        rec.pop();
        assert_eq!(preorder(&iterative), preorder(&rec));
    }

    #[test]
    fn test_try_variants_on_empty() {
        let mut heap: SkewHeap<i32> = SkewHeap::new();
        assert_eq!(
            heap.try_top().unwrap_err().violation(),
            Some(Violation::EmptyHeap)
        );
        assert!(heap.try_pop().unwrap_err().is_precondition());
        assert_eq!(heap.pop(), None);
        assert_eq!(heap.peek(), None);
    }

    #[test]
    #[should_panic(expected = "empty heap")]
    fn test_top_on_empty_panics() {
        let heap: SkewHeap<i32> = SkewHeap::new();
        let _ = heap.top();
    }

    #[test]
    fn test_emplace_with() {
        let mut heap = SkewHeap::new();
        heap.emplace_with(|| (3, "ccc".to_string()));
        heap.push((1, "aaa".to_string()));
        heap.emplace_with(|| (2, "bbb".to_string()));
        assert_eq!(heap.pop(), Some((1, "aaa".to_string())));
        assert_eq!(heap.pop(), Some((2, "bbb".to_string())));
        assert_eq!(heap.pop(), Some((3, "ccc".to_string())));
    }

    #[test]
    fn test_arena_reserve_and_release() {
        let mut heap: SkewHeapArena<i32> = SkewHeap::default();
        heap.reserve_nodes(1024);
        assert!(heap.pool().free_slots() >= 1024);

        heap.extend([5, 3, 7, 2, 9, 1, 8]);
        assert_eq!(heap.pool().live(), 7);
        assert_eq!(
            heap.try_release_pool_storage().unwrap_err().violation(),
            Some(Violation::HeapNotEmpty { len: 7 })
        );

        assert_eq!(drain(&mut heap), vec![1, 2, 3, 5, 7, 8, 9]);
        assert_eq!(heap.pool().live(), 0);
        heap.release_pool_storage();
        assert_eq!(heap.pool().block_count(), 0);

        // The pool regrows on demand after release
        heap.push(4);
        assert_eq!(heap.pop(), Some(4));
    }

    #[test]
    fn test_clear_returns_nodes() {
        let mut heap = SkewHeapArena::<u32>::new_arena();
        heap.extend(0..100);
        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.pool().live(), 0);
        assert!(heap.try_release_pool_storage().is_ok());
    }

    #[test]
    fn test_drain_sorted() {
        let mut heap: SkewHeap<i32> = [4, 1, 3, 2].into_iter().collect();
        let mut drain = heap.drain_sorted();
        assert_eq!(drain.len(), 4);
        assert_eq!(drain.next(), Some(1));
        assert_eq!(drain.next(), Some(2));
        drop(drain);
        assert!(heap.is_empty());
    }

    fn assert_send<X: Send>() {}

    #[test]
    fn test_heaps_are_send() {
        assert_send::<SkewHeap<String>>();
        assert_send::<SkewHeapArena<i32>>();
        assert_send::<SkewHeapArena<String, MaxOrder>>();
    }

    #[test]
    fn test_node_source_tracks_live_nodes() {
        let mut heap = SkewHeap::new();
        heap.extend([4, 8, 15]);
        assert_eq!(heap.node_source().live_nodes(), 3);
        heap.pop();
        assert_eq!(heap.node_source().live_nodes(), 2);
        heap.clear();
        assert_eq!(heap.node_source().live_nodes(), 0);
    }

    /// Push, pop and merge against a comparator that panics must leave both
    /// heaps exactly as they were
    fn check_panicking_comparator<S: NodeSource<i32> + Default>(strategy: MergeStrategy) {
        let armed = Cell::new(false);
        let cmp = OrderBy::new(|a: &i32, b: &i32| {
            if armed.get() {
                panic!("comparator failed");
            }
            a < b
        });
        let config = HeapConfig::default().with_merge_strategy(strategy);
        let mut heap = SkewHeap::with_config(cmp, S::default(), config);
        let mut other = SkewHeap::with_config(cmp, S::default(), config);

        // Root 1 ends up with two non-empty subtrees, so pop has to compare
        heap.extend([5, 1, 9, 3]);
        other.extend([7, 2]);
        armed.set(true);

        assert!(catch_unwind(AssertUnwindSafe(|| heap.push(0))).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| heap.pop())).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| heap.merge(&mut other))).is_err());
        armed.set(false);

        assert_eq!(heap.len(), 4);
        assert!(!heap.is_empty());
        assert_eq!(heap.peek(), Some(&1));
        assert_eq!(heap.node_source().live_nodes(), 4);
        heap.assert_invariants();

        assert_eq!(other.len(), 2);
        assert_eq!(other.node_source().live_nodes(), 2);
        other.assert_invariants();

        heap.merge(&mut other);
        assert_eq!(drain(&mut heap), vec![1, 2, 3, 5, 7, 9]);
        assert_eq!(heap.node_source().live_nodes(), 0);
    }

    #[test]
    fn test_panicking_comparator_keeps_heap_consistent() {
        for strategy in [MergeStrategy::Iterative, MergeStrategy::Recursive] {
            check_panicking_comparator::<BoxedNodes<i32>>(strategy);
            check_panicking_comparator::<NodePool<Node<i32>>>(strategy);
        }
    }

    #[test]
    fn test_debug_output() {
        let mut heap = SkewHeap::new();
        heap.push(3);
        let text = format!("{heap:?}");
        assert!(text.contains("len: 1"));
        assert!(text.contains("top: Some(3)"));
    }
}
