//! Pluggable node storage for skew heaps
//!
//! The heap never allocates nodes itself. It is handed a [`NodeSource`] at
//! construction and calls it only where a node is created or destroyed; the
//! merge algorithm works on raw links and is the same for every source.
//!
//! - [`BoxedNodes`]: default; every node is an independent global-allocator allocation
//! - [`NodePool`]: nodes are carved out of the pool's blocks and recycled through its free list
//!
//! # Example
//!
//! ```rust
//! use rust_skew_heaps::{MinOrder, NodePool, SkewHeap, SkewHeapArena};
//!
//! // Independent allocations
//! let mut boxed: SkewHeap<i32> = SkewHeap::new();
//! boxed.push(1);
//!
//! // Pool-backed
//! let mut arena: SkewHeapArena<i32> = SkewHeap::with_source(MinOrder, NodePool::new());
//! arena.reserve_nodes(1024);
//! arena.push(1);
//! ```

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::{HeapError, Result};
use crate::pool::NodePool;

/// Owning link to a subtree root; `None` is the empty tree
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

/// A heap node: one key and two exclusively owned subtrees
pub struct Node<T> {
    pub(crate) key: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

// SAFETY: a node exclusively owns the subtrees its links point to, so sending
// it sends the whole subtree
unsafe impl<T: Send> Send for Node<T> {}

impl<T> Node<T> {
    pub(crate) fn leaf(key: T) -> Self {
        Self {
            key,
            left: None,
            right: None,
        }
    }

    pub fn key(&self) -> &T {
        &self.key
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

/// Capability to create and destroy heap nodes
///
/// # Contract
///
/// Pointers returned by `create_with` stay valid until passed to `reclaim` on
/// this source, or on a source that absorbed this one. Moving the source must
/// not invalidate them.
pub trait NodeSource<T> {
    /// Creates a childless node whose key is produced by `make`
    fn create_with<F>(&mut self, make: F) -> Result<NonNull<Node<T>>>
    where
        F: FnOnce() -> T;

    /// Destroys a node and hands back its key
    ///
    /// # Safety
    /// `node` must come from `create_with` on this source (or on one it
    /// absorbed), must not have been reclaimed already, and must not be
    /// accessed afterwards. Its child links are ignored.
    unsafe fn reclaim(&mut self, node: NonNull<Node<T>>) -> T;

    /// Ensures `n` nodes can be created without further allocation
    fn reserve(&mut self, _n: usize) -> Result<()> {
        Ok(())
    }

    /// Returns unused storage to the system; fails while nodes are live
    fn release(&mut self) -> Result<()> {
        Ok(())
    }

    /// Takes responsibility for every node created by `other`
    fn absorb(&mut self, other: &mut Self)
    where
        Self: Sized;

    /// Number of nodes created and not yet reclaimed
    fn live_nodes(&self) -> usize;
}

// ============================================================================
// BoxedNodes - one allocation per node
// ============================================================================

/// Allocates every node independently from the global allocator
///
/// Nodes are laid out exactly as `Box<Node<T>>` would be, so reclaiming one is
/// a `Box::from_raw`.
pub struct BoxedNodes<T> {
    live: usize,
    _phantom: PhantomData<T>,
}

impl<T> Default for BoxedNodes<T> {
    fn default() -> Self {
        Self {
            live: 0,
            _phantom: PhantomData,
        }
    }
}

impl<T> fmt::Debug for BoxedNodes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedNodes").field("live", &self.live).finish()
    }
}

impl<T> NodeSource<T> for BoxedNodes<T> {
    fn create_with<F>(&mut self, make: F) -> Result<NonNull<Node<T>>>
    where
        F: FnOnce() -> T,
    {
        let node = Node::leaf(make());
        let layout = Layout::new::<Node<T>>();
        // SAFETY: Node<T> holds two pointers, so the layout is never zero-sized
        let raw = unsafe { alloc::alloc(layout) }.cast::<Node<T>>();
        let ptr = NonNull::new(raw).ok_or_else(|| HeapError::allocation_failed::<Node<T>>(1))?;
        // SAFETY: freshly allocated with Node<T>'s layout
        unsafe { ptr.as_ptr().write(node) };
        self.live += 1;
        Ok(ptr)
    }

    unsafe fn reclaim(&mut self, node: NonNull<Node<T>>) -> T {
        // Allocated with Layout::new::<Node<T>>(), which matches Box
        let node = Box::from_raw(node.as_ptr());
        self.live -= 1;
        node.key
    }

    fn absorb(&mut self, other: &mut Self) {
        self.live += other.live;
        other.live = 0;
    }

    fn live_nodes(&self) -> usize {
        self.live
    }
}

// ============================================================================
// NodePool - recycled slots
// ============================================================================

impl<T> NodeSource<T> for NodePool<Node<T>> {
    fn create_with<F>(&mut self, make: F) -> Result<NonNull<Node<T>>>
    where
        F: FnOnce() -> T,
    {
        self.try_create_with(|| Node::leaf(make()))
    }

    unsafe fn reclaim(&mut self, node: NonNull<Node<T>>) -> T {
        self.take(node).key
    }

    fn reserve(&mut self, n: usize) -> Result<()> {
        self.try_reserve(n)
    }

    fn release(&mut self) -> Result<()> {
        self.try_release_all()
    }

    fn absorb(&mut self, other: &mut Self) {
        NodePool::absorb(self, other)
    }

    fn live_nodes(&self) -> usize {
        self.live()
    }
}
