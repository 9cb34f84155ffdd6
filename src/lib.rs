//! Mergeable Skew Heaps for Rust
//!
//! This crate provides a skew heap: a self-adjusting, heap-ordered binary tree
//! whose push, pop and merge all cost O(log n) amortized. Merging two heaps
//! relinks their trees instead of copying elements.
//!
//! # Features
//!
//! - **[`SkewHeap`]**: min-heap by default; any strict weak ordering via [`Compare`]
//! - **[`SkewHeapArena`]**: the same heap with nodes recycled through a [`NodePool`]
//! - **[`NodePool`]**: free-list object pool with geometric block growth and
//!   live-object accounting
//! - Checked `try_*` entry points reporting [`HeapError`] for allocation
//!   failures and precondition violations
//!
//! # Example
//!
//! ```rust
//! use rust_skew_heaps::{MaxOrder, SkewHeap, SkewHeapArena};
//!
//! let mut heap = SkewHeap::with_comparator(MaxOrder);
//! heap.extend([5, 3, 7, 2, 9, 1, 8]);
//! assert_eq!(heap.pop(), Some(9));
//!
//! let mut arena: SkewHeapArena<i32> = SkewHeapArena::default();
//! arena.reserve_nodes(1024);
//! arena.extend([4, 2, 6]);
//! assert_eq!(arena.top(), &2);
//! ```
//!
//! # Threading
//!
//! Heaps and pools are single-threaded values. They are `Send` when their
//! contents are, and shared access needs external synchronization.

pub mod compare;
pub mod config;
pub mod error;
pub mod pool;
pub mod skew;
pub mod storage;
pub mod traits;

pub use compare::{Compare, MaxOrder, MinOrder, OrderBy};
pub use config::{HeapConfig, MergeStrategy, PoolConfig};
pub use error::{ErrorKind, HeapError, Result, Violation};
pub use pool::NodePool;
pub use skew::{DrainSorted, SkewHeap, SkewHeapArena};
pub use storage::{BoxedNodes, Node, NodeSource};
pub use traits::Heap;
