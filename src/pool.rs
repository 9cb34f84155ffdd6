//! Block-growth object pool
//!
//! A [`NodePool`] owns raw memory blocks subdivided into node-sized slots and
//! hands slots out through a free list. Blocks start at the configured initial
//! capacity and double in size every time the pool has to grow, up to
//! [`PoolConfig::max_block_capacity`].
//!
//! | Operation      | Complexity                   |
//! |----------------|------------------------------|
//! | `create`       | O(1) amortized               |
//! | `destroy`      | O(1)                         |
//! | `reserve(n)`   | O(n) when growing, else O(1) |
//! | `release_all`  | O(number of blocks)          |
//!
//! # Slot lifetime
//!
//! Every block is a separate allocation, so a slot's address never changes
//! while the pool (or a pool that [absorbed](NodePool::absorb) it) is alive,
//! even if the `NodePool` value itself is moved.
//!
//! # Example
//!
//! ```rust
//! use rust_skew_heaps::pool::NodePool;
//!
//! let mut pool = NodePool::with_block_capacity(16);
//! pool.reserve(8);
//! assert!(pool.capacity_slots() >= 8);
//!
//! let slot = pool.create(String::from("hello"));
//! assert_eq!(pool.live(), 1);
//!
//! // SAFETY: `slot` came from this pool and is not used afterwards
//! let value = unsafe { pool.take(slot) };
//! assert_eq!(value, "hello");
//! assert_eq!(pool.live(), 0);
//!
//! pool.release_all();
//! ```

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::{self, NonNull};

use tracing::{debug, error, trace};

use crate::config::PoolConfig;
use crate::error::{HeapError, Result, Violation};

/// One contiguous allocation of `slots` uninitialized `N`s
struct Block<N> {
    ptr: NonNull<N>,
    slots: usize,
    layout: Layout,
}

impl<N> Block<N> {
    fn allocate(slots: usize) -> Result<Self> {
        let layout =
            Layout::array::<N>(slots).map_err(|_| HeapError::allocation_failed::<N>(slots))?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                slots,
                layout,
            });
        }

        // SAFETY: layout has non-zero size
        let raw = unsafe { alloc::alloc(layout) }.cast::<N>();
        let ptr = NonNull::new(raw).ok_or_else(|| HeapError::allocation_failed::<N>(slots))?;

        Ok(Self { ptr, slots, layout })
    }

    fn slot(&self, index: usize) -> NonNull<N> {
        debug_assert!(index < self.slots);
        // SAFETY: index is within the allocation
        unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(index)) }
    }

    /// # Safety
    /// No slot of this block may be live or referenced afterwards.
    unsafe fn deallocate(self) {
        if self.layout.size() != 0 {
            alloc::dealloc(self.ptr.as_ptr().cast(), self.layout);
        }
    }
}

/// Fixed-size object pool with a free list and geometric block growth
///
/// Values are constructed in a slot by [`create`](Self::create) and torn down
/// by [`destroy`](Self::destroy) or [`take`](Self::take). Dropping the pool
/// frees its blocks but never runs destructors of live values; destroy every
/// value first.
pub struct NodePool<N> {
    blocks: Vec<Block<N>>,
    /// Invariant: `free.capacity() >= owned_slots`, so returning a slot never allocates
    free: Vec<NonNull<N>>,
    config: PoolConfig,
    next_block_capacity: usize,
    /// Slots in the blocks currently held
    owned_slots: usize,
    /// Slots ever made available, including released blocks
    total_slots: usize,
    live: usize,
}

// SAFETY: the pool uniquely owns its blocks; slots hold `N` values only
unsafe impl<N: Send> Send for NodePool<N> {}

impl<N> NodePool<N> {
    /// Creates an empty pool with the default [`PoolConfig`]
    pub fn new() -> Self {
        Self::from_valid_config(PoolConfig::default())
    }

    /// Creates an empty pool whose first block holds `slots` slots
    ///
    /// A hint of zero is treated as one.
    pub fn with_block_capacity(slots: usize) -> Self {
        let slots = slots.max(1);
        let config = PoolConfig::default().with_initial_block_capacity(slots);
        let config = config.with_max_block_capacity(config.max_block_capacity.max(slots));
        Self::from_valid_config(config)
    }

    /// Creates an empty pool, validating the configuration first
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PoolConfig) -> Self {
        Self {
            blocks: Vec::new(),
            free: Vec::new(),
            next_block_capacity: config.initial_block_capacity,
            config,
            owned_slots: 0,
            total_slots: 0,
            live: 0,
        }
    }

    /// Number of currently constructed values
    pub fn live(&self) -> usize {
        self.live
    }

    /// Total number of slots ever made available by this pool
    pub fn capacity_slots(&self) -> usize {
        self.total_slots
    }

    /// Number of slots ready to be handed out without growing
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Number of raw blocks currently held
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Size of the block the pool will allocate next
    pub fn next_block_capacity(&self) -> usize {
        self.next_block_capacity
    }

    /// Sizing policy this pool was created with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Ensures at least `n` free slots are available
    ///
    /// This is not additive: if `n` slots are already free, nothing happens.
    /// Aborts through [`alloc::handle_alloc_error`] if memory is exhausted.
    pub fn reserve(&mut self, n: usize) {
        if let Err(err) = self.try_reserve(n) {
            handle_alloc_failure::<N>(err);
        }
    }

    /// Fallible form of [`reserve`](Self::reserve)
    ///
    /// On failure the pool is still consistent; blocks obtained before the
    /// failing allocation stay in the free list.
    pub fn try_reserve(&mut self, n: usize) -> Result<()> {
        if self.free.len() >= n {
            return Ok(());
        }
        self.grow(n - self.free.len())
    }

    fn grow(&mut self, mut deficit: usize) -> Result<()> {
        while deficit > 0 {
            let slots = self
                .next_block_capacity
                .max(deficit)
                .min(self.config.max_block_capacity);

            // Reserve bookkeeping space first so nothing below can fail after
            // the block is allocated.
            let wanted = (self.owned_slots + slots).saturating_sub(self.free.len());
            self.free
                .try_reserve(wanted)
                .map_err(|_| HeapError::allocation_failed::<N>(slots))?;
            self.blocks
                .try_reserve(1)
                .map_err(|_| HeapError::allocation_failed::<N>(slots))?;

            let block = Block::allocate(slots)?;

            // Reverse order so the lowest addresses are handed out first
            self.free.extend((0..slots).rev().map(|i| block.slot(i)));
            self.blocks.push(block);
            self.owned_slots += slots;
            self.total_slots += slots;
            deficit = deficit.saturating_sub(slots);

            self.next_block_capacity = self
                .next_block_capacity
                .saturating_mul(2)
                .min(self.config.max_block_capacity);

            debug!(
                slots,
                blocks = self.blocks.len(),
                total = self.total_slots,
                "node pool grew"
            );
        }
        Ok(())
    }

    /// Moves `value` into a free slot and returns a pointer to it
    ///
    /// Aborts through [`alloc::handle_alloc_error`] if memory is exhausted.
    pub fn create(&mut self, value: N) -> NonNull<N> {
        match self.try_create(value) {
            Ok(slot) => slot,
            Err(err) => handle_alloc_failure::<N>(err),
        }
    }

    /// Fallible form of [`create`](Self::create)
    pub fn try_create(&mut self, value: N) -> Result<NonNull<N>> {
        self.try_create_with(|| value)
    }

    /// Secures a slot, then constructs the value in it
    ///
    /// `make` only runs once a slot is available. If it panics the pool is
    /// left unchanged apart from any growth that already happened.
    pub fn try_create_with<F>(&mut self, make: F) -> Result<NonNull<N>>
    where
        F: FnOnce() -> N,
    {
        if self.free.is_empty() {
            self.grow(1)?;
        }
        let value = make();
        let slot = self
            .free
            .pop()
            .ok_or_else(|| HeapError::allocation_failed::<N>(1))?;
        // SAFETY: free slots are valid, aligned and uninitialized
        unsafe { slot.as_ptr().write(value) };
        self.live += 1;
        Ok(slot)
    }

    /// Drops the value in `slot` and returns the slot to the free list
    ///
    /// `None` is a no-op.
    ///
    /// # Safety
    /// `slot` must have been returned by `create` on this pool (or on a pool
    /// this one absorbed), must still be live, and must not be used afterwards.
    pub unsafe fn destroy(&mut self, slot: Option<NonNull<N>>) {
        if let Some(slot) = slot {
            ptr::drop_in_place(slot.as_ptr());
            self.recycle(slot);
        }
    }

    /// Moves the value out of `slot` and returns the slot to the free list
    ///
    /// # Safety
    /// Same contract as [`destroy`](Self::destroy).
    pub unsafe fn take(&mut self, slot: NonNull<N>) -> N {
        let value = ptr::read(slot.as_ptr());
        self.recycle(slot);
        value
    }

    fn recycle(&mut self, slot: NonNull<N>) {
        debug_assert!(self.live > 0, "slot returned to a pool with no live values");
        self.free.push(slot);
        self.live -= 1;
    }

    /// Returns every block to the system allocator
    ///
    /// All values must have been destroyed first. This is asserted in debug
    /// builds; in release builds the call is refused and logged so live values
    /// are never left dangling. Use [`try_release_all`](Self::try_release_all)
    /// to handle the violation as an error.
    pub fn release_all(&mut self) {
        debug_assert!(
            self.live == 0,
            "NodePool::release_all(): there are {} live values",
            self.live
        );
        if let Err(err) = self.try_release_all() {
            error!(live = self.live, %err, "refusing to release node pool storage");
        }
    }

    /// Checked form of [`release_all`](Self::release_all)
    pub fn try_release_all(&mut self) -> Result<()> {
        if self.live != 0 {
            return Err(Violation::LiveNodes { live: self.live }.into());
        }

        let blocks = self.blocks.len();
        self.free.clear();
        for block in self.blocks.drain(..) {
            // SAFETY: no live values remain and the free list was cleared
            unsafe { block.deallocate() };
        }
        self.owned_slots = 0;
        // next_block_capacity is kept so a reused pool continues its growth pattern

        if blocks > 0 {
            debug!(blocks, "node pool released");
        }
        Ok(())
    }

    /// Takes over every block, free slot and live value of `other`
    ///
    /// Afterwards values created by `other` may be destroyed through `self`,
    /// and `other` is an empty pool that keeps its configuration.
    pub fn absorb(&mut self, other: &mut NodePool<N>) {
        if other.blocks.is_empty() {
            return;
        }

        trace!(
            blocks = other.blocks.len(),
            live = other.live,
            "node pool absorbing blocks"
        );

        self.blocks.append(&mut other.blocks);
        self.owned_slots += other.owned_slots;
        self.total_slots += other.owned_slots;
        self.live += other.live;

        let wanted = self.owned_slots.saturating_sub(self.free.len());
        self.free.reserve(wanted);
        self.free.append(&mut other.free);

        other.owned_slots = 0;
        other.live = 0;
    }
}

impl<N> Default for NodePool<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Drop for NodePool<N> {
    fn drop(&mut self) {
        if self.live != 0 {
            // Leaking is the only option that keeps outstanding values valid
            error!(
                live = self.live,
                blocks = self.blocks.len(),
                "node pool dropped with live values; leaking its blocks"
            );
            return;
        }
        let _ = self.try_release_all();
    }
}

impl<N> fmt::Debug for NodePool<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePool")
            .field("live", &self.live)
            .field("free", &self.free.len())
            .field("blocks", &self.blocks.len())
            .field("capacity_slots", &self.total_slots)
            .field("next_block_capacity", &self.next_block_capacity)
            .finish()
    }
}

/// Reports an allocation failure the way infallible std collections do
pub(crate) fn handle_alloc_failure<N>(err: HeapError) -> ! {
    error!(%err, "node allocation failed");
    alloc::handle_alloc_error(Layout::new::<N>())
}
