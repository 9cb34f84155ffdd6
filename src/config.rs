//! Configuration for node pools and heaps

use crate::error::{HeapError, Result};

/// Default number of slots in a pool's first block
pub const DEFAULT_INITIAL_BLOCK_CAPACITY: usize = 4096;

/// Upper bound for the size of any single pool block, in slots
pub const DEFAULT_MAX_BLOCK_CAPACITY: usize = 1 << 28;

/// Sizing policy for a [`NodePool`](crate::pool::NodePool)
///
/// Blocks start at `initial_block_capacity` slots and double each time a new
/// block is needed, never exceeding `max_block_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Slots in the first block
    pub initial_block_capacity: usize,
    /// Ceiling for block growth
    pub max_block_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_block_capacity: DEFAULT_INITIAL_BLOCK_CAPACITY,
            max_block_capacity: DEFAULT_MAX_BLOCK_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Small blocks, for many short-lived heaps
    #[must_use]
    pub fn small() -> Self {
        Self {
            initial_block_capacity: 64,
            max_block_capacity: 1 << 16,
        }
    }

    /// Large blocks, for a single long-running high-churn heap
    #[must_use]
    pub fn large() -> Self {
        Self {
            initial_block_capacity: 1 << 16,
            max_block_capacity: DEFAULT_MAX_BLOCK_CAPACITY,
        }
    }

    /// Sets the first block's capacity
    #[must_use]
    pub fn with_initial_block_capacity(mut self, slots: usize) -> Self {
        self.initial_block_capacity = slots;
        self
    }

    /// Sets the growth ceiling
    #[must_use]
    pub fn with_max_block_capacity(mut self, slots: usize) -> Self {
        self.max_block_capacity = slots;
        self
    }

    /// Checks that the configuration describes a usable growth policy
    pub fn validate(&self) -> Result<()> {
        if self.initial_block_capacity == 0 {
            return Err(HeapError::InvalidConfig {
                reason: "initial block capacity must be non-zero",
            });
        }
        if self.max_block_capacity < self.initial_block_capacity {
            return Err(HeapError::InvalidConfig {
                reason: "max block capacity is below the initial block capacity",
            });
        }
        Ok(())
    }
}

/// How the merge primitive walks the right spines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Explicit worklist; stack usage is constant
    #[default]
    Iterative,
    /// Direct recursion; stack depth grows with the merged right-spine length
    Recursive,
}

/// Per-heap settings fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapConfig {
    /// Which meld formulation the heap uses
    pub merge_strategy: MergeStrategy,
}

impl HeapConfig {
    /// Sets the meld formulation
    #[must_use]
    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }
}
