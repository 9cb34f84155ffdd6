//! Error types for heap and pool operations
//!
//! Two classes of failure exist: the allocator could not provide memory, or a
//! documented precondition was violated by the caller. Unchecked entry points
//! (`top`, `release_all`, ...) treat violations as programming errors; the
//! `try_*` entry points report them through [`HeapError`] instead.

use std::fmt;
use thiserror::Error;

/// Errors reported by the checked heap and pool entry points
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// The system allocator could not provide storage for new node slots
    #[error("allocation of {slots} node slots ({bytes} bytes) failed")]
    AllocationFailed { slots: usize, bytes: usize },

    /// A documented precondition of the operation did not hold
    #[error("precondition violated: {0}")]
    PreconditionViolated(Violation),

    /// A pool configuration was rejected
    #[error("invalid pool configuration: {reason}")]
    InvalidConfig { reason: &'static str },
}

/// The precondition that was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// `top`/`pop` was requested on an empty heap
    EmptyHeap,
    /// Pool storage release was requested while slots are still constructed
    LiveNodes { live: usize },
    /// Pool storage release was requested while the heap still holds elements
    HeapNotEmpty { len: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EmptyHeap => write!(f, "heap is empty"),
            Violation::LiveNodes { live } => {
                write!(f, "pool still has {live} live nodes")
            }
            Violation::HeapNotEmpty { len } => {
                write!(f, "heap still holds {len} elements")
            }
        }
    }
}

/// Coarse classification of a [`HeapError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Allocation,
    Precondition,
    Config,
}

impl HeapError {
    /// Returns the class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeapError::AllocationFailed { .. } => ErrorKind::Allocation,
            HeapError::PreconditionViolated(_) => ErrorKind::Precondition,
            HeapError::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    /// True if the caller broke a documented precondition
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }

    /// Returns the violated precondition, if any
    pub fn violation(&self) -> Option<Violation> {
        match self {
            HeapError::PreconditionViolated(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn allocation_failed<N>(slots: usize) -> Self {
        HeapError::AllocationFailed {
            slots,
            bytes: slots.saturating_mul(std::mem::size_of::<N>()),
        }
    }
}

impl From<Violation> for HeapError {
    fn from(v: Violation) -> Self {
        HeapError::PreconditionViolated(v)
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HeapError>;
