//! Error types for memory utilities.

use thiserror::Error;

/// Reasons an [`AlignedBuffer`](crate::AlignedBuffer) could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Zero elements were requested.
    #[error("Buffer element count must be non-zero")]
    ZeroCount,

    /// The element type occupies no memory.
    #[error("Zero-sized element types cannot be aligned")]
    ZeroSizedType,

    /// The alignment is not a power of two, or is below the type's own.
    #[error("Invalid alignment {alignment} (type requires {required})")]
    InvalidAlignment {
        /// Requested alignment.
        alignment: usize,
        /// The element type's natural alignment.
        required: usize,
    },

    /// No element offset inside the allocation satisfies the alignment.
    #[error("Alignment {alignment} is unreachable for {element_size}-byte elements")]
    UnreachableAlignment {
        /// Requested alignment.
        alignment: usize,
        /// Element size in bytes.
        element_size: usize,
    },

    /// The allocator refused the request.
    #[error("Allocation of {bytes} bytes failed")]
    AllocationFailed {
        /// Bytes requested.
        bytes: usize,
    },
}

/// A specialized `Result` type for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;
