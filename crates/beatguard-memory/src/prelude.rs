//! Convenience re-exports for memory utilities.

pub use crate::buffer::AlignedBuffer;
pub use crate::error::{MemoryError, MemoryResult};
pub use crate::monitor::{MemoryMonitor, MemorySnapshot, StackGuard};
pub use crate::vector::SafeVector;
