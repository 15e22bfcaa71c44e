//! # beatguard-memory
//!
//! Memory-safety utilities for a resource-starved device.
//!
//! - [`AlignedBuffer`]: fixed-count, alignment-constrained buffer with a
//!   reportable empty state instead of allocation panics
//! - [`SafeVector`]: fixed-capacity, append-only container
//! - [`MemoryMonitor`]: heap readings, fragmentation and peak usage
//! - [`StackGuard`]: stack headroom against a 512-byte margin
//!
//! Ordinary single-object heap ownership is plain `Box<T>`; nothing here
//! duplicates it.
//!
//! ## Example
//!
//! ```rust
//! use beatguard_memory::prelude::*;
//! use beatguard_platform::HostPlatform;
//!
//! let platform = HostPlatform::new();
//! let monitor = MemoryMonitor::new(&platform);
//! assert!(!monitor.is_low_memory());
//!
//! let mut samples = SafeVector::with_capacity(2);
//! assert!(samples.push(0.5_f32));
//! assert!(samples.push(0.7));
//! assert!(!samples.push(0.9));
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]

pub mod buffer;
pub mod error;
pub mod monitor;
pub mod prelude;
pub mod vector;

pub use buffer::AlignedBuffer;
pub use error::{MemoryError, MemoryResult};
pub use monitor::{
    CRITICAL_MEMORY_THRESHOLD, LOW_MEMORY_THRESHOLD, MIN_STACK_MARGIN, MemoryMonitor,
    MemorySnapshot, StackGuard,
};
pub use vector::SafeVector;
