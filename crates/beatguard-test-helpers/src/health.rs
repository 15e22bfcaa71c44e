//! Switchable health-check callback.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Inner {
    healthy: AtomicBool,
    calls: AtomicU32,
}

/// A health predicate whose answer tests flip at will.
///
/// Clones share state, so a test keeps one clone and hands the callback
/// produced by [`HealthSwitch::check`] to the code under test.
#[derive(Debug, Clone)]
pub struct HealthSwitch {
    inner: Arc<Inner>,
}

impl HealthSwitch {
    /// Create a switch reporting `healthy`.
    #[must_use]
    pub fn new(healthy: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                healthy: AtomicBool::new(healthy),
                calls: AtomicU32::new(0),
            }),
        }
    }

    /// Change the reported answer.
    pub fn set(&self, healthy: bool) {
        self.inner.healthy.store(healthy, Ordering::Release);
    }

    /// Number of times the callback has been invoked.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.inner.calls.load(Ordering::Acquire)
    }

    /// A callback reading this switch.
    #[must_use]
    pub fn check(&self) -> Arc<dyn Fn() -> bool + Send + Sync> {
        let inner = Arc::clone(&self.inner);
        Arc::new(move || {
            inner.calls.fetch_add(1, Ordering::AcqRel);
            inner.healthy.load(Ordering::Acquire)
        })
    }
}

impl Default for HealthSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}
