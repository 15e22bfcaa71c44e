//! Aligned, exclusively owned buffers.

use crate::error::{MemoryError, MemoryResult};

/// Fixed-count buffer whose first element sits on an `alignment`-byte
/// boundary.
///
/// The buffer over-allocates by at most `alignment` elements and exposes the
/// aligned window. It is not `Clone`. Moving it out with [`take`] leaves the
/// source empty (length 0, no backing store), so only one owner ever frees the
/// allocation.
///
/// Construction through [`AlignedBuffer::new`] never panics: on failure the
/// buffer is empty and [`is_valid`] returns `false`. Use [`try_new`] to learn
/// why.
///
/// [`take`]: AlignedBuffer::take
/// [`is_valid`]: AlignedBuffer::is_valid
/// [`try_new`]: AlignedBuffer::try_new
#[derive(Debug)]
pub struct AlignedBuffer<T> {
    storage: Vec<T>,
    offset: usize,
    len: usize,
    alignment: usize,
}

impl<T: Default> AlignedBuffer<T> {
    /// Allocate `count` default-initialised elements aligned to `alignment`.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero, `T` is zero-sized, the alignment
    /// is invalid or unreachable, or the allocator refuses the request.
    pub fn try_new(count: usize, alignment: usize) -> MemoryResult<Self> {
        let element_size = core::mem::size_of::<T>();
        let required = core::mem::align_of::<T>();
        if count == 0 {
            return Err(MemoryError::ZeroCount);
        }
        if element_size == 0 {
            return Err(MemoryError::ZeroSizedType);
        }
        if !alignment.is_power_of_two() || alignment < required {
            return Err(MemoryError::InvalidAlignment {
                alignment,
                required,
            });
        }

        let slack = alignment / required;
        let total = count.checked_add(slack).ok_or(MemoryError::AllocationFailed {
            bytes: usize::MAX,
        })?;
        let bytes = total.saturating_mul(element_size);

        let mut storage: Vec<T> = Vec::new();
        storage
            .try_reserve_exact(total)
            .map_err(|_alloc| MemoryError::AllocationFailed { bytes })?;
        storage.resize_with(total, T::default);

        let offset = storage.as_ptr().align_offset(alignment);
        if offset.checked_add(count).is_none_or(|end| end > total) {
            return Err(MemoryError::UnreachableAlignment {
                alignment,
                element_size,
            });
        }

        Ok(Self {
            storage,
            offset,
            len: count,
            alignment,
        })
    }

    /// Allocate, degrading to the empty state on failure.
    #[must_use]
    pub fn new(count: usize, alignment: usize) -> Self {
        match Self::try_new(count, alignment) {
            Ok(buffer) => buffer,
            Err(error) => {
                tracing::warn!(count, alignment, %error, "aligned buffer allocation failed");
                Self::empty()
            }
        }
    }
}

impl<T> AlignedBuffer<T> {
    /// An empty, invalid buffer.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            storage: Vec::new(),
            offset: 0,
            len: 0,
            alignment: 0,
        }
    }

    /// Whether the buffer owns storage.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.len > 0
    }

    /// Number of usable elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment in bytes, or 0 when empty.
    #[must_use]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// The aligned elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.storage
            .get(self.offset..self.offset.saturating_add(self.len))
            .unwrap_or(&[])
    }

    /// The aligned elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let end = self.offset.saturating_add(self.len);
        self.storage.get_mut(self.offset..end).unwrap_or(&mut [])
    }

    /// Move the storage out, leaving `self` empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// Free the storage now.
    pub fn release(&mut self) {
        *self = Self::empty();
    }
}

impl<T> Default for AlignedBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}
