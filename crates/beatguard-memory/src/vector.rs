//! Fixed-capacity vector.

/// Append-only container that never grows past its capacity.
///
/// Storage is reserved once at construction. `push` past capacity reports
/// failure instead of reallocating, which bounds both memory and the worst-case
/// cost of an append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeVector<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> SafeVector<T> {
    /// Reserve room for `capacity` elements.
    ///
    /// If the allocator refuses, the vector has capacity 0.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut items = Vec::new();
        match items.try_reserve_exact(capacity) {
            Ok(()) => Self { items, capacity },
            Err(error) => {
                tracing::warn!(capacity, %error, "safe vector reservation failed");
                Self {
                    items: Vec::new(),
                    capacity: 0,
                }
            }
        }
    }

    /// Append `value`. Returns `false` (dropping the value) when full.
    pub fn push(&mut self, value: T) -> bool {
        self.try_push(value).is_ok()
    }

    /// Append `value`, handing it back when full.
    ///
    /// # Errors
    ///
    /// Returns `Err(value)` if the vector is full.
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.items.push(value);
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Element at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Remove every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Maximum number of elements.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another push would fail.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// The elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<'v, T> IntoIterator for &'v SafeVector<T> {
    type Item = &'v T;
    type IntoIter = core::slice::Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
