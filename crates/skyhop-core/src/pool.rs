use serde::{Deserialize, Serialize};

/// An object that can be parked in an [`EntityPool`].
pub trait Poolable {
    /// Reset the object into its parked state: inactive, at rest.
    fn deactivate(&mut self);
}

/// What happened to an instance handed back to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Pooled,
    /// The pool was full; the instance was dropped.
    Discarded,
}

/// Bounded free-list of reusable objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool<T> {
    free: Vec<T>,
    capacity: usize,
}

impl<T: Poolable> EntityPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Take a parked instance, if any.
    pub fn acquire(&mut self) -> Option<T> {
        self.free.pop()
    }

    /// Park `item`, or drop it when the pool is already at capacity.
    pub fn release(&mut self, mut item: T) -> Release {
        if self.free.len() >= self.capacity {
            tracing::trace!(capacity = self.capacity, "pool full, discarding instance");
            return Release::Discarded;
        }
        item.deactivate();
        self.free.push(item);
        Release::Pooled
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}
