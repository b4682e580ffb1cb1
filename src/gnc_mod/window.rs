use std::collections::VecDeque;

use crate::error::{TvcError, TvcResult};

// ---------------------------------------------------------------------------
// Bounded sample window
// ---------------------------------------------------------------------------

/// Fixed-capacity FIFO window. Pushing into a full window drops the oldest
/// element first, so the length never exceeds the capacity.
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> TvcResult<Self> {
        if capacity == 0 {
            return Err(TvcError::InvalidArg {
                what: "window capacity must be at least 1",
            });
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append `item`, evicting from the front until there is room for it.
    pub fn push(&mut self, item: T) {
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
