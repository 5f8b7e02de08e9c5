//! Buffer for events emitted while nothing listened on them.
//!
//! Delivery is best-effort: entries live in memory only and
//! [`EventQueue::clear`] discards them unconditionally.

use crate::deque::{CircularDeque, DequeItem, Drain};
use gland_core::DequeError;
use std::future::Future;

/// An event held for later replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedEvent<D> {
    /// Concrete event name it was emitted under.
    pub name: String,
    /// Payload to replay.
    pub data: D,
    /// Emission order across all queues of one router.
    pub seq: u64,
}

impl<D> DequeItem for QueuedEvent<D> {}

/// FIFO buffer backed by a [`CircularDeque`].
#[derive(Debug)]
pub struct EventQueue<T> {
    deque: CircularDeque<T>,
    limit: Option<usize>,
}

impl<T: DequeItem> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DequeItem> EventQueue<T> {
    /// Create an unbounded queue.
    pub fn new() -> Self {
        Self {
            deque: CircularDeque::new(),
            limit: None,
        }
    }

    /// Create a queue with an initial capacity and an optional bound.
    ///
    /// Once `limit` entries are buffered, each new entry evicts the oldest.
    pub fn with_capacity(capacity: usize, limit: Option<usize>) -> Self {
        Self {
            deque: CircularDeque::with_capacity(capacity),
            limit,
        }
    }

    /// Buffer an entry. Returns the entry evicted to respect the bound.
    pub fn enqueue(&mut self, item: T) -> Result<Option<T>, DequeError> {
        let evicted = match self.limit {
            Some(0) => return Ok(Some(item)),
            Some(limit) if self.deque.len() >= limit => self.deque.remove_last()?,
            _ => None,
        };
        self.deque.add_first(item);
        Ok(evicted)
    }

    /// Await `f` for every buffered entry, oldest first, one at a time.
    ///
    /// Returns how many entries were processed.
    pub async fn process<F, Fut>(&mut self, mut f: F) -> Result<usize, DequeError>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut processed = 0;
        while let Some(item) = self.deque.remove_last()? {
            f(item).await;
            processed += 1;
        }
        Ok(processed)
    }

    /// Synchronously remove entries oldest first.
    pub fn drain(&mut self) -> Drain<'_, T> {
        self.deque.drain()
    }

    /// Discard every buffered entry.
    pub fn clear(&mut self) {
        self.deque.clear();
    }

    /// Number of buffered entries.
    pub fn len(&self) -> usize {
        self.deque.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.deque.is_empty()
    }
}
