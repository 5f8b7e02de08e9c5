//! Power-of-two ring buffer of `u32` cells.
//!
//! Items are either stored inline in the cell (small unsigned integers) or
//! boxed into a side map keyed by a generated id, with the cell holding the
//! id. Cell encoding:
//!
//! | cell | meaning |
//! |---|---|
//! | `0` | empty slot |
//! | `1..=0x7FFF_FFFF` | inline value `cell - 1` |
//! | `0x8000_0000 \| id` | boxed item `id` (ids start at 1) |
//!
//! Inline values are offset by one so a stored `0` never reads as empty.
//!
//! Used through [`CircularDeque::add_first`] and
//! [`CircularDeque::remove_last`] only, the deque is FIFO: the oldest item
//! comes out first.

use gland_core::DequeError;
use std::collections::HashMap;
use std::sync::Arc;

const EMPTY: u32 = 0;
const BOXED: u32 = 0x8000_0000;
const INLINE_MAX: u32 = BOXED - 2;
const MIN_CAPACITY: usize = 4;

/// Types the deque can store.
///
/// The default methods box every value. Override both to allow the inline
/// fast path for values that fit in 31 bits.
pub trait DequeItem: Sized {
    /// Inline representation, if the value has one.
    fn to_inline(&self) -> Option<u32> {
        None
    }

    /// Rebuild a value from its inline representation.
    fn from_inline(_raw: u32) -> Option<Self> {
        None
    }
}

macro_rules! inline_unsigned {
    ($($ty:ty),*) => {
        $(
            impl DequeItem for $ty {
                fn to_inline(&self) -> Option<u32> {
                    u32::try_from(*self).ok()
                }

                fn from_inline(raw: u32) -> Option<Self> {
                    <$ty>::try_from(raw).ok()
                }
            }
        )*
    };
}

inline_unsigned!(u8, u16, u32, u64, usize);

impl DequeItem for String {}
impl DequeItem for &'static str {}
impl<T> DequeItem for Box<T> {}
impl<T: ?Sized> DequeItem for Arc<T> {}

/// A capacity-doubling ring buffer.
#[derive(Debug)]
pub struct CircularDeque<T> {
    cells: Vec<u32>,
    head: usize,
    len: usize,
    boxed: HashMap<u32, T>,
    next_key: u32,
}

impl<T: DequeItem> Default for CircularDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DequeItem> CircularDeque<T> {
    /// Create a deque with the minimum capacity.
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Create a deque with at least `capacity` slots, rounded up to a power
    /// of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY).next_power_of_two();
        Self {
            cells: vec![EMPTY; capacity],
            head: 0,
            len: 0,
            boxed: HashMap::new(),
            next_key: 1,
        }
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the deque holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.len == self.cells.len()
    }

    /// Current slot count.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Push an item at the front, growing once the deque is 75% full.
    pub fn add_first(&mut self, item: T) {
        if (self.len + 1) * 4 > self.capacity() * 3 {
            self.grow();
        }
        let cell = self.store(item);
        self.head = (self.head + self.capacity() - 1) & self.mask();
        self.cells[self.head] = cell;
        self.len += 1;
    }

    /// Pop the item at the back (the oldest one).
    pub fn remove_last(&mut self) -> Result<Option<T>, DequeError> {
        if self.len == 0 {
            return Ok(None);
        }
        let idx = self.back_index();
        let cell = std::mem::replace(&mut self.cells[idx], EMPTY);
        self.len -= 1;
        if self.len == 0 {
            self.head = 0;
        }
        self.load(cell).map(Some)
    }

    /// Drop every item and reset to an empty state. Capacity is kept.
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
        self.boxed.clear();
        self.head = 0;
        self.len = 0;
    }

    /// Remove items oldest-first until the deque is empty.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { deque: self }
    }

    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    fn back_index(&self) -> usize {
        (self.head + self.len - 1) & self.mask()
    }

    fn grow(&mut self) {
        let mask = self.mask();
        let mut cells = vec![EMPTY; self.capacity() * 2];
        for (i, cell) in cells.iter_mut().take(self.len).enumerate() {
            *cell = self.cells[(self.head + i) & mask];
        }
        self.cells = cells;
        self.head = 0;
    }

    fn store(&mut self, item: T) -> u32 {
        if let Some(raw) = item.to_inline().filter(|raw| *raw <= INLINE_MAX) {
            return raw + 1;
        }
        let key = self.allocate_key();
        self.boxed.insert(key, item);
        key | BOXED
    }

    fn load(&mut self, cell: u32) -> Result<T, DequeError> {
        let corrupted = DequeError::Corrupted { cell };
        match cell {
            EMPTY => Err(corrupted),
            c if c & BOXED != 0 => self.boxed.remove(&(c & !BOXED)).ok_or(corrupted),
            c => T::from_inline(c - 1).ok_or(corrupted),
        }
    }

    fn allocate_key(&mut self) -> u32 {
        loop {
            let key = self.next_key;
            self.next_key = if key >= !BOXED { 1 } else { key + 1 };
            if !self.boxed.contains_key(&key) {
                return key;
            }
        }
    }
}

impl<T: DequeItem + Clone> CircularDeque<T> {
    /// Look at the item [`remove_last`](Self::remove_last) would return.
    pub fn peek_last(&self) -> Result<Option<T>, DequeError> {
        if self.len == 0 {
            return Ok(None);
        }
        let cell = self.cells[self.back_index()];
        let corrupted = DequeError::Corrupted { cell };
        match cell {
            EMPTY => Err(corrupted),
            c if c & BOXED != 0 => self
                .boxed
                .get(&(c & !BOXED))
                .cloned()
                .map(Some)
                .ok_or(corrupted),
            c => T::from_inline(c - 1).map(Some).ok_or(corrupted),
        }
    }
}

/// Draining iterator returned by [`CircularDeque::drain`].
pub struct Drain<'a, T: DequeItem> {
    deque: &'a mut CircularDeque<T>,
}

impl<T: DequeItem> Iterator for Drain<'_, T> {
    type Item = Result<T, DequeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.deque.remove_last().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.deque.len(), Some(self.deque.len()))
    }
}
