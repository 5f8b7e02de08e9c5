//! Bit-vector presence index over trie node ids.
//!
//! One bit per node id, set while that node has at least one listener. The
//! index lives beside the trie rather than inside it so "does this node have
//! listeners" is a single word probe.

const WORD_BITS: usize = u64::BITS as usize;

/// A growable bitset with a highest-set-bit watermark.
#[derive(Debug, Clone, Default)]
pub struct PresenceIndex {
    words: Vec<u64>,
    /// Highest id whose bit is set, if any.
    highest: Option<usize>,
    count: usize,
}

impl PresenceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with room for `bits` ids before growing.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
            highest: None,
            count: 0,
        }
    }

    /// Set the bit for `id`, growing storage by doubling if needed.
    pub fn set(&mut self, id: usize) {
        let (word, mask) = locate(id);
        if word >= self.words.len() {
            let mut len = self.words.len().max(1);
            while len <= word {
                len *= 2;
            }
            self.words.resize(len, 0);
        }
        if self.words[word] & mask == 0 {
            self.words[word] |= mask;
            self.count += 1;
        }
        if self.highest.is_none_or(|h| id > h) {
            self.highest = Some(id);
        }
    }

    /// Clear the bit for `id`.
    pub fn clear(&mut self, id: usize) {
        let (word, mask) = locate(id);
        let Some(slot) = self.words.get_mut(word) else {
            return;
        };
        if *slot & mask == 0 {
            return;
        }
        *slot &= !mask;
        self.count -= 1;
        if self.highest == Some(id) {
            self.highest = self.scan_highest(word);
        }
    }

    /// Whether the bit for `id` is set.
    pub fn get(&self, id: usize) -> bool {
        if self.highest.is_none_or(|h| id > h) {
            return false;
        }
        let (word, mask) = locate(id);
        self.words[word] & mask != 0
    }

    /// Whether any bit in `start..end` is set.
    pub fn has_any_in_range(&self, start: usize, end: usize) -> bool {
        let Some(highest) = self.highest else {
            return false;
        };
        let end = end.min(highest + 1);
        if start >= end {
            return false;
        }
        let (first, last) = (start / WORD_BITS, (end - 1) / WORD_BITS);
        for word in first..=last {
            let mut bits = self.words[word];
            if word == first {
                bits &= u64::MAX << (start % WORD_BITS);
            }
            if word == last {
                let tail = (end - 1) % WORD_BITS;
                if tail < WORD_BITS - 1 {
                    bits &= (1u64 << (tail + 1)) - 1;
                }
            }
            if bits != 0 {
                return true;
            }
        }
        false
    }

    /// Whether any bit is set at all.
    pub fn any(&self) -> bool {
        self.highest.is_some()
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Highest set id, if any.
    pub fn highest(&self) -> Option<usize> {
        self.highest
    }

    /// Iterate set ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let limit = self.highest.map_or(0, |h| h / WORD_BITS + 1);
        self.words[..limit]
            .iter()
            .enumerate()
            .flat_map(|(w, &bits)| {
                (0..WORD_BITS)
                    .filter(move |b| bits & (1u64 << b) != 0)
                    .map(move |b| w * WORD_BITS + b)
            })
    }

    fn scan_highest(&self, from_word: usize) -> Option<usize> {
        (0..=from_word).rev().find_map(|w| {
            let bits = self.words[w];
            (bits != 0).then(|| w * WORD_BITS + (WORD_BITS - 1 - bits.leading_zeros() as usize))
        })
    }
}

fn locate(id: usize) -> (usize, u64) {
    (id / WORD_BITS, 1u64 << (id % WORD_BITS))
}
