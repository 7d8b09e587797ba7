/// A fixed-length bit vector over the row positions of one block.
///
/// Backed by `u64` words, least-significant bit first: bit `i` lives at word
/// `i / 64`, offset `i % 64`. The length is set once per scan via
/// [`init`](Bitmap::init); bits past the length are kept zero so whole-word
/// operations stay valid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bitmap {
    words: Vec<u64>,
    bits_len: usize,
}

impl Bitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes the bitmap to `bits_len` bits, all unset. The word buffer is
    /// reused across calls, which is what makes pooling worthwhile.
    pub fn init(&mut self, bits_len: usize) {
        let words_len = bits_len.div_ceil(64);
        self.words.clear();
        self.words.resize(words_len, 0);
        self.bits_len = bits_len;
    }

    /// Releases the backing storage down to an empty bitmap.
    pub fn reset(&mut self) {
        self.words.clear();
        self.bits_len = 0;
    }

    #[must_use]
    pub fn bits_len(&self) -> usize {
        self.bits_len
    }

    /// Sets every bit in `[0, bits_len)`.
    pub fn set_bits(&mut self) {
        for w in &mut self.words {
            *w = u64::MAX;
        }
        let tail_bits = self.bits_len % 64;
        if tail_bits > 0 {
            if let Some(last) = self.words.last_mut() {
                // Bits outside bits_len must stay zero.
                *last &= (1u64 << tail_bits) - 1;
            }
        }
    }

    /// Clears every bit.
    pub fn reset_bits(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    #[must_use]
    pub fn is_set(&self, idx: usize) -> bool {
        debug_assert!(idx < self.bits_len);
        self.words[idx / 64] & (1u64 << (idx % 64)) != 0
    }

    pub fn set_bit(&mut self, idx: usize) {
        debug_assert!(idx < self.bits_len);
        self.words[idx / 64] |= 1u64 << (idx % 64);
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// `self &= !other`.
    ///
    /// # Panics
    ///
    /// Panics if the bitmaps have different lengths; merging bitmaps from
    /// different blocks is a logic bug, not a recoverable condition.
    pub fn and_not(&mut self, other: &Bitmap) {
        assert_eq!(
            self.bits_len, other.bits_len,
            "cannot merge bitmaps with distinct lengths"
        );
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= !b;
        }
    }

    /// `self |= other`.
    ///
    /// # Panics
    ///
    /// Panics if the bitmaps have different lengths.
    pub fn or(&mut self, other: &Bitmap) {
        assert_eq!(
            self.bits_len, other.bits_len,
            "cannot merge bitmaps with distinct lengths"
        );
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    /// Calls `f` for every set bit in ascending order and clears the bit
    /// when `f` returns `false`. This is the narrowing primitive predicates
    /// are built on: the closure answers "does row `idx` still match?".
    pub fn for_each_set_bit<F: FnMut(usize) -> bool>(&mut self, mut f: F) {
        let bits_len = self.bits_len;
        for (wi, word) in self.words.iter_mut().enumerate() {
            if *word == 0 {
                continue;
            }
            for j in 0..64 {
                let mask = 1u64 << j;
                if *word & mask == 0 {
                    continue;
                }
                let idx = wi * 64 + j;
                if idx >= bits_len {
                    break;
                }
                if !f(idx) {
                    *word &= !mask;
                }
            }
        }
    }

    /// Sets `n` bits starting at `start`, clamped to the bitmap length.
    pub fn set_bits_range(&mut self, start: usize, n: usize) {
        self.apply_range(start, n, true);
    }

    /// Clears `n` bits starting at `start`, clamped to the bitmap length.
    pub fn clear_bits_range(&mut self, start: usize, n: usize) {
        self.apply_range(start, n, false);
    }

    fn apply_range(&mut self, start: usize, n: usize, set: bool) {
        if n == 0 || start >= self.bits_len {
            return;
        }
        // n can come straight from untrusted run-length bytes
        let end = start.saturating_add(n).min(self.bits_len);
        let start_word = start / 64;
        let end_word = (end - 1) / 64;

        if start_word == end_word {
            let mask = (u64::MAX << (start % 64)) & (ones_through(end - 1));
            self.apply_mask(start_word, mask, set);
            return;
        }

        self.apply_mask(start_word, u64::MAX << (start % 64), set);
        for wi in start_word + 1..end_word {
            self.words[wi] = if set { u64::MAX } else { 0 };
        }
        self.apply_mask(end_word, ones_through(end - 1), set);
    }

    fn apply_mask(&mut self, wi: usize, mask: u64, set: bool) {
        if set {
            self.words[wi] |= mask;
        } else {
            self.words[wi] &= !mask;
        }
    }
}

/// Mask with bits `0..=bit % 64` set.
fn ones_through(bit: usize) -> u64 {
    let b = (bit % 64) as u32;
    if b == 63 {
        u64::MAX
    } else {
        (1u64 << (b + 1)) - 1
    }
}
