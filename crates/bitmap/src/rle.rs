use encoding::{marshal_var_u64, unmarshal_var_u64, EncodingError};
use thiserror::Error;

use crate::Bitmap;

/// Errors raised while walking a boolean RLE stream.
///
/// Malformed run-length bytes indicate on-disk corruption of a tombstone
/// blob, not a condition the caller can repair.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RleError {
    #[error("corrupted boolean RLE stream: {0}")]
    Corrupt(#[from] EncodingError),
}

/// A run-length-encoded boolean sequence.
///
/// The byte stream holds alternating `VarUint64` run lengths
/// `[z0, o0, z1, o1, ...]`, zero-run first (`z0` may be 0). A trailing run
/// of zeros is implicit and never written, so the stream conceptually
/// extends with zeros forever. See the crate docs for examples.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoolRle {
    bytes: Vec<u8>,
}

/// Lock-step decoder over one RLE stream.
///
/// `rem` counts the positions left in the current run and `ones` is that
/// run's bit value. `load` skips zero-length runs, flipping polarity for
/// each, so after a successful `load` either `rem > 0` or the stream is
/// exhausted.
struct RunDecoder<'a> {
    src: &'a [u8],
    idx: usize,
    rem: u64,
    ones: bool,
}

impl<'a> RunDecoder<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            idx: 0,
            rem: 0,
            ones: false,
        }
    }

    fn load(&mut self) -> Result<(), RleError> {
        while self.rem == 0 && self.idx < self.src.len() {
            let (run, n) = unmarshal_var_u64(&self.src[self.idx..])?;
            self.idx += n;
            if run == 0 {
                self.ones = !self.ones;
                continue;
            }
            self.rem = run;
        }
        Ok(())
    }

    fn exhausted(&self) -> bool {
        self.rem == 0 && self.idx >= self.src.len()
    }

    /// Consumes `span` positions from the current run (`span <= self.rem`)
    /// and reloads across the run boundary.
    fn consume(&mut self, span: u64) -> Result<(), RleError> {
        self.rem -= span;
        if self.rem == 0 {
            self.ones = !self.ones;
            self.load()?;
        }
        Ok(())
    }

    /// True if any position at or after the current one is set. Requires a
    /// prior `load`, so the current run (if any) is non-empty.
    fn tail_contains_one(&self) -> Result<bool, RleError> {
        if self.ones && self.rem > 0 {
            return Ok(true);
        }
        let mut idx = self.idx;
        let mut ones = self.ones;
        while idx < self.src.len() {
            let (run, n) = unmarshal_var_u64(&self.src[idx..])?;
            idx += n;
            ones = !ones;
            if ones && run > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl BoolRle {
    /// Wraps raw RLE bytes read from storage. The bytes are validated lazily
    /// by whichever operation walks them.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encodes a tombstone covering rows `[0, count)` — the whole-block
    /// delete sentinel.
    #[must_use]
    pub fn all_ones(count: u64) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self::from_runs(&[0, count])
    }

    /// Encodes `bm` into run lengths.
    ///
    /// Scans bits left to right, flipping polarity at every bit-value
    /// change. All-zero and all-one words are consumed 64 bits at a time.
    /// The final run is emitted only when it is a one-run; trailing zeros
    /// stay implicit, so re-encoding a decoded bitmap is a fixed point.
    #[must_use]
    pub fn encode(bm: &Bitmap) -> Self {
        let bits_len = bm.bits_len();
        if bits_len == 0 {
            return Self::default();
        }

        let mut runs: Vec<u64> = Vec::new();
        let mut zeros_run = true;
        let mut run_len: u64 = 0;

        let flush = |runs: &mut Vec<u64>, run_len: &mut u64, zeros_run: &mut bool| {
            runs.push(*run_len);
            *run_len = 0;
            *zeros_run = !*zeros_run;
        };

        let words = bm.words();
        let full_words = bits_len / 64;
        let tail_bits = bits_len % 64;

        for &word in &words[..full_words] {
            // Whole-word fast paths.
            if zeros_run && word == 0 {
                run_len += 64;
                continue;
            }
            if !zeros_run && word == u64::MAX {
                run_len += 64;
                continue;
            }

            // Drill into the mixed word.
            let mut w = word;
            let mut w_bits = 64usize;
            while w_bits > 0 {
                let step = if zeros_run {
                    w.trailing_zeros() as usize
                } else {
                    (!w).trailing_zeros() as usize
                };
                if step == 0 {
                    flush(&mut runs, &mut run_len, &mut zeros_run);
                    continue;
                }
                let step = step.min(w_bits);
                run_len += step as u64;
                w = if step >= 64 { 0 } else { w >> step };
                w_bits -= step;
            }
        }

        if tail_bits > 0 {
            let mut w = words[full_words] & ((1u64 << tail_bits) - 1);
            let mut w_bits = tail_bits;
            while w_bits > 0 {
                let step = if zeros_run {
                    w.trailing_zeros() as usize
                } else {
                    (!w).trailing_zeros() as usize
                };
                if step == 0 {
                    flush(&mut runs, &mut run_len, &mut zeros_run);
                    continue;
                }
                let step = step.min(w_bits);
                run_len += step as u64;
                w = if step >= 64 { 0 } else { w >> step };
                w_bits -= step;
            }
        }

        if !zeros_run && run_len > 0 {
            runs.push(run_len);
        }
        Self::from_runs(&runs)
    }

    /// Replays the runs into `bm`, setting bits for every one-run. `bm` must
    /// already be sized to the block's row count; it is cleared first. Runs
    /// beyond the bitmap length are ignored.
    ///
    /// # Errors
    ///
    /// [`RleError::Corrupt`] on malformed run-length bytes.
    pub fn decode_into(&self, bm: &mut Bitmap) -> Result<(), RleError> {
        bm.reset_bits();
        self.walk_one_runs(bm.bits_len(), |pos, len| bm.set_bits_range(pos, len))
    }

    /// `bm &= !self`: clears the candidate bits covered by one-runs. This is
    /// how delete tombstones drop rows from a scan.
    pub fn and_not(&self, bm: &mut Bitmap) -> Result<(), RleError> {
        self.walk_one_runs(bm.bits_len(), |pos, len| bm.clear_bits_range(pos, len))
    }

    fn walk_one_runs<F: FnMut(usize, usize)>(
        &self,
        bits_len: usize,
        mut f: F,
    ) -> Result<(), RleError> {
        let src = &self.bytes;
        let mut idx = 0usize;
        let mut pos = 0usize;
        while idx < src.len() && pos < bits_len {
            let (zeros, n) = unmarshal_var_u64(&src[idx..])?;
            idx += n;
            pos = pos.saturating_add(zeros as usize);
            if pos >= bits_len || idx >= src.len() {
                break;
            }
            let (ones, n) = unmarshal_var_u64(&src[idx..])?;
            idx += n;
            if ones > 0 {
                f(pos, ones as usize);
            }
            pos = pos.saturating_add(ones as usize);
        }
        Ok(())
    }

    /// Returns the bit-wise OR of two streams without materializing either
    /// bitmap. An exhausted side continues as implicit zeros while the other
    /// runs on, so operands of different total lengths are fine. Adjacent
    /// output runs of the same bit value are coalesced and the trailing
    /// zero-run is dropped.
    pub fn union(&self, other: &BoolRle) -> Result<BoolRle, RleError> {
        if self.bytes.is_empty() {
            return Ok(other.clone());
        }
        if other.bytes.is_empty() {
            return Ok(self.clone());
        }

        let mut a = RunDecoder::new(&self.bytes);
        let mut b = RunDecoder::new(&other.bytes);
        a.load()?;
        b.load()?;

        let mut runs: Vec<u64> = Vec::new();
        let mut out_ones = false; // output always starts with a zero-run
        let mut cur_len: u64 = 0;

        while !(a.exhausted() && b.exhausted()) {
            let na = if a.exhausted() { u64::MAX } else { a.rem };
            let nb = if b.exhausted() { u64::MAX } else { b.rem };
            let span = na.min(nb);
            let span_ones = (a.rem > 0 && a.ones) || (b.rem > 0 && b.ones);

            if span_ones == out_ones {
                cur_len += span;
            } else {
                runs.push(cur_len);
                out_ones = span_ones;
                cur_len = span;
            }

            if !a.exhausted() {
                a.consume(span)?;
            }
            if !b.exhausted() {
                b.consume(span)?;
            }
        }

        // Trailing zeros are implicit; only flush a final one-run.
        if out_ones && cur_len > 0 {
            runs.push(cur_len);
        }
        Ok(Self::from_runs(&runs))
    }

    /// True iff every position set in `self` is also set in `other`.
    ///
    /// Walks both streams in lock-step and short-circuits to `false` at the
    /// first position with a one in `self` and a zero in `other`. An empty
    /// `self` is vacuously a subset of anything.
    pub fn is_subset_of(&self, other: &BoolRle) -> Result<bool, RleError> {
        if self.bytes.is_empty() {
            return Ok(true);
        }
        if other.bytes.is_empty() {
            return Ok(!self.contains_one()?);
        }

        let mut a = RunDecoder::new(&self.bytes);
        let mut b = RunDecoder::new(&other.bytes);
        loop {
            a.load()?;
            b.load()?;

            if a.exhausted() {
                // Every one-bit of `self` has been matched.
                return Ok(true);
            }
            if b.exhausted() {
                // The rest of `other` is zeros, so `self` must carry no
                // further one-bits, current run included.
                return Ok(!a.tail_contains_one()?);
            }

            let span = a.rem.min(b.rem);
            if a.ones && !b.ones {
                return Ok(false);
            }
            a.consume(span)?;
            b.consume(span)?;
        }
    }

    /// Total number of one-bits in the stream.
    pub fn count_ones(&self) -> Result<u64, RleError> {
        let mut idx = 0usize;
        let mut ones = false;
        let mut total: u64 = 0;
        while idx < self.bytes.len() {
            let (run, n) = unmarshal_var_u64(&self.bytes[idx..])?;
            idx += n;
            if ones {
                total += run;
            }
            ones = !ones;
        }
        Ok(total)
    }

    /// True if the stream has any one-bit. O(#runs) with early exit.
    pub fn contains_one(&self) -> Result<bool, RleError> {
        let mut idx = 0usize;
        let mut ones = false;
        while idx < self.bytes.len() {
            let (run, n) = unmarshal_var_u64(&self.bytes[idx..])?;
            idx += n;
            if ones && run > 0 {
                return Ok(true);
            }
            ones = !ones;
        }
        Ok(false)
    }

    /// True if every row of `[0, total_rows)` is marked, i.e. the stream
    /// starts with a zero-length zero-run followed by a one-run covering the
    /// whole block.
    pub fn is_ones(&self, total_rows: u64) -> Result<bool, RleError> {
        if total_rows == 0 {
            return Ok(true);
        }
        if self.bytes.is_empty() {
            return Ok(false);
        }
        let (zeros, n) = unmarshal_var_u64(&self.bytes)?;
        if zeros != 0 || n >= self.bytes.len() {
            return Ok(false);
        }
        let (ones, _) = unmarshal_var_u64(&self.bytes[n..])?;
        Ok(ones >= total_rows)
    }

    /// Calls `f(idx)` in ascending order for every unset bit, including the
    /// implicit trailing zeros up to `total_rows`. Compaction uses this to
    /// enumerate the rows that survive a delete marker.
    pub fn for_each_zero_bit<F: FnMut(usize)>(
        &self,
        total_rows: usize,
        mut f: F,
    ) -> Result<(), RleError> {
        let src = &self.bytes;
        let mut idx = 0usize;
        let mut pos = 0usize;

        while pos < total_rows && idx < src.len() {
            let (zeros, n) = unmarshal_var_u64(&src[idx..])?;
            idx += n;
            let stop = pos.saturating_add(zeros as usize).min(total_rows);
            while pos < stop {
                f(pos);
                pos += 1;
            }
            if pos >= total_rows || idx >= src.len() {
                break;
            }
            let (ones, n) = unmarshal_var_u64(&src[idx..])?;
            idx += n;
            pos = pos.saturating_add(ones as usize);
        }

        while pos < total_rows {
            f(pos);
            pos += 1;
        }
        Ok(())
    }

    /// Decoded run lengths, mainly for assertions and debug output.
    pub fn runs(&self) -> Result<Vec<u64>, RleError> {
        let mut runs = Vec::new();
        let mut idx = 0usize;
        while idx < self.bytes.len() {
            let (run, n) = unmarshal_var_u64(&self.bytes[idx..])?;
            idx += n;
            runs.push(run);
        }
        Ok(runs)
    }

    fn from_runs(runs: &[u64]) -> Self {
        let mut bytes = Vec::with_capacity(runs.len() * 2);
        for &run in runs {
            marshal_var_u64(&mut bytes, run);
        }
        Self { bytes }
    }
}
