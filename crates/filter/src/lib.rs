//! # Query-time block filters
//!
//! A [`Filter`] narrows a candidate bitmap of rows against one immutable
//! block. Filters only ever clear bits; a row that enters `apply` as zero
//! can never come back.
//!
//! The workhorse is [`FilterIn`], the value-set membership predicate
//! (`field in ("a", "b", ...)`). It pre-parses its candidate values into
//! per-encoding lookup sets on first use, so matching a uint8 column is a
//! one-byte set probe per row instead of a string comparison, and uses the
//! column bloom filters to reject whole blocks without row scans.
//!
//! [`AndFilter`], [`OrFilter`] and [`NotFilter`] compose filters with the
//! usual boolean semantics; [`NoopFilter`] matches everything.

mod filter_in;

pub use filter_in::FilterIn;

use bitmap::{Bitmap, BitmapPool};
use block::Block;

/// A predicate over the rows of one block.
pub trait Filter: Send + Sync {
    /// Clears the bits of rows that do not match. Bits already zero stay
    /// zero. `bm.bits_len()` always equals `block.rows_count()`.
    fn apply(&self, block: &Block, bm: &mut Bitmap) -> anyhow::Result<()>;
}

/// Matches every row.
pub struct NoopFilter;

impl Filter for NoopFilter {
    fn apply(&self, _block: &Block, _bm: &mut Bitmap) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Matches rows that satisfy every child filter.
pub struct AndFilter {
    pub filters: Vec<Box<dyn Filter>>,
}

impl Filter for AndFilter {
    fn apply(&self, block: &Block, bm: &mut Bitmap) -> anyhow::Result<()> {
        for f in &self.filters {
            f.apply(block, bm)?;
            if bm.is_zero() {
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Matches rows that satisfy at least one child filter.
pub struct OrFilter {
    pub filters: Vec<Box<dyn Filter>>,
}

impl Filter for OrFilter {
    fn apply(&self, block: &Block, bm: &mut Bitmap) -> anyhow::Result<()> {
        let pool = BitmapPool::global();
        let mut result = pool.acquire(bm.bits_len());
        for f in &self.filters {
            let mut tmp = pool.acquire(bm.bits_len());
            tmp.or(bm);
            f.apply(block, &mut tmp)?;
            result.or(&tmp);
        }
        bm.reset_bits();
        bm.or(&result);
        Ok(())
    }
}

/// Matches rows the inner filter does not match.
pub struct NotFilter {
    pub filter: Box<dyn Filter>,
}

impl Filter for NotFilter {
    fn apply(&self, block: &Block, bm: &mut Bitmap) -> anyhow::Result<()> {
        let mut matched = BitmapPool::global().acquire(bm.bits_len());
        matched.or(bm);
        self.filter.apply(block, &mut matched)?;
        bm.and_not(&matched);
        Ok(())
    }
}

/// Runs `f` over all rows of `block` and returns the matching row indexes
/// in ascending order.
pub fn filter_rows(f: &dyn Filter, block: &Block) -> anyhow::Result<Vec<usize>> {
    let mut bm = BitmapPool::global().acquire(block.rows_count());
    bm.set_bits();
    f.apply(block, &mut bm)?;
    let mut rows = Vec::with_capacity(bm.count_ones());
    bm.for_each_set_bit(|idx| {
        rows.push(idx);
        true
    });
    Ok(rows)
}

#[cfg(test)]
mod tests;
