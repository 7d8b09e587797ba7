//! # Bitmap — row-candidacy bit vectors and the boolean RLE codec
//!
//! A [`Bitmap`] tracks which rows of one immutable block are still query
//! candidates: bit `i` set means "row `i` may match". Predicate evaluation
//! starts from an all-ones bitmap and only ever clears bits.
//!
//! [`BoolRle`] is the compact on-disk form of a bitmap, used for row-delete
//! tombstones. The stream is a sequence of `VarUint64` run lengths,
//! alternating zero-runs and one-runs, always starting with a zero-run
//! (length 0 allowed):
//!
//! ```text
//! 000111 -> [3, 3]
//! 1100   -> [0, 2]       (trailing zero-run is implicit, never written)
//! 0000   -> []           (an empty stream is an all-zero bitmap)
//! ```
//!
//! Streams of different total lengths combine freely: the shorter operand is
//! treated as continuing with zeros. [`BoolRle::union`] and
//! [`BoolRle::is_subset_of`] walk two streams in lock-step without
//! materializing either bitmap, which is what makes merging tombstones from
//! concurrent delete requests cheap during compaction.
//!
//! Since scanning is a parallel workload, [`BitmapPool`] hands out reusable
//! scratch bitmaps through a guard that returns the buffer to the free-list
//! on every exit path, including early aborts.

mod bitmap;
mod pool;
mod rle;

pub use bitmap::Bitmap;
pub use pool::{BitmapPool, PooledBitmap};
pub use rle::{BoolRle, RleError};

#[cfg(test)]
mod tests;
