//! # Deletion markers
//!
//! Storage parts are immutable, so deleting rows cannot rewrite a block.
//! Instead a part carries a [`Marker`] file recording which rows are
//! logically gone; readers subtract the marked rows from their results.
//!
//! A [`DeleteMarker`] maps block ids to run-length-encoded row sets (see
//! the `bitmap` crate). Markers accumulate: marking more rows merges into
//! the existing marker, and merging two parts merges their markers.
//! Published markers are shared behind `Arc` snapshots; an update builds a
//! new merged marker and swaps the pointer, so in-flight readers keep a
//! consistent view without locking.
//!
//! On disk a marker file is a single CRC32-framed record:
//! ```text
//! [payload_len u32 LE][crc32 u32 LE][payload]
//! ```
//! with the payload holding type-tagged marker sections. A CRC mismatch or
//! any malformed payload is unrecoverable corruption and surfaces as
//! [`MarkerError::Corrupt`].

mod delete_marker;
mod marker;

pub use delete_marker::DeleteMarker;
pub use marker::{Marker, MARKER_TYPE_DELETE};

use bitmap::RleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupted marker data: {0}")]
    Corrupt(String),
    #[error("corrupted row marker: {0}")]
    Rle(#[from] RleError),
    #[error("blocks count must be set before unmarshaling a marker")]
    BlocksCountNotSet,
    #[error("duplicate delete marker section")]
    DuplicateDeleteMarker,
    #[error("unknown marker type {0}")]
    UnknownMarkerType(u8),
    #[error("marker references block {block_id}, but the part has {blocks_count} blocks")]
    BlockIdOutOfRange { block_id: u32, blocks_count: u64 },
}

impl From<encoding::EncodingError> for MarkerError {
    fn from(e: encoding::EncodingError) -> Self {
        MarkerError::Corrupt(e.to_string())
    }
}
