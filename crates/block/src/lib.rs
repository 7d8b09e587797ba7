//! # Block — immutable columnar log storage units
//!
//! A [`Block`] is a fixed row-count chunk of ingested log records. It is
//! created once, at ingestion or merge time, and never mutated; query-time
//! readers only ever narrow a candidate bitmap against it.
//!
//! ## Column encodings
//!
//! Each column picks the cheapest encoding its values admit, tried in this
//! order:
//!
//! | Encoding           | Condition                                   | Bytes/row |
//! |--------------------|---------------------------------------------|-----------|
//! | const              | one distinct value in the whole block       | 0         |
//! | dict               | at most 8 distinct values, 256 bytes total  | 1         |
//! | uint8/16/32/64     | every value parses as an unsigned integer   | 1/2/4/8   |
//! | float64            | every value parses as a plain decimal       | 8         |
//! | ipv4               | every value is a dotted-quad address        | 4         |
//! | timestamp_iso8601  | every value is `YYYY-MM-DDThh:mm:ss.mmmZ`   | 8         |
//! | string             | fallback, raw bytes                          | var       |
//!
//! Numeric encodings are canonical big-endian, so `"012"` and `"12"` encode
//! to identical bytes and byte equality equals value equality. That property
//! is what lets a value-set predicate match rows by comparing encoded bytes
//! against a pre-encoded candidate set. Note that the bloom filters below
//! index the *raw* value text, so predicate stages that consult them see
//! the original spelling, not the canonical bytes.
//!
//! Every non-dict column also carries a bloom filter over its tokenized
//! text (see the `bloom` crate) so predicates can reject whole blocks
//! without touching row data.
//!
//! ## Corruption
//!
//! A [`ColumnHeader`] round-trips through a small wire format. An unknown
//! value-type tag there means the on-disk data is corrupted; it surfaces as
//! [`BlockError::UnknownValueType`] rather than a recoverable condition.

mod block;
mod codec;
mod dict;
mod encoder;
mod header;
mod parse;
mod value_type;

pub use block::{Block, BlockColumn, Column};
pub use codec::{
    encode_float64, encode_ipv4, encode_timestamp, encode_uint16, encode_uint32, encode_uint64,
    encode_uint8,
};
pub use dict::ValuesDict;
pub use encoder::{encode_values, EncodedColumn};
pub use header::ColumnHeader;
pub use parse::{
    try_parse_float64, try_parse_ipv4, try_parse_timestamp_iso8601, try_parse_uint64,
};
pub use value_type::ValueType;

use thiserror::Error;

/// Errors raised while building a block or decoding column metadata.
#[derive(Debug, Error)]
pub enum BlockError {
    /// A value-type tag outside the known range: on-disk corruption.
    #[error("unknown value type tag {0}; the block data is corrupted")]
    UnknownValueType(u8),
    /// Malformed column-header bytes.
    #[error("corrupted column header: {0}")]
    Corrupt(String),
    #[error("column {name:?} has {got} rows; the block has {want}")]
    RowCountMismatch {
        name: String,
        got: usize,
        want: usize,
    },
    #[error("a block must contain at least one row")]
    EmptyBlock,
}

impl From<encoding::EncodingError> for BlockError {
    fn from(e: encoding::EncodingError) -> Self {
        BlockError::Corrupt(e.to_string())
    }
}
