use byteorder::{BigEndian, ByteOrder};

use bitmap::BoolRle;
use encoding::{marshal_var_u64, unmarshal_var_u64};

use crate::MarkerError;

/// Logically deleted rows of one part, keyed by block id.
///
/// Block ids are kept sorted, so lookups are binary searches and merging
/// two markers is a linear walk. The per-block row sets are [`BoolRle`]
/// streams; marking the same block twice unions the streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteMarker {
    block_ids: Vec<u32>,
    rows: Vec<BoolRle>,
}

impl DeleteMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks with deleted rows.
    pub fn len(&self) -> usize {
        self.block_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block_ids.is_empty()
    }

    /// Records deleted rows for `block_id`, unioning with any rows already
    /// marked there.
    pub fn add_block(&mut self, block_id: u32, rows: BoolRle) -> Result<(), MarkerError> {
        match self.block_ids.binary_search(&block_id) {
            Ok(i) => {
                self.rows[i] = self.rows[i].union(&rows)?;
            }
            Err(i) => {
                self.block_ids.insert(i, block_id);
                self.rows.insert(i, rows);
            }
        }
        Ok(())
    }

    /// Deleted rows of `block_id`, or `None` if nothing is marked there.
    pub fn marked_rows(&self, block_id: u32) -> Option<&BoolRle> {
        self.block_ids
            .binary_search(&block_id)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &BoolRle)> {
        self.block_ids.iter().copied().zip(self.rows.iter())
    }

    pub fn max_block_id(&self) -> Option<u32> {
        self.block_ids.last().copied()
    }

    /// Merges two markers into one: the union of their block sets, with
    /// row sets unioned where both mark the same block.
    pub fn merge(&self, other: &DeleteMarker) -> Result<DeleteMarker, MarkerError> {
        let mut merged = DeleteMarker {
            block_ids: Vec::with_capacity(self.len() + other.len()),
            rows: Vec::with_capacity(self.len() + other.len()),
        };
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            let (a, b) = (self.block_ids[i], other.block_ids[j]);
            if a < b {
                merged.block_ids.push(a);
                merged.rows.push(self.rows[i].clone());
                i += 1;
            } else if b < a {
                merged.block_ids.push(b);
                merged.rows.push(other.rows[j].clone());
                j += 1;
            } else {
                merged.block_ids.push(a);
                merged.rows.push(self.rows[i].union(&other.rows[j])?);
                i += 1;
                j += 1;
            }
        }
        merged.block_ids.extend_from_slice(&self.block_ids[i..]);
        merged.rows.extend_from_slice(&self.rows[i..]);
        merged.block_ids.extend_from_slice(&other.block_ids[j..]);
        merged.rows.extend_from_slice(&other.rows[j..]);
        Ok(merged)
    }

    /// Appends the wire form:
    /// ```text
    /// [num_blocks varint] { [block_id u32 BE][rle_len varint][rle bytes] } *
    /// ```
    pub fn marshal(&self, dst: &mut Vec<u8>) {
        marshal_var_u64(dst, self.block_ids.len() as u64);
        for (block_id, rows) in self.iter() {
            let mut id = [0u8; 4];
            BigEndian::write_u32(&mut id, block_id);
            dst.extend_from_slice(&id);
            marshal_var_u64(dst, rows.as_bytes().len() as u64);
            dst.extend_from_slice(rows.as_bytes());
        }
    }

    /// Decodes one marker from the front of `src`, returning it with the
    /// number of bytes consumed. Block ids must be strictly increasing.
    pub fn unmarshal(src: &[u8]) -> Result<(DeleteMarker, usize), MarkerError> {
        let mut pos = 0;
        let (num_blocks, n) = unmarshal_var_u64(src)?;
        pos += n;

        let mut dm = DeleteMarker::new();
        let mut prev_id: Option<u32> = None;
        for _ in 0..num_blocks {
            if src.len() - pos < 4 {
                return Err(MarkerError::Corrupt("truncated block id".to_string()));
            }
            let block_id = BigEndian::read_u32(&src[pos..pos + 4]);
            pos += 4;
            if let Some(prev) = prev_id {
                if block_id <= prev {
                    return Err(MarkerError::Corrupt(format!(
                        "block ids out of order: {block_id} after {prev}"
                    )));
                }
            }
            prev_id = Some(block_id);

            let (rle_len, n) = unmarshal_var_u64(&src[pos..])?;
            pos += n;
            let rle_len = rle_len as usize;
            if src.len() - pos < rle_len {
                return Err(MarkerError::Corrupt("truncated row marker".to_string()));
            }
            let rows = BoolRle::from_bytes(src[pos..pos + rle_len].to_vec());
            pos += rle_len;
            // surface malformed run data now rather than at first use
            rows.count_ones()?;

            dm.block_ids.push(block_id);
            dm.rows.push(rows);
        }
        Ok((dm, pos))
    }
}
