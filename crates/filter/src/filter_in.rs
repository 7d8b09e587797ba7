use std::collections::HashSet;
use std::sync::OnceLock;

use bitmap::Bitmap;
use block::{
    encode_float64, encode_ipv4, encode_timestamp, encode_uint16, encode_uint32, encode_uint64,
    encode_uint8, try_parse_float64, try_parse_ipv4, try_parse_timestamp_iso8601,
    try_parse_uint64, Block, BlockColumn, ValueType,
};
use bloom::{tokenize_value, BloomFilter};

use crate::Filter;

/// Past this many candidate values, tokenizing them for bloom probing
/// costs more than it saves.
const MAX_TOKEN_SETS_TO_INIT: usize = 1000;

/// A single candidate value with more tokens than this disables bloom
/// probing for the whole filter.
const MAX_TOKENS_PER_VALUE: usize = 1000;

/// Value-set membership: matches rows where `field_name` equals any of the
/// candidate values.
///
/// Candidate values are strings; on first contact with a typed column they
/// are parsed into that column's canonical encoding and kept in a lookup
/// set, so each row check is a byte-array set probe. A candidate that does
/// not parse as the column's type simply cannot match any row there.
///
/// Bloom pruning runs on the raw candidate text before any row scan, so a
/// non-canonical spelling such as `"012"` is normally pruned even though
/// it encodes to the same bytes as `"12"`. Rows are only guaranteed to
/// match candidates spelled the way they were ingested.
///
/// Matching a missing column follows const-column semantics: a column that
/// was never ingested reads as `""` on every row, so a candidate set
/// containing the empty string matches all rows of such a block.
pub struct FilterIn {
    field_name: String,
    values: Vec<String>,

    string_set: OnceLock<HashSet<String>>,
    uint8_set: OnceLock<HashSet<[u8; 1]>>,
    uint16_set: OnceLock<HashSet<[u8; 2]>>,
    uint32_set: OnceLock<HashSet<[u8; 4]>>,
    uint64_set: OnceLock<HashSet<[u8; 8]>>,
    float64_set: OnceLock<HashSet<[u8; 8]>>,
    ipv4_set: OnceLock<HashSet<[u8; 4]>>,
    timestamp_set: OnceLock<HashSet<[u8; 8]>>,

    // None means too many candidates (or tokens) to probe blooms with.
    token_sets: OnceLock<Option<Vec<Vec<String>>>>,
}

impl FilterIn {
    pub fn new(field_name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field_name: field_name.into(),
            values,
            string_set: OnceLock::new(),
            uint8_set: OnceLock::new(),
            uint16_set: OnceLock::new(),
            uint32_set: OnceLock::new(),
            uint64_set: OnceLock::new(),
            float64_set: OnceLock::new(),
            ipv4_set: OnceLock::new(),
            timestamp_set: OnceLock::new(),
            token_sets: OnceLock::new(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    fn string_set(&self) -> &HashSet<String> {
        self.string_set
            .get_or_init(|| self.values.iter().cloned().collect())
    }

    fn uint8_set(&self) -> &HashSet<[u8; 1]> {
        self.uint8_set.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|v| {
                    let n = try_parse_uint64(v)?;
                    u8::try_from(n).ok().map(encode_uint8)
                })
                .collect()
        })
    }

    fn uint16_set(&self) -> &HashSet<[u8; 2]> {
        self.uint16_set.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|v| {
                    let n = try_parse_uint64(v)?;
                    u16::try_from(n).ok().map(encode_uint16)
                })
                .collect()
        })
    }

    fn uint32_set(&self) -> &HashSet<[u8; 4]> {
        self.uint32_set.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|v| {
                    let n = try_parse_uint64(v)?;
                    u32::try_from(n).ok().map(encode_uint32)
                })
                .collect()
        })
    }

    fn uint64_set(&self) -> &HashSet<[u8; 8]> {
        self.uint64_set.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|v| try_parse_uint64(v).map(encode_uint64))
                .collect()
        })
    }

    fn float64_set(&self) -> &HashSet<[u8; 8]> {
        self.float64_set.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|v| try_parse_float64(v).map(encode_float64))
                .collect()
        })
    }

    fn ipv4_set(&self) -> &HashSet<[u8; 4]> {
        self.ipv4_set.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|v| try_parse_ipv4(v).map(encode_ipv4))
                .collect()
        })
    }

    fn timestamp_set(&self) -> &HashSet<[u8; 8]> {
        self.timestamp_set.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|v| try_parse_timestamp_iso8601(v).map(encode_timestamp))
                .collect()
        })
    }

    fn token_sets(&self) -> Option<&Vec<Vec<String>>> {
        self.token_sets
            .get_or_init(|| {
                if self.values.len() > MAX_TOKEN_SETS_TO_INIT {
                    return None;
                }
                let mut sets = Vec::with_capacity(self.values.len());
                for v in &self.values {
                    let tokens = tokenize_value(v);
                    if tokens.len() > MAX_TOKENS_PER_VALUE {
                        return None;
                    }
                    sets.push(tokens);
                }
                Some(sets)
            })
            .as_ref()
    }

    /// Decides from the column bloom filter whether any candidate can be
    /// present at all. `true` means "maybe, do the row scan".
    fn match_bloom(&self, bloom: Option<&BloomFilter>, rows_count: usize) -> bool {
        let Some(token_sets) = self.token_sets() else {
            return true;
        };
        if token_sets.is_empty() {
            return true;
        }
        if token_sets.len() > 10 * rows_count {
            // scanning the rows directly is cheaper than this many probes
            return true;
        }
        let Some(bf) = bloom else {
            return true;
        };
        token_sets.iter().any(|tokens| bf.contains_all(tokens))
    }

    fn match_string_column(&self, block: &Block, col: &BlockColumn, bm: &mut Bitmap) {
        if !self.match_bloom(col.bloom(), block.rows_count()) {
            bm.reset_bits();
            return;
        }
        let set = self.string_set();
        bm.for_each_set_bit(|row| set.contains(col.value(row)));
    }

    fn match_dict_column(&self, col: &BlockColumn, bm: &mut Bitmap) {
        let set = self.string_set();
        let hits: Vec<bool> = col.dict_values().iter().map(|v| set.contains(v)).collect();
        if !hits.iter().any(|&h| h) {
            bm.reset_bits();
            return;
        }
        let encoded = col.encoded_values();
        bm.for_each_set_bit(|row| match encoded[row].first() {
            Some(&idx) => hits.get(idx as usize).copied().unwrap_or(false),
            None => false,
        });
    }

    fn match_binary_column<const N: usize>(
        &self,
        block: &Block,
        col: &BlockColumn,
        bm: &mut Bitmap,
        set: &HashSet<[u8; N]>,
    ) {
        if set.is_empty() {
            bm.reset_bits();
            return;
        }
        if !self.match_bloom(col.bloom(), block.rows_count()) {
            bm.reset_bits();
            return;
        }
        let encoded = col.encoded_values();
        bm.for_each_set_bit(|row| match <[u8; N]>::try_from(encoded[row].as_slice()) {
            Ok(arr) => set.contains(&arr),
            Err(_) => false,
        });
    }
}

impl Filter for FilterIn {
    fn apply(&self, block: &Block, bm: &mut Bitmap) -> anyhow::Result<()> {
        if self.values.is_empty() {
            bm.reset_bits();
            return Ok(());
        }

        if let Some(v) = block.const_value(&self.field_name) {
            if !self.string_set().contains(v) {
                bm.reset_bits();
            }
            return Ok(());
        }

        let col = match block.column(&self.field_name) {
            Some(col) => col,
            None => {
                // a missing column reads as "" on every row
                if !self.string_set().contains("") {
                    bm.reset_bits();
                }
                return Ok(());
            }
        };

        match col.value_type() {
            ValueType::String => self.match_string_column(block, col, bm),
            ValueType::Dict => self.match_dict_column(col, bm),
            ValueType::Uint8 => self.match_binary_column(block, col, bm, self.uint8_set()),
            ValueType::Uint16 => self.match_binary_column(block, col, bm, self.uint16_set()),
            ValueType::Uint32 => self.match_binary_column(block, col, bm, self.uint32_set()),
            ValueType::Uint64 => self.match_binary_column(block, col, bm, self.uint64_set()),
            ValueType::Float64 => self.match_binary_column(block, col, bm, self.float64_set()),
            ValueType::Ipv4 => self.match_binary_column(block, col, bm, self.ipv4_set()),
            ValueType::TimestampIso8601 => {
                self.match_binary_column(block, col, bm, self.timestamp_set())
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for FilterIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterIn")
            .field("field_name", &self.field_name)
            .field("values", &self.values)
            .finish()
    }
}
