use bloom::{tokenize_values, BloomFilter};

use crate::encoder::encode_values;
use crate::header::ColumnHeader;
use crate::value_type::ValueType;
use crate::BlockError;

/// One named column of raw string values, the input to [`Block::build`].
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An encoded column inside a built block.
pub struct BlockColumn {
    header: ColumnHeader,
    raw: Vec<String>,
    encoded: Vec<Vec<u8>>,
}

impl BlockColumn {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn value_type(&self) -> ValueType {
        self.header.value_type
    }

    pub fn header(&self) -> &ColumnHeader {
        &self.header
    }

    /// The original string values, one per row.
    pub fn raw_values(&self) -> &[String] {
        &self.raw
    }

    /// The canonical encoded values, one per row.
    pub fn encoded_values(&self) -> &[Vec<u8>] {
        &self.encoded
    }

    pub fn value(&self, row: usize) -> &str {
        &self.raw[row]
    }

    /// Dictionary entries for a [`ValueType::Dict`] column, empty otherwise.
    pub fn dict_values(&self) -> &[String] {
        self.header.dict.values()
    }

    pub fn bloom(&self) -> Option<&BloomFilter> {
        self.header.bloom.as_ref()
    }
}

/// An immutable columnar chunk of log rows.
///
/// Columns where every value is identical are stored once as const
/// columns; all-empty columns are dropped entirely, so a column holding
/// only `""` is indistinguishable from a column that was never ingested.
pub struct Block {
    rows_count: usize,
    const_columns: Vec<(String, String)>,
    columns: Vec<BlockColumn>,
}

impl Block {
    /// Builds a block from raw columns. Every column must have exactly
    /// `rows_count` values.
    pub fn build(rows_count: usize, columns: Vec<Column>) -> Result<Self, BlockError> {
        if rows_count == 0 {
            return Err(BlockError::EmptyBlock);
        }
        let mut const_columns = Vec::new();
        let mut block_columns = Vec::new();

        for col in columns {
            if col.values.len() != rows_count {
                return Err(BlockError::RowCountMismatch {
                    name: col.name,
                    got: col.values.len(),
                    want: rows_count,
                });
            }
            if col.values.iter().all(|v| v.is_empty()) {
                continue;
            }
            let first = &col.values[0];
            if col.values.iter().all(|v| v == first) {
                const_columns.push((col.name, first.clone()));
                continue;
            }

            let ec = encode_values(&col.values);
            let bloom = match ec.value_type {
                // dict columns are matched against the dictionary directly
                ValueType::Dict => None,
                _ => Some(BloomFilter::from_tokens(&tokenize_values(&col.values))),
            };
            block_columns.push(BlockColumn {
                header: ColumnHeader {
                    name: col.name,
                    value_type: ec.value_type,
                    dict: ec.dict,
                    bloom,
                },
                raw: col.values,
                encoded: ec.values,
            });
        }

        Ok(Self {
            rows_count,
            const_columns,
            columns: block_columns,
        })
    }

    pub fn rows_count(&self) -> usize {
        self.rows_count
    }

    /// The shared value of a const column, if `name` is one.
    pub fn const_value(&self, name: &str) -> Option<&str> {
        self.const_columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&BlockColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[BlockColumn] {
        &self.columns
    }

    pub fn const_columns(&self) -> &[(String, String)] {
        &self.const_columns
    }
}
