use crate::BlockError;

/// Column encoding selected for a block column.
///
/// The discriminants are wire tags; they are persisted in column headers
/// and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueType {
    /// Raw string bytes, the fallback when nothing cheaper applies.
    String = 1,
    /// One byte per row indexing into a small per-column dictionary.
    Dict = 2,
    Uint8 = 3,
    Uint16 = 4,
    Uint32 = 5,
    Uint64 = 6,
    Float64 = 7,
    Ipv4 = 8,
    /// Millisecond-precision ISO 8601 timestamps stored as epoch nanos.
    TimestampIso8601 = 9,
}

impl ValueType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self, BlockError> {
        Ok(match tag {
            1 => ValueType::String,
            2 => ValueType::Dict,
            3 => ValueType::Uint8,
            4 => ValueType::Uint16,
            5 => ValueType::Uint32,
            6 => ValueType::Uint64,
            7 => ValueType::Float64,
            8 => ValueType::Ipv4,
            9 => ValueType::TimestampIso8601,
            other => return Err(BlockError::UnknownValueType(other)),
        })
    }
}
