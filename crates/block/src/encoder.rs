//! Column encoding selection.
//!
//! [`encode_values`] tries each typed encoding in order of decreasing
//! savings and falls back to raw strings when none applies. The caller is
//! expected to have peeled off const columns already; a single-valued
//! column passed here would simply dict-encode.

use crate::codec::{
    encode_float64, encode_ipv4, encode_timestamp, encode_uint16, encode_uint32, encode_uint64,
    encode_uint8,
};
use crate::dict::ValuesDict;
use crate::parse::{
    try_parse_float64, try_parse_ipv4, try_parse_timestamp_iso8601, try_parse_uint64,
};
use crate::value_type::ValueType;

/// The outcome of encoding one column: the chosen type, the dictionary
/// (empty unless [`ValueType::Dict`]) and the per-row encoded values.
pub struct EncodedColumn {
    pub value_type: ValueType,
    pub dict: ValuesDict,
    pub values: Vec<Vec<u8>>,
}

/// Picks the cheapest encoding the given values admit and encodes them.
pub fn encode_values(values: &[String]) -> EncodedColumn {
    if let Some(ec) = try_dict_encoding(values) {
        return ec;
    }
    if let Some(ec) = try_uint_encoding(values) {
        return ec;
    }
    if let Some(ec) = try_float64_encoding(values) {
        return ec;
    }
    if let Some(ec) = try_ipv4_encoding(values) {
        return ec;
    }
    if let Some(ec) = try_timestamp_encoding(values) {
        return ec;
    }
    EncodedColumn {
        value_type: ValueType::String,
        dict: ValuesDict::new(),
        values: values.iter().map(|v| v.as_bytes().to_vec()).collect(),
    }
}

fn try_dict_encoding(values: &[String]) -> Option<EncodedColumn> {
    let mut dict = ValuesDict::new();
    let mut encoded = Vec::with_capacity(values.len());
    for v in values {
        let idx = dict.get_or_insert(v)?;
        encoded.push(vec![idx]);
    }
    Some(EncodedColumn {
        value_type: ValueType::Dict,
        dict,
        values: encoded,
    })
}

fn try_uint_encoding(values: &[String]) -> Option<EncodedColumn> {
    let mut parsed = Vec::with_capacity(values.len());
    let mut max: u64 = 0;
    for v in values {
        let n = try_parse_uint64(v)?;
        max = max.max(n);
        parsed.push(n);
    }
    let (value_type, encode): (ValueType, fn(u64) -> Vec<u8>) = if max <= u8::MAX as u64 {
        (ValueType::Uint8, |n| encode_uint8(n as u8).to_vec())
    } else if max <= u16::MAX as u64 {
        (ValueType::Uint16, |n| encode_uint16(n as u16).to_vec())
    } else if max <= u32::MAX as u64 {
        (ValueType::Uint32, |n| encode_uint32(n as u32).to_vec())
    } else {
        (ValueType::Uint64, |n| encode_uint64(n).to_vec())
    };
    Some(EncodedColumn {
        value_type,
        dict: ValuesDict::new(),
        values: parsed.into_iter().map(encode).collect(),
    })
}

fn try_float64_encoding(values: &[String]) -> Option<EncodedColumn> {
    let encoded = values
        .iter()
        .map(|v| try_parse_float64(v).map(|f| encode_float64(f).to_vec()))
        .collect::<Option<Vec<_>>>()?;
    Some(EncodedColumn {
        value_type: ValueType::Float64,
        dict: ValuesDict::new(),
        values: encoded,
    })
}

fn try_ipv4_encoding(values: &[String]) -> Option<EncodedColumn> {
    let encoded = values
        .iter()
        .map(|v| try_parse_ipv4(v).map(|a| encode_ipv4(a).to_vec()))
        .collect::<Option<Vec<_>>>()?;
    Some(EncodedColumn {
        value_type: ValueType::Ipv4,
        dict: ValuesDict::new(),
        values: encoded,
    })
}

fn try_timestamp_encoding(values: &[String]) -> Option<EncodedColumn> {
    let encoded = values
        .iter()
        .map(|v| try_parse_timestamp_iso8601(v).map(|n| encode_timestamp(n).to_vec()))
        .collect::<Option<Vec<_>>>()?;
    Some(EncodedColumn {
        value_type: ValueType::TimestampIso8601,
        dict: ValuesDict::new(),
        values: encoded,
    })
}
