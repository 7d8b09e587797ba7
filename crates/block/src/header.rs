use bloom::BloomFilter;
use encoding::{marshal_var_u64, unmarshal_var_u64};

use crate::dict::ValuesDict;
use crate::value_type::ValueType;
use crate::BlockError;

/// Persisted per-column metadata.
///
/// Wire format:
/// ```text
/// [name_len varint][name bytes]
/// [value_type u8]
/// [dict_len varint] { [value_len varint][value bytes] } *
/// [bloom_len varint][bloom bytes]
/// ```
/// `bloom_len` of zero means the column carries no bloom filter, as is the
/// case for dict-encoded columns.
#[derive(Debug)]
pub struct ColumnHeader {
    pub name: String,
    pub value_type: ValueType,
    pub dict: ValuesDict,
    pub bloom: Option<BloomFilter>,
}

impl ColumnHeader {
    pub fn marshal(&self, dst: &mut Vec<u8>) -> Result<(), BlockError> {
        marshal_var_u64(dst, self.name.len() as u64);
        dst.extend_from_slice(self.name.as_bytes());
        dst.push(self.value_type.tag());

        marshal_var_u64(dst, self.dict.len() as u64);
        for v in self.dict.values() {
            marshal_var_u64(dst, v.len() as u64);
            dst.extend_from_slice(v.as_bytes());
        }

        match &self.bloom {
            Some(bf) => {
                marshal_var_u64(dst, bf.serialized_size() as u64);
                bf.write_to(dst)
                    .map_err(|e| BlockError::Corrupt(e.to_string()))?;
            }
            None => marshal_var_u64(dst, 0),
        }
        Ok(())
    }

    /// Decodes one header from the front of `src`, returning it with the
    /// number of bytes consumed.
    pub fn unmarshal(src: &[u8]) -> Result<(Self, usize), BlockError> {
        let mut pos = 0;

        let (name, n) = read_bytes(&src[pos..], "column name")?;
        pos += n;
        let name = String::from_utf8(name.to_vec())
            .map_err(|_| BlockError::Corrupt("column name is not valid utf-8".to_string()))?;

        let tag = *src
            .get(pos)
            .ok_or_else(|| BlockError::Corrupt("missing value type tag".to_string()))?;
        let value_type = ValueType::from_tag(tag)?;
        pos += 1;

        let (dict_len, n) = unmarshal_var_u64(&src[pos..])?;
        pos += n;
        let mut dict_values = Vec::with_capacity(dict_len as usize);
        for _ in 0..dict_len {
            let (v, n) = read_bytes(&src[pos..], "dict value")?;
            pos += n;
            let v = String::from_utf8(v.to_vec())
                .map_err(|_| BlockError::Corrupt("dict value is not valid utf-8".to_string()))?;
            dict_values.push(v);
        }
        let dict = ValuesDict::from_values(dict_values);

        let (bloom_bytes, n) = read_bytes(&src[pos..], "bloom filter")?;
        pos += n;
        let bloom = if bloom_bytes.is_empty() {
            None
        } else {
            let mut r = bloom_bytes;
            Some(
                BloomFilter::read_from(&mut r)
                    .map_err(|e| BlockError::Corrupt(format!("bad bloom filter: {e}")))?,
            )
        };

        Ok((
            ColumnHeader {
                name,
                value_type,
                dict,
                bloom,
            },
            pos,
        ))
    }
}

// Reads a varint-length-prefixed byte slice from the front of src.
fn read_bytes<'a>(src: &'a [u8], what: &str) -> Result<(&'a [u8], usize), BlockError> {
    let (len, n) = unmarshal_var_u64(src)?;
    let len = len as usize;
    let end = n
        .checked_add(len)
        .filter(|&end| end <= src.len())
        .ok_or_else(|| BlockError::Corrupt(format!("truncated {what}")))?;
    Ok((&src[n..end], end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_with_bloom() {
        let hdr = ColumnHeader {
            name: "status".to_string(),
            value_type: ValueType::Uint16,
            dict: ValuesDict::new(),
            bloom: Some(BloomFilter::from_tokens(&["200", "404", "500"])),
        };
        let mut buf = Vec::new();
        hdr.marshal(&mut buf).unwrap();
        buf.extend_from_slice(b"trailing");

        let (got, n) = ColumnHeader::unmarshal(&buf).unwrap();
        assert_eq!(n, buf.len() - b"trailing".len());
        assert_eq!(got.name, "status");
        assert_eq!(got.value_type, ValueType::Uint16);
        assert!(got.dict.is_empty());
        let bf = got.bloom.unwrap();
        assert!(bf.may_contain(b"404"));
        assert!(!bf.may_contain(b"definitely-not-a-token"));
    }

    #[test]
    fn round_trip_dict_without_bloom() {
        let mut dict = ValuesDict::new();
        dict.get_or_insert("info").unwrap();
        dict.get_or_insert("error").unwrap();
        let hdr = ColumnHeader {
            name: "level".to_string(),
            value_type: ValueType::Dict,
            dict,
            bloom: None,
        };
        let mut buf = Vec::new();
        hdr.marshal(&mut buf).unwrap();

        let (got, n) = ColumnHeader::unmarshal(&buf).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(got.value_type, ValueType::Dict);
        assert_eq!(got.dict.values(), &["info", "error"]);
        assert!(got.bloom.is_none());
    }

    #[test]
    fn rejects_unknown_tag_and_truncation() {
        let hdr = ColumnHeader {
            name: "x".to_string(),
            value_type: ValueType::String,
            dict: ValuesDict::new(),
            bloom: None,
        };
        let mut buf = Vec::new();
        hdr.marshal(&mut buf).unwrap();

        let mut bad = buf.clone();
        bad[2] = 200; // value type tag
        assert!(matches!(
            ColumnHeader::unmarshal(&bad),
            Err(BlockError::UnknownValueType(200))
        ));

        assert!(ColumnHeader::unmarshal(&buf[..buf.len() - 1]).is_err());
        assert!(ColumnHeader::unmarshal(&[]).is_err());
    }
}
