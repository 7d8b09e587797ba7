//! # Encoding — variable-length integer codec
//!
//! Shared varint primitives for the storage core. Run lengths in the boolean
//! RLE codec, entry counts in delete markers, and length prefixes in column
//! headers are all encoded as `VarUint64`:
//!
//! ```text
//! [b0: 1cccccccc][b1: 1ccccccc]...[bn: 0ccccccc]
//! ```
//!
//! Seven payload bits per byte, least-significant group first, high bit set
//! on every byte except the last. A `u64` therefore occupies at most 10
//! bytes.
//!
//! ## Example
//!
//! ```rust
//! use encoding::{marshal_var_u64, unmarshal_var_u64};
//!
//! let mut buf = Vec::new();
//! marshal_var_u64(&mut buf, 300);
//! let (v, n) = unmarshal_var_u64(&buf).unwrap();
//! assert_eq!((v, n), (300, 2));
//! ```

use thiserror::Error;

/// Maximum encoded size of a `VarUint64` in bytes.
pub const MAX_VAR_UINT64_LEN: usize = 10;

/// Errors produced while decoding varint data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// The input ended before the final (continuation-bit-clear) byte.
    #[error("truncated VarUint64: input ended after {0} bytes")]
    Truncated(usize),
    /// More than 10 bytes carried a continuation bit, or the tenth byte
    /// overflows 64 bits.
    #[error("VarUint64 overflows u64")]
    Overflow,
}

/// Appends `v` to `dst` as a `VarUint64`.
pub fn marshal_var_u64(dst: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        dst.push((v as u8) | 0x80);
        v >>= 7;
    }
    dst.push(v as u8);
}

/// Decodes a `VarUint64` from the front of `src`.
///
/// Returns the decoded value and the number of bytes consumed.
///
/// # Errors
///
/// Returns [`EncodingError::Truncated`] if `src` ends mid-value and
/// [`EncodingError::Overflow`] if the encoding does not fit in a `u64`.
pub fn unmarshal_var_u64(src: &[u8]) -> Result<(u64, usize), EncodingError> {
    let mut v: u64 = 0;
    for (i, &b) in src.iter().enumerate() {
        if i >= MAX_VAR_UINT64_LEN {
            return Err(EncodingError::Overflow);
        }
        let payload = (b & 0x7f) as u64;
        // The tenth byte may only carry the single remaining bit.
        if i == MAX_VAR_UINT64_LEN - 1 && b > 1 {
            return Err(EncodingError::Overflow);
        }
        v |= payload << (7 * i);
        if b & 0x80 == 0 {
            return Ok((v, i + 1));
        }
    }
    Err(EncodingError::Truncated(src.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_small_values() {
        for v in [0u64, 1, 2, 127] {
            let mut buf = Vec::new();
            marshal_var_u64(&mut buf, v);
            assert_eq!(buf.len(), 1);
            assert_eq!(unmarshal_var_u64(&buf), Ok((v, 1)));
        }
    }

    #[test]
    fn roundtrip_boundaries() {
        for v in [
            128u64,
            16_383,
            16_384,
            u32::MAX as u64,
            u64::MAX - 1,
            u64::MAX,
        ] {
            let mut buf = Vec::new();
            marshal_var_u64(&mut buf, v);
            let (got, n) = unmarshal_var_u64(&buf).unwrap();
            assert_eq!(got, v);
            assert_eq!(n, buf.len());
        }
    }

    #[test]
    fn max_value_takes_ten_bytes() {
        let mut buf = Vec::new();
        marshal_var_u64(&mut buf, u64::MAX);
        assert_eq!(buf.len(), MAX_VAR_UINT64_LEN);
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut buf = Vec::new();
        marshal_var_u64(&mut buf, 300);
        buf.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(unmarshal_var_u64(&buf), Ok((300, 2)));
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(unmarshal_var_u64(&[]), Err(EncodingError::Truncated(0)));
        assert_eq!(
            unmarshal_var_u64(&[0x80]),
            Err(EncodingError::Truncated(1))
        );
        assert_eq!(
            unmarshal_var_u64(&[0xff, 0xff]),
            Err(EncodingError::Truncated(2))
        );
    }

    #[test]
    fn overlong_input_is_rejected() {
        // Eleven continuation bytes can never be a valid u64.
        let buf = [0x80u8; 11];
        assert_eq!(unmarshal_var_u64(&buf), Err(EncodingError::Overflow));
        // Ten bytes where the last one carries more than one bit.
        let mut buf = vec![0xffu8; 9];
        buf.push(0x02);
        assert_eq!(unmarshal_var_u64(&buf), Err(EncodingError::Overflow));
    }
}
