//! Canonical fixed-width encodings for typed column values.
//!
//! All integers are big-endian so that lexicographic byte order matches
//! numeric order, and two equal values always produce identical bytes
//! regardless of their textual spelling.

use byteorder::{BigEndian, ByteOrder};

pub fn encode_uint8(v: u8) -> [u8; 1] {
    [v]
}

pub fn encode_uint16(v: u16) -> [u8; 2] {
    let mut buf = [0u8; 2];
    BigEndian::write_u16(&mut buf, v);
    buf
}

pub fn encode_uint32(v: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, v);
    buf
}

pub fn encode_uint64(v: u64) -> [u8; 8] {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, v);
    buf
}

/// Encodes the raw IEEE 754 bit pattern. NaN payloads are preserved, so a
/// parsed value always round-trips exactly.
pub fn encode_float64(v: f64) -> [u8; 8] {
    encode_uint64(v.to_bits())
}

pub fn encode_ipv4(addr: u32) -> [u8; 4] {
    encode_uint32(addr)
}

/// Encodes epoch nanoseconds as their two's-complement bit pattern.
pub fn encode_timestamp(nanos: i64) -> [u8; 8] {
    encode_uint64(nanos as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_layout() {
        assert_eq!(encode_uint8(0x12), [0x12]);
        assert_eq!(encode_uint16(0x1234), [0x12, 0x34]);
        assert_eq!(encode_uint32(0x12345678), [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(
            encode_uint64(0x0102030405060708),
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn equal_values_encode_identically() {
        use crate::parse::{try_parse_float64, try_parse_uint64};
        let a = try_parse_uint64("12").unwrap();
        let b = try_parse_uint64("012").unwrap();
        assert_eq!(encode_uint64(a), encode_uint64(b));

        let a = try_parse_float64("1.50").unwrap();
        let b = try_parse_float64("1.5").unwrap();
        assert_eq!(encode_float64(a), encode_float64(b));
    }

    #[test]
    fn ordered_by_bytes() {
        assert!(encode_uint32(5) < encode_uint32(300));
        assert!(encode_ipv4(0x01020304) < encode_ipv4(0x01020305));
    }
}
