mod pool_tests;

use crate::{Bitmap, BoolRle};

/// Builds a bitmap from a pattern like `"1010"`; index 0 is the first char.
pub fn bitmap_from_str(pattern: &str) -> Bitmap {
    let mut bm = Bitmap::new();
    bm.init(pattern.len());
    for (i, ch) in pattern.chars().enumerate() {
        match ch {
            '1' => bm.set_bit(i),
            '0' => {}
            other => panic!("bad pattern char {other:?}"),
        }
    }
    bm
}

/// Encodes a pattern like `"1010"` straight to RLE.
pub fn rle_from_str(pattern: &str) -> BoolRle {
    BoolRle::encode(&bitmap_from_str(pattern))
}

/// Decodes `rle` into a `"1010"`-style pattern of the given length.
pub fn rle_to_str(rle: &BoolRle, len: usize) -> String {
    let mut bm = Bitmap::new();
    bm.init(len);
    rle.decode_into(&mut bm).unwrap();
    (0..len).map(|i| if bm.is_set(i) { '1' } else { '0' }).collect()
}
