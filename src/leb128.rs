//! LEB128 variable-length integer encoding/decoding.
//!
//! Publically exported because the functions are useful on their own.

use bytes::{Buf, BufMut};

use crate::error::DecodeError;

/// Maximum bytes a 64-bit varint can occupy.
///
/// The 10th byte may only carry bit 63 of the result; anything above it
/// would overflow a `u64`.
pub const MAX_VARINT_BYTES: usize = 10;

/// Decode a LEB128 variable-length integer from the front of `buf`.
///
/// Advances the buffer past the decoded bytes. Fails with
/// [`DecodeError::Truncated`] if the buffer ends before a terminating byte
/// (high bit clear) is found, and with [`DecodeError::VarintOverflow`] if
/// the encoding runs past [`MAX_VARINT_BYTES`] or sets bits above bit 63.
pub fn decode_varint<B: Buf>(buf: &mut B) -> Result<u64, DecodeError> {
    let mut value = 0u64;

    for i in 0..MAX_VARINT_BYTES {
        if !buf.has_remaining() {
            return Err(DecodeError::Truncated);
        }
        let byte = buf.get_u8();

        // The 10th byte holds bit 63 of the result and nothing else.
        if i == MAX_VARINT_BYTES - 1 && byte > 0x01 {
            return Err(DecodeError::VarintOverflow);
        }

        value |= u64::from(byte & 0x7F) << (7 * i);

        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }

    // Continuation bit still set after 10 bytes.
    Err(DecodeError::VarintOverflow)
}

/// Encode `value` as a LEB128 varint, returning the number of bytes written.
pub fn encode_varint<B: BufMut>(mut value: u64, buf: &mut B) -> usize {
    let mut written = 1;
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
        written += 1;
    }
    buf.put_u8(value as u8);
    written
}

/// The number of bytes [`encode_varint`] writes for `value`.
///
/// LEB128 stores 7 bits per byte, so this is `ceil(significant_bits / 7)`
/// with a minimum of one byte for zero.
pub const fn encoded_varint_len(value: u64) -> usize {
    // `| 1` keeps the bit count at least one so zero still takes a byte.
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use proptest::property_test;

    use super::*;

    #[test]
    fn smoketest_varint_roundtrip() {
        #[track_caller]
        fn test_case(val: u64, len: usize) {
            let mut buf = Vec::new();
            let written = encode_varint(val, &mut buf);

            assert_eq!(written, len, "invalid encode length");
            assert_eq!(encoded_varint_len(val), len, "invalid computed length");

            let rnd = decode_varint(&mut &buf[..]).unwrap();
            assert_eq!(rnd, val, "invalid value");
        }

        test_case(0, 1);
        test_case(1, 1);
        test_case(42, 1);
        test_case(127, 1);
        test_case(128, 2);
        test_case(300, 2);
        // First value that needs the 9th byte.
        test_case(72057594037927937, 9);
        test_case(u64::MAX, 10);
    }

    #[test]
    fn test_decode_truncated() {
        // Empty buffer.
        let mut buf: &[u8] = &[];
        assert_eq!(decode_varint(&mut buf), Err(DecodeError::Truncated));

        // Continuation bit set but no more bytes.
        let mut buf: &[u8] = &[0x80];
        assert_eq!(decode_varint(&mut buf), Err(DecodeError::Truncated));

        let mut buf: &[u8] = &[0xFF, 0xFF];
        assert_eq!(decode_varint(&mut buf), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_decode_overflow() {
        // 10th byte with bits above bit 63.
        let mut buf: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert_eq!(decode_varint(&mut buf), Err(DecodeError::VarintOverflow));

        // Continuation bit still set on the 10th byte.
        let mut buf: &[u8] = &[
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x81, 0x00,
        ];
        assert_eq!(decode_varint(&mut buf), Err(DecodeError::VarintOverflow));
    }

    #[test]
    fn test_decode_max() {
        // u64::MAX requires all 10 bytes.
        let mut buf: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert_eq!(decode_varint(&mut buf).unwrap(), u64::MAX);
    }

    #[property_test]
    fn proptest_varint_roundtrip(val: u64) {
        let mut buf = Vec::new();
        let written = encode_varint(val, &mut buf);
        prop_assert_eq!(written, buf.len());
        prop_assert_eq!(encoded_varint_len(val), buf.len());

        // Cross-check our bytes against the reference leb128 encoder.
        let mut reference = Vec::new();
        leb128::write::unsigned(&mut reference, val).unwrap();
        prop_assert_eq!(&buf, &reference);

        let mut cursor = &buf[..];
        let rnd = decode_varint(&mut cursor).unwrap();
        prop_assert_eq!(rnd, val);
        prop_assert!(cursor.is_empty());
    }
}
