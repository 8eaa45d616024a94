//! Packed Decimal (COMP-3) encoding and decoding.
//!
//! Packed decimal stores two decimal digits per byte, with the rightmost
//! nibble holding the sign.
//!
//! # Format
//!
//! For a `PIC S9(n) COMP-3` declaration:
//! - Storage size = ceil((n + 1) / 2) bytes
//! - Digits are right-aligned and zero-filled on the left
//! - The last byte carries the final digit and the sign nibble
//!
//! Example: +1 in `PIC S9(2) COMP-3` is `0x00 0x1C`. The even digit count
//! leaves one spare leading nibble, which is always zero.

use super::Sign;
use crate::error::EncodingError;
use crate::Result;

/// Storage size in bytes of a packed field with `digits` digits.
pub fn packed_len(digits: usize) -> usize {
    (digits + 2) / 2 // +1 for the sign nibble, then round up
}

/// Packed decimal field: an unsigned value and its declared digit capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedDecimal {
    /// The value.
    pub value: u64,
    /// Declared number of digits (the `n` in `PIC S9(n)`).
    pub digits: usize,
}

impl PackedDecimal {
    /// Create a new packed decimal field.
    pub fn new(value: u64, digits: usize) -> Self {
        Self { value, digits }
    }

    /// Storage size in bytes.
    pub fn storage_size(&self) -> usize {
        packed_len(self.digits)
    }

    /// Encode the value, rejecting values wider than the field.
    pub fn encode(&self) -> Result<Vec<u8>> {
        pack_decimal(self.value, self.digits)
    }

    /// Decode a field of `digits` digits.
    pub fn decode(bytes: &[u8], digits: usize) -> Result<Self> {
        if bytes.len() != packed_len(digits) {
            return Err(EncodingError::BufferSize {
                digits,
                expected: packed_len(digits),
                actual: bytes.len(),
            });
        }
        let (value, sign) = unpack_decimal(bytes)?;
        if sign == Sign::Negative {
            return Err(EncodingError::InvalidPacked {
                message: format!("negative value -{} in unsigned field", value),
            });
        }
        Ok(Self { value, digits })
    }
}

fn digit_count(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// Encode `value` as a positive packed decimal of `digits` digits.
///
/// # Errors
/// Returns [`EncodingError::Overflow`] if the value has more than `digits`
/// digits, and [`EncodingError::ZeroDigits`] for a zero-width field.
pub fn pack_decimal(value: u64, digits: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; packed_len(digits)];
    pack_into(value, digits, &mut buf)?;
    Ok(buf)
}

/// Encode `value` into a caller-provided buffer of exactly
/// `packed_len(digits)` bytes.
pub fn pack_into(value: u64, digits: usize, target: &mut [u8]) -> Result<()> {
    if digits == 0 {
        return Err(EncodingError::ZeroDigits);
    }
    let required = digit_count(value);
    if required > digits {
        return Err(EncodingError::Overflow {
            value,
            required,
            capacity: digits,
        });
    }
    if target.len() != packed_len(digits) {
        return Err(EncodingError::BufferSize {
            digits,
            expected: packed_len(digits),
            actual: target.len(),
        });
    }
    fill_nibbles(value, target);
    Ok(())
}

/// Encode `value` keeping only the digits that fit in the field.
///
/// Digits beyond the field's nibble capacity are dropped from the most
/// significant end, matching what legacy writers produced. Prefer
/// [`pack_decimal`] unless byte compatibility with such writers matters.
pub fn pack_decimal_truncating(value: u64, digits: usize) -> Vec<u8> {
    let mut buf = vec![0u8; packed_len(digits)];
    fill_nibbles(value, &mut buf);
    buf
}

fn fill_nibbles(value: u64, target: &mut [u8]) {
    let mut v = value;
    let sign = Sign::Positive.to_packed_nibble();
    for (i, byte) in target.iter_mut().rev().enumerate() {
        let low = if i == 0 {
            sign
        } else {
            let d = (v % 10) as u8;
            v /= 10;
            d
        };
        let high = (v % 10) as u8;
        v /= 10;
        *byte = (high << 4) | low;
    }
}

/// Decode packed decimal bytes into a magnitude and a sign.
///
/// # Errors
/// Returns an error for empty input, digit nibbles above 9, an invalid
/// sign nibble, or a magnitude that does not fit in a `u64`.
pub fn unpack_decimal(bytes: &[u8]) -> Result<(u64, Sign)> {
    let Some((&last, body)) = bytes.split_last() else {
        return Err(EncodingError::InvalidPacked {
            message: "empty packed decimal".to_string(),
        });
    };

    let mut value: u64 = 0;
    let mut push = |digit: u8| -> Result<()> {
        if digit > 9 {
            return Err(EncodingError::InvalidPacked {
                message: format!("invalid digit nibble 0x{:X}", digit),
            });
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as u64))
            .ok_or_else(|| EncodingError::InvalidPacked {
                message: "value exceeds 64-bit range".to_string(),
            })?;
        Ok(())
    };

    for &byte in body {
        push(byte >> 4)?;
        push(byte & 0x0F)?;
    }
    push(last >> 4)?;

    let sign = Sign::from_packed_nibble(last & 0x0F)?;
    Ok((value, sign))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(1), 1);
        assert_eq!(packed_len(2), 2);
        assert_eq!(packed_len(5), 3);
        assert_eq!(packed_len(10), 6);
        assert_eq!(packed_len(12), 7);
    }

    #[test]
    fn test_pack_odd_digits() {
        // +12345 in PIC S9(5): d1|d2 d3|d4 d5|sign
        assert_eq!(pack_decimal(12345, 5).unwrap(), vec![0x12, 0x34, 0x5C]);
    }

    #[test]
    fn test_pack_even_digits() {
        // 6 digits + sign = 7 nibbles -> 4 bytes with a leading zero nibble
        assert_eq!(
            pack_decimal(123456, 6).unwrap(),
            vec![0x01, 0x23, 0x45, 0x6C]
        );
    }

    #[test]
    fn test_pack_one_in_two_digits() {
        let packed = pack_decimal(1, 2).unwrap();
        assert_eq!(packed.len(), 2);
        let nibbles: Vec<u8> = packed.iter().flat_map(|b| [b >> 4, b & 0x0F]).collect();
        assert_eq!(nibbles, vec![0, 0, 1, 0x0C]);
    }

    #[test]
    fn test_pack_zero() {
        assert_eq!(pack_decimal(0, 3).unwrap(), vec![0x00, 0x0C]);
        assert_eq!(pack_decimal(0, 1).unwrap(), vec![0x0C]);
    }

    #[test]
    fn test_pack_file_identifier_width() {
        // PIC S9(10) COMP-3 occupies 6 bytes
        let packed = pack_decimal(9_876_543_210, 10).unwrap();
        assert_eq!(packed, vec![0x09, 0x87, 0x65, 0x43, 0x21, 0x0C]);
    }

    #[test]
    fn test_pack_overflow_rejected() {
        let err = pack_decimal(100, 2).unwrap_err();
        assert_eq!(
            err,
            EncodingError::Overflow {
                value: 100,
                required: 3,
                capacity: 2
            }
        );
    }

    #[test]
    fn test_pack_zero_digits_rejected() {
        assert_eq!(pack_decimal(0, 0).unwrap_err(), EncodingError::ZeroDigits);
    }

    #[test]
    fn test_pack_truncating_drops_high_digits() {
        // 2 bytes hold 3 digit nibbles: 12345 keeps 345
        assert_eq!(pack_decimal_truncating(12345, 2), vec![0x34, 0x5C]);
        // Even capacity uses the spare leading nibble before dropping digits
        assert_eq!(pack_decimal_truncating(100, 2), vec![0x10, 0x0C]);
    }

    #[test]
    fn test_pack_into_wrong_buffer() {
        let mut buf = [0u8; 2];
        assert!(matches!(
            pack_into(1, 5, &mut buf),
            Err(EncodingError::BufferSize { expected: 3, .. })
        ));
    }

    #[test]
    fn test_unpack_positive() {
        let (value, sign) = unpack_decimal(&[0x12, 0x34, 0x5C]).unwrap();
        assert_eq!(value, 12345);
        assert_eq!(sign, Sign::Positive);
    }

    #[test]
    fn test_unpack_negative_sign() {
        let (value, sign) = unpack_decimal(&[0x12, 0x34, 0x5D]).unwrap();
        assert_eq!(value, 12345);
        assert_eq!(sign, Sign::Negative);
    }

    #[test]
    fn test_unpack_invalid_digit() {
        assert!(unpack_decimal(&[0x1A, 0x0C]).is_err());
        assert!(unpack_decimal(&[0xFC]).is_err());
    }

    #[test]
    fn test_unpack_empty() {
        assert!(unpack_decimal(&[]).is_err());
    }

    #[test]
    fn test_roundtrip_within_capacity() {
        for (value, digits) in [(0, 1), (7, 1), (99, 2), (4_294_967_295, 10), (999_999_999_999, 12)]
        {
            let packed = pack_decimal(value, digits).unwrap();
            assert_eq!(packed.len(), packed_len(digits));
            let (unpacked, sign) = unpack_decimal(&packed).unwrap();
            assert_eq!(unpacked, value);
            assert_eq!(sign, Sign::Positive);
        }
    }

    #[test]
    fn test_packed_decimal_struct() {
        let pd = PackedDecimal::new(12345, 5);
        assert_eq!(pd.storage_size(), 3);

        let encoded = pd.encode().unwrap();
        let decoded = PackedDecimal::decode(&encoded, 5).unwrap();
        assert_eq!(decoded, pd);
    }

    #[test]
    fn test_packed_decimal_decode_rejects_negative() {
        assert!(PackedDecimal::decode(&[0x12, 0x34, 0x5D], 5).is_err());
    }

    #[test]
    fn test_packed_decimal_decode_checks_width() {
        assert!(matches!(
            PackedDecimal::decode(&[0x1C], 5),
            Err(EncodingError::BufferSize { .. })
        ));
    }
}
