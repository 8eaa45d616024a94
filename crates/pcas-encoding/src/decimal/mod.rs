//! Packed decimal (COMP-3) support.
//!
//! Only unsigned integer fields are produced by the PCAS writer, so the
//! encoder always emits the positive sign nibble. The decoder accepts every
//! sign nibble IBM hardware recognizes.

mod packed;

pub use packed::{
    pack_decimal, pack_decimal_truncating, pack_into, packed_len, unpack_decimal, PackedDecimal,
};

use crate::error::EncodingError;
use crate::Result;

/// Sign of a packed decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Positive value (sign nibble 0xC, 0xA or 0xE)
    Positive,
    /// Negative value (sign nibble 0xD or 0xB)
    Negative,
    /// Unsigned value (sign nibble 0xF, treated as positive)
    Unsigned,
}

impl Sign {
    /// The preferred sign nibble for this sign.
    pub fn to_packed_nibble(self) -> u8 {
        match self {
            Sign::Positive => 0x0C,
            Sign::Negative => 0x0D,
            Sign::Unsigned => 0x0F,
        }
    }

    /// Parse a packed decimal sign nibble.
    pub fn from_packed_nibble(nibble: u8) -> Result<Self> {
        match nibble & 0x0F {
            0x0C | 0x0A | 0x0E => Ok(Sign::Positive),
            0x0D | 0x0B => Ok(Sign::Negative),
            0x0F => Ok(Sign::Unsigned),
            other => Err(EncodingError::InvalidPacked {
                message: format!("invalid sign nibble 0x{:X}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_to_packed_nibble() {
        assert_eq!(Sign::Positive.to_packed_nibble(), 0x0C);
        assert_eq!(Sign::Negative.to_packed_nibble(), 0x0D);
        assert_eq!(Sign::Unsigned.to_packed_nibble(), 0x0F);
    }

    #[test]
    fn test_sign_from_packed_nibble() {
        assert_eq!(Sign::from_packed_nibble(0x0C).unwrap(), Sign::Positive);
        assert_eq!(Sign::from_packed_nibble(0x0D).unwrap(), Sign::Negative);
        assert_eq!(Sign::from_packed_nibble(0x0F).unwrap(), Sign::Unsigned);
        // Alternative signs
        assert_eq!(Sign::from_packed_nibble(0x0A).unwrap(), Sign::Positive);
        assert_eq!(Sign::from_packed_nibble(0x0E).unwrap(), Sign::Positive);
        assert_eq!(Sign::from_packed_nibble(0x0B).unwrap(), Sign::Negative);
    }

    #[test]
    fn test_digit_nibble_is_not_a_sign() {
        assert!(Sign::from_packed_nibble(0x05).is_err());
    }
}
