//! Packed decimal encoding for PCAS institutional records.
//!
//! PCAS records carry their numeric control fields (file identifier,
//! sequence, record totals) as COBOL `PIC S9(n) COMP-3` items. This crate
//! converts between unsigned integers and that packed BCD representation.
//!
//! # Example
//!
//! ```rust
//! use pcas_encoding::{pack_decimal, unpack_decimal, Sign};
//!
//! let packed = pack_decimal(12345, 5).unwrap();
//! assert_eq!(packed, vec![0x12, 0x34, 0x5C]);
//!
//! let (value, sign) = unpack_decimal(&packed).unwrap();
//! assert_eq!(value, 12345);
//! assert_eq!(sign, Sign::Positive);
//! ```

pub mod decimal;
pub mod error;

pub use decimal::{
    pack_decimal, pack_decimal_truncating, pack_into, packed_len, unpack_decimal, PackedDecimal,
    Sign,
};
pub use error::EncodingError;

/// Result type for encoding operations.
pub type Result<T> = std::result::Result<T, EncodingError>;
