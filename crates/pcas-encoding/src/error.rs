//! Error types for packed decimal conversion.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while packing or unpacking decimal fields.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum EncodingError {
    /// The value has more digits than the field can hold.
    #[error("Value {value} requires {required} digits but only {capacity} available")]
    #[diagnostic(
        code(encoding::overflow),
        help("Widen the PIC clause or check the value for a data-entry error")
    )]
    Overflow {
        /// The value that did not fit.
        value: u64,
        /// Digits needed to represent the value.
        required: usize,
        /// Declared digit capacity of the field.
        capacity: usize,
    },

    /// A digit capacity of zero was requested.
    #[error("Packed decimal fields need at least one digit")]
    #[diagnostic(code(encoding::zero_digits))]
    ZeroDigits,

    /// The target buffer does not match the field's storage size.
    #[error("Packed field of {digits} digits needs {expected} bytes, got {actual}")]
    #[diagnostic(code(encoding::buffer_size))]
    BufferSize {
        /// Declared digit capacity.
        digits: usize,
        /// Storage size required.
        expected: usize,
        /// Size of the buffer supplied.
        actual: usize,
    },

    /// Packed bytes could not be decoded.
    #[error("Invalid packed decimal: {message}")]
    #[diagnostic(code(encoding::invalid_packed))]
    InvalidPacked {
        /// What was wrong with the bytes.
        message: String,
    },
}
