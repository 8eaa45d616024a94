//! Error types for record codec operations.

use miette::Diagnostic;
use pcas_encoding::EncodingError;
use thiserror::Error;

/// Errors that can occur while writing, reading or validating records.
#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    /// A field layout table is inconsistent.
    #[error("Invalid {layout} layout: {message}")]
    #[diagnostic(code(dataset::invalid_layout))]
    InvalidLayout {
        /// Name of the layout.
        layout: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A record carries a field its layout does not declare.
    #[error("Field '{field}' is not part of the {layout} layout")]
    #[diagnostic(code(dataset::unknown_field))]
    UnknownField {
        /// Name of the layout.
        layout: &'static str,
        /// The undeclared field.
        field: String,
    },

    /// An input row has too few columns.
    #[error("Roster row {row} has {found} fields, expected at least {expected}")]
    #[diagnostic(
        code(interchange::short_row),
        help("Rows must contain studentID, name, surname, birthdate, title, department, position")
    )]
    InvalidRow {
        /// 1-based row number in the input.
        row: usize,
        /// Number of fields found.
        found: usize,
        /// Minimum number of fields.
        expected: usize,
    },

    /// A record count does not fit its fixed-width field.
    #[error("Record count {count} does not fit in {width} digits")]
    #[diagnostic(
        code(interchange::count_overflow),
        help("Split the roster into several files")
    )]
    CountOverflow {
        /// The count that overflowed.
        count: usize,
        /// Width of the count field.
        width: usize,
    },

    /// A line starts with a type code other than C, D or F.
    #[error("Unrecognized record type '{code}' at line {line}")]
    #[diagnostic(code(interchange::unrecognized_record_type))]
    UnrecognizedRecordType {
        /// 1-based line number.
        line: usize,
        /// The leading character, escaped.
        code: String,
    },

    /// The interchange stream lacks a header or footer record.
    #[error("Interchange file has no {kind} record")]
    #[diagnostic(code(interchange::missing_record))]
    MissingRecord {
        /// "header" or "footer".
        kind: &'static str,
    },

    /// The footer's num_records field is not a number.
    #[error("Footer num_records field '{value}' is not a number")]
    #[diagnostic(code(interchange::invalid_count))]
    InvalidCount {
        /// Raw field content.
        value: String,
    },

    /// The footer's declared count disagrees with the data records read.
    #[error("num_records field in footer is {declared} but file has {actual} data records")]
    #[diagnostic(
        code(interchange::count_mismatch),
        help("The interchange file is truncated or was edited; regenerate it")
    )]
    RecordCountMismatch {
        /// Count declared by the footer.
        declared: usize,
        /// Data records actually parsed.
        actual: usize,
    },

    /// The clock reads earlier than the file identifier reference instant.
    #[error("System clock is before the file identifier reference instant")]
    #[diagnostic(code(institutional::clock))]
    ClockBeforeReference,

    /// A PCAS file does not have the expected structure.
    #[error("Invalid institutional file: {message}")]
    #[diagnostic(code(institutional::invalid_file))]
    InvalidInstitutionalFile {
        /// Description of the problem.
        message: String,
    },

    /// Packed decimal conversion failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),

    /// I/O error while reading or writing a record stream.
    #[error("I/O error: {message}")]
    #[diagnostic(code(dataset::io_error))]
    IoError {
        /// Description of the I/O error.
        message: String,
    },
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::IoError {
            message: err.to_string(),
        }
    }
}
