//! Fixed-width record codecs for student roster exchange.
//!
//! This crate turns roster rows into NEXUSC interchange files, reads and
//! validates those files, and produces the binary PCAS institutional file
//! that the downstream administrative system loads.
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime};
//! use pcas_dataset::{read_interchange, write_institutional, write_interchange};
//! use pcas_dataset::{RecordTypePolicy, RunContext, INSTITUTIONAL_RECORD_LEN};
//!
//! # fn main() -> pcas_dataset::Result<()> {
//! let rows = vec![
//!     vec!["ID", "Name", "Surname", "Birthdate", "Title", "Program", "Tutor"],
//!     vec!["S001", "Ana", "Gomez", "19990101", "Dr.", "CS", "Prof"],
//! ];
//! let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//!
//! let mut nexusc = Vec::new();
//! let written = write_interchange(&rows, 1, &mut nexusc, "111", today)?;
//! assert_eq!(written, 1);
//!
//! let doc = read_interchange(&nexusc[..], RecordTypePolicy::Lenient)?;
//! let time = NaiveTime::from_hms_opt(14, 5, 9).unwrap();
//! let run = RunContext::from_parts("3294", 576_000_000, time)?;
//! let mut pcas = Vec::new();
//! write_institutional(&doc, &mut pcas, &run)?;
//! assert_eq!(pcas.len(), 2 * INSTITUTIONAL_RECORD_LEN);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - Declarative field layouts with a generic serialize/parse codec
//! - Interchange header/data/footer writer and validating reader
//! - PCAS writer with packed decimal control fields
//! - PCAS reader for inspecting generated files

pub mod context;
pub mod error;
pub mod institutional;
pub mod interchange;
pub mod layout;

pub use context::{RunContext, REFERENCE_EPOCH};
pub use error::DatasetError;
pub use institutional::{
    read_institutional, write_institutional, InstitutionalFile, InstitutionalHeader,
    INSTITUTIONAL_RECORD_LEN,
};
pub use interchange::{
    classify_line, read_interchange, write_interchange, InterchangeDocument, InterchangeWriter,
    LineOutcome, RecordTypePolicy, RosterRow, SkippedLine, INTERCHANGE_RECORD_LEN,
};
pub use layout::{FieldSpec, Record, RecordLayout};

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
