//! PCAS institutional files.
//!
//! A PCAS file is a run of 1000-byte binary records with no separators: one
//! header record followed by one record per student. Numeric control fields
//! are packed decimal; everything else is blank-padded ASCII.

use std::io::Write;

use pcas_encoding::{pack_decimal, PackedDecimal};
use tracing::{info, warn};

use crate::context::{RunContext, FILE_ID_DIGITS};
use crate::error::DatasetError;
use crate::interchange::InterchangeDocument;
use crate::layout::{FieldSpec, Record, RecordLayout};
use crate::Result;

/// Length of every institutional record.
pub const INSTITUTIONAL_RECORD_LEN: usize = 1000;

/// Digits of the record sequence field (`PIC S9(02) COMP-3`).
const SEQUENCE_DIGITS: usize = 2;

/// Digits of the header's record total (`PIC S9(12) COMP-3`).
const TOTAL_DIGITS: usize = 12;

const HEADER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("entity", 0, 4),
    FieldSpec::new("file_id", 4, 6),
    FieldSpec::new("sequence", 10, 2),
    FieldSpec::new("code", 12, 1),
    FieldSpec::new("creation_date", 13, 10),
    FieldSpec::new("creation_time", 23, 8),
    FieldSpec::new("total_records", 31, 7),
    FieldSpec::new("filler", 38, 962),
];

const DATA_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("entity", 0, 4),
    FieldSpec::new("file_id", 4, 6),
    FieldSpec::new("sequence", 10, 2),
    FieldSpec::new("code", 12, 1),
    FieldSpec::new("entity2", 13, 4),
    FieldSpec::new("university", 17, 4),
    FieldSpec::new("student_id", 21, 20),
    FieldSpec::new("name", 41, 15),
    FieldSpec::new("surname1", 56, 20),
    FieldSpec::new("birthdate", 76, 10),
    FieldSpec::new("filler", 86, 914),
];

/// Header record layout.
pub const HEADER_LAYOUT: RecordLayout = RecordLayout {
    kind: "institutional header",
    fields: HEADER_FIELDS,
    record_len: INSTITUTIONAL_RECORD_LEN,
    terminator: None,
};

/// Data record layout.
pub const DATA_LAYOUT: RecordLayout = RecordLayout {
    kind: "institutional data",
    fields: DATA_FIELDS,
    record_len: INSTITUTIONAL_RECORD_LEN,
    terminator: None,
};

/// Reformat `YYYYMMDD` as `YYYY-MM-DD`. Missing digits become blanks.
fn iso_date(raw: &[u8]) -> Vec<u8> {
    let mut digits = [b' '; 8];
    let n = raw.len().min(digits.len());
    digits[..n].copy_from_slice(&raw[..n]);

    let mut out = Vec::with_capacity(10);
    out.extend_from_slice(&digits[0..4]);
    out.push(b'-');
    out.extend_from_slice(&digits[4..6]);
    out.push(b'-');
    out.extend_from_slice(&digits[6..8]);
    out
}

/// Write the PCAS file for a validated interchange document.
///
/// Every record carries the run's entity code and file identifier. Returns
/// the number of data records written; the header itself is not counted,
/// although its `total_records` field includes it.
pub fn write_institutional<W: Write>(
    doc: &InterchangeDocument,
    mut out: W,
    run: &RunContext,
) -> Result<usize> {
    let sequence = pack_decimal(1, SEQUENCE_DIGITS)?;
    let total = pack_decimal(doc.data.len() as u64 + 1, TOTAL_DIGITS)?;

    let header = Record::new()
        .with("entity", run.entity_code())
        .with("file_id", run.packed_file_id())
        .with("sequence", &sequence)
        .with("code", "C")
        .with("creation_date", iso_date(doc.creation_date().unwrap_or_default()))
        .with("creation_time", run.time_stamp())
        .with("total_records", &total);
    out.write_all(&HEADER_LAYOUT.serialize(&header)?)?;

    let university = doc.header.get("university").unwrap_or_default();
    for (i, data) in doc.data.iter().enumerate() {
        if !data.contains("birthdate") {
            warn!("Data record {} is truncated; missing fields are blank", i + 1);
        }
        let record = Record::new()
            .with("entity", run.entity_code())
            .with("file_id", run.packed_file_id())
            .with("sequence", &sequence)
            .with("code", "D")
            .with("entity2", run.entity_code())
            .with("university", university)
            .with("student_id", data.get("student_id").unwrap_or_default())
            .with("name", data.get("name").unwrap_or_default())
            .with("surname1", data.get("surname1").unwrap_or_default())
            .with("birthdate", iso_date(data.get("birthdate").unwrap_or_default()));
        out.write_all(&DATA_LAYOUT.serialize(&record)?)?;
    }
    out.flush()?;

    info!(
        "Institutional file written: {} data records, file id {}",
        doc.data.len(),
        run.file_id()
    );
    Ok(doc.data.len())
}

/// Decoded PCAS header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionalHeader {
    pub entity: String,
    pub file_id: u64,
    pub sequence: u64,
    pub creation_date: String,
    pub creation_time: String,
    /// Record count including the header.
    pub total_records: u64,
}

/// A decoded PCAS file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionalFile {
    pub header: InstitutionalHeader,
    /// Student records in file order.
    pub records: Vec<Record>,
}

fn invalid(message: impl Into<String>) -> DatasetError {
    DatasetError::InvalidInstitutionalFile {
        message: message.into(),
    }
}

fn packed_field(record: &Record, name: &str, digits: usize) -> Result<u64> {
    let bytes = record
        .get(name)
        .ok_or_else(|| invalid(format!("missing {} field", name)))?;
    Ok(PackedDecimal::decode(bytes, digits)?.value)
}

/// Decode and check a PCAS file.
///
/// Verifies the record length, the record type codes, that every record
/// carries the header's file identifier, and that the header total equals
/// the number of records.
pub fn read_institutional(bytes: &[u8]) -> Result<InstitutionalFile> {
    if bytes.is_empty() {
        return Err(invalid("file is empty"));
    }
    if bytes.len() % INSTITUTIONAL_RECORD_LEN != 0 {
        return Err(invalid(format!(
            "length {} is not a multiple of {}",
            bytes.len(),
            INSTITUTIONAL_RECORD_LEN
        )));
    }

    let mut chunks = bytes.chunks(INSTITUTIONAL_RECORD_LEN);
    let first = chunks
        .next()
        .ok_or_else(|| invalid("file has no header record"))?;
    let head = HEADER_LAYOUT.parse(first);
    if head.get("code") != Some(&b"C"[..]) {
        return Err(invalid("first record is not a header"));
    }

    let header = InstitutionalHeader {
        entity: head.trimmed("entity").unwrap_or_default(),
        file_id: packed_field(&head, "file_id", FILE_ID_DIGITS)?,
        sequence: packed_field(&head, "sequence", SEQUENCE_DIGITS)?,
        creation_date: head.trimmed("creation_date").unwrap_or_default(),
        creation_time: head.trimmed("creation_time").unwrap_or_default(),
        total_records: packed_field(&head, "total_records", TOTAL_DIGITS)?,
    };

    let mut records = Vec::new();
    for (i, chunk) in chunks.enumerate() {
        let record = DATA_LAYOUT.parse(chunk);
        let number = i + 2;
        if record.get("code") != Some(&b"D"[..]) {
            return Err(invalid(format!("record {} is not a data record", number)));
        }
        let file_id = packed_field(&record, "file_id", FILE_ID_DIGITS)?;
        if file_id != header.file_id {
            return Err(invalid(format!(
                "record {} has file id {} but the header has {}",
                number, file_id, header.file_id
            )));
        }
        records.push(record);
    }

    if header.total_records != records.len() as u64 + 1 {
        return Err(invalid(format!(
            "header declares {} records but file has {}",
            header.total_records,
            records.len() + 1
        )));
    }

    Ok(InstitutionalFile { header, records })
}
