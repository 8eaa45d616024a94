//! NEXUSC interchange files.
//!
//! An interchange file is a sequence of 362-byte lines: one header record
//! (`C`), one data record (`D`) per student, and one footer record (`F`)
//! whose `num_records` field states how many data records precede it.

use std::io::{BufRead, Write};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::DatasetError;
use crate::layout::{FieldSpec, Record, RecordLayout};
use crate::Result;

/// Length of every interchange line, terminator included.
pub const INTERCHANGE_RECORD_LEN: usize = 362;

/// Line terminator of interchange records.
pub const TERMINATOR: u8 = b'\n';

/// Width of the footer's record count.
const COUNT_WIDTH: usize = 5;

/// Columns a roster row must provide.
const ROW_FIELDS: usize = 7;

const HEADER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("code", 0, 1),
    FieldSpec::new("university", 1, 3),
    FieldSpec::new("creation_date", 4, 10),
    FieldSpec::new("sequence", 14, 1),
    FieldSpec::new("creation_date_prev", 15, 10),
    FieldSpec::new("sequence_prev", 25, 1),
    FieldSpec::new("filler1", 26, 335),
];

const DATA_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("code", 0, 1),
    FieldSpec::new("doc_type", 1, 1),
    FieldSpec::new("doc_number", 2, 9),
    FieldSpec::new("name", 11, 20),
    FieldSpec::new("surname1", 31, 26),
    FieldSpec::new("surname2", 57, 26),
    FieldSpec::new("domicilio", 83, 103),
    FieldSpec::new("student_id", 186, 12),
    FieldSpec::new("filler1", 198, 75),
    FieldSpec::new("title", 273, 20),
    FieldSpec::new("department", 293, 30),
    FieldSpec::new("position", 323, 30),
    FieldSpec::new("birthdate", 353, 8),
];

const FOOTER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("code", 0, 1),
    FieldSpec::new("university", 1, 3),
    FieldSpec::new("num_records", 4, 5),
    FieldSpec::new("filler1", 9, 352),
];

/// Header record layout.
pub const HEADER_LAYOUT: RecordLayout = RecordLayout {
    kind: "interchange header",
    fields: HEADER_FIELDS,
    record_len: INTERCHANGE_RECORD_LEN,
    terminator: Some(TERMINATOR),
};

/// Data record layout.
pub const DATA_LAYOUT: RecordLayout = RecordLayout {
    kind: "interchange data",
    fields: DATA_FIELDS,
    record_len: INTERCHANGE_RECORD_LEN,
    terminator: Some(TERMINATOR),
};

/// Footer record layout.
pub const FOOTER_LAYOUT: RecordLayout = RecordLayout {
    kind: "interchange footer",
    fields: FOOTER_FIELDS,
    record_len: INTERCHANGE_RECORD_LEN,
    terminator: Some(TERMINATOR),
};

/// One student row of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub student_id: String,
    pub name: String,
    pub surname: String,
    /// Birthdate as `YYYYMMDD`.
    pub birthdate: String,
    pub title: String,
    pub department: String,
    pub position: String,
}

impl RosterRow {
    /// Build a row from its columns:
    /// `[studentID, name, surname, birthdate, title, department, position]`.
    ///
    /// Extra columns are ignored. `row` is the 1-based input row number used
    /// in the error.
    pub fn from_fields<S: AsRef<str>>(row: usize, fields: &[S]) -> Result<Self> {
        if fields.len() < ROW_FIELDS {
            return Err(DatasetError::InvalidRow {
                row,
                found: fields.len(),
                expected: ROW_FIELDS,
            });
        }
        let col = |i: usize| fields[i].as_ref().to_string();
        Ok(Self {
            student_id: col(0),
            name: col(1),
            surname: col(2),
            birthdate: col(3),
            title: col(4),
            department: col(5),
            position: col(6),
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("code", "D")
            .with("name", &self.name)
            .with("surname1", &self.surname)
            .with("student_id", &self.student_id)
            .with("title", &self.title)
            .with("department", &self.department)
            .with("position", &self.position)
            .with("birthdate", &self.birthdate)
    }
}

/// Streaming writer for an interchange file.
pub struct InterchangeWriter<W: Write> {
    writer: W,
    institution: String,
    creation_date: NaiveDate,
    data_records: usize,
}

impl<W: Write> InterchangeWriter<W> {
    /// Create a writer for the given institution code and creation date.
    pub fn new(writer: W, institution: impl Into<String>, creation_date: NaiveDate) -> Self {
        Self {
            writer,
            institution: institution.into(),
            creation_date,
            data_records: 0,
        }
    }

    /// Write the header record.
    ///
    /// The previous-file date repeats the creation date and both sequence
    /// numbers are `0`.
    pub fn write_header(&mut self) -> Result<()> {
        let date = self.creation_date.format("%Y%m%d").to_string();
        let header = Record::new()
            .with("code", "C")
            .with("university", &self.institution)
            .with("creation_date", &date)
            .with("sequence", "0")
            .with("creation_date_prev", &date)
            .with("sequence_prev", "0");
        self.writer.write_all(&HEADER_LAYOUT.serialize(&header)?)?;
        Ok(())
    }

    /// Write one data record.
    pub fn write_row(&mut self, row: &RosterRow) -> Result<()> {
        self.writer.write_all(&DATA_LAYOUT.serialize(&row.to_record())?)?;
        self.data_records += 1;
        debug!("Wrote data record {} for {}", self.data_records, row.student_id);
        Ok(())
    }

    /// Write the footer, flush, and return the number of data records.
    pub fn finish(mut self) -> Result<usize> {
        let footer = footer_record(&self.institution, self.data_records)?;
        self.writer.write_all(&FOOTER_LAYOUT.serialize(&footer)?)?;
        self.writer.flush()?;
        Ok(self.data_records)
    }
}

/// Render a data-record count for the footer's `num_records` field.
fn count_digits(count: usize) -> Result<String> {
    let digits = format!("{:0width$}", count, width = COUNT_WIDTH);
    if digits.len() > COUNT_WIDTH {
        return Err(DatasetError::CountOverflow {
            count,
            width: COUNT_WIDTH,
        });
    }
    Ok(digits)
}

fn footer_record(institution: &str, count: usize) -> Result<Record> {
    let digits = count_digits(count)?;
    Ok(Record::new()
        .with("code", "F")
        .with("university", institution)
        .with("num_records", digits))
}

/// Write a complete interchange file from roster rows.
///
/// The first `header_rows` rows hold column titles and are skipped. The row
/// count and every row are checked before anything is written. Returns the
/// number of data records.
pub fn write_interchange<S, W>(
    rows: &[Vec<S>],
    header_rows: usize,
    out: W,
    institution: &str,
    creation_date: NaiveDate,
) -> Result<usize>
where
    S: AsRef<str>,
    W: Write,
{
    count_digits(rows.len().saturating_sub(header_rows))?;
    let students = rows
        .iter()
        .enumerate()
        .skip(header_rows)
        .map(|(i, fields)| RosterRow::from_fields(i + 1, fields.as_slice()))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = InterchangeWriter::new(out, institution, creation_date);
    writer.write_header()?;
    for student in &students {
        writer.write_row(student)?;
    }
    let count = writer.finish()?;
    info!("Interchange file written with {} data records", count);
    Ok(count)
}

/// How the reader treats lines with an unknown type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordTypePolicy {
    /// Report the line and keep reading.
    #[default]
    Lenient,
    /// Abort the read.
    Strict,
}

/// A line that was skipped because of its type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// The leading character, escaped.
    pub code: String,
}

/// Classification of one interchange line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Header(Record),
    Data(Record),
    Footer(Record),
    /// Empty line, ignored.
    Blank,
    /// Unknown type code; the caller's policy decides whether this is fatal.
    Unrecognized(SkippedLine),
}

/// Classify and parse one line by its leading type code.
pub fn classify_line(line_number: usize, line: &[u8]) -> LineOutcome {
    match line {
        [] | [b'\n'] | [b'\r', b'\n'] => LineOutcome::Blank,
        [b'C', ..] => LineOutcome::Header(HEADER_LAYOUT.parse(line)),
        [b'D', ..] => LineOutcome::Data(DATA_LAYOUT.parse(line)),
        [b'F', ..] => LineOutcome::Footer(FOOTER_LAYOUT.parse(line)),
        [other, ..] => LineOutcome::Unrecognized(SkippedLine {
            line: line_number,
            code: std::ascii::escape_default(*other).to_string(),
        }),
    }
}

/// A parsed and validated interchange file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterchangeDocument {
    /// The last header record seen.
    pub header: Record,
    /// Data records in file order.
    pub data: Vec<Record>,
    /// The last footer record seen.
    pub footer: Record,
    /// Lines skipped under the lenient policy.
    pub skipped: Vec<SkippedLine>,
}

impl InterchangeDocument {
    /// Count declared by the footer's `num_records` field.
    pub fn declared_count(&self) -> Result<usize> {
        declared_count(&self.footer)
    }

    /// Institution code from the header, blanks removed.
    pub fn university(&self) -> Option<String> {
        self.header.trimmed("university")
    }

    /// Header creation date, as stored (`YYYYMMDD` plus padding).
    pub fn creation_date(&self) -> Option<&[u8]> {
        self.header.get("creation_date")
    }
}

fn declared_count(footer: &Record) -> Result<usize> {
    let raw = footer.trimmed("num_records").unwrap_or_default();
    raw.parse()
        .map_err(|_| DatasetError::InvalidCount { value: raw })
}

/// Read an interchange stream and validate its footer count.
///
/// # Errors
/// Fails on I/O errors, on a missing header or footer, on an unreadable or
/// mismatched `num_records`, and on unknown type codes under
/// [`RecordTypePolicy::Strict`].
pub fn read_interchange<R: BufRead>(
    mut input: R,
    policy: RecordTypePolicy,
) -> Result<InterchangeDocument> {
    let mut header = None;
    let mut footer = None;
    let mut data = Vec::new();
    let mut skipped = Vec::new();

    let mut line = Vec::with_capacity(INTERCHANGE_RECORD_LEN);
    let mut line_number = 0;
    loop {
        line.clear();
        if input.read_until(TERMINATOR, &mut line)? == 0 {
            break;
        }
        line_number += 1;

        match classify_line(line_number, &line) {
            LineOutcome::Header(record) => header = Some(record),
            LineOutcome::Data(record) => data.push(record),
            LineOutcome::Footer(record) => footer = Some(record),
            LineOutcome::Blank => {}
            LineOutcome::Unrecognized(skip) => match policy {
                RecordTypePolicy::Strict => {
                    return Err(DatasetError::UnrecognizedRecordType {
                        line: skip.line,
                        code: skip.code,
                    });
                }
                RecordTypePolicy::Lenient => {
                    warn!(
                        "Record type is wrong at line {}: '{}', skipping",
                        skip.line, skip.code
                    );
                    skipped.push(skip);
                }
            },
        }
    }

    let header = header.ok_or(DatasetError::MissingRecord { kind: "header" })?;
    let footer = footer.ok_or(DatasetError::MissingRecord { kind: "footer" })?;

    let declared = declared_count(&footer)?;
    if declared != data.len() {
        return Err(DatasetError::RecordCountMismatch {
            declared,
            actual: data.len(),
        });
    }

    info!(
        "Interchange file validated: {} data records, {} lines skipped",
        data.len(),
        skipped.len()
    );
    Ok(InterchangeDocument {
        header,
        data,
        footer,
        skipped,
    })
}
