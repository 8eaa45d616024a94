//! Declarative fixed-width record layouts.
//!
//! Every record kind is described by a constant table of fields, each with
//! a byte offset and a byte width. One generic serializer and one generic
//! parser handle all of them; no record kind has hand-written field code.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::DatasetError;
use crate::Result;

/// One field of a fixed-width record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, used as the key in [`Record`].
    pub name: &'static str,
    /// Byte offset from the start of the record.
    pub offset: usize,
    /// Width in bytes.
    pub width: usize,
}

impl FieldSpec {
    /// Declare a field.
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// Offset one past the last byte of the field.
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Layout of one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Record kind name, used in diagnostics.
    pub kind: &'static str,
    /// Fields in offset order.
    pub fields: &'static [FieldSpec],
    /// Total record length, terminator included.
    pub record_len: usize,
    /// Line terminator written in the last byte, if the format is line-oriented.
    pub terminator: Option<u8>,
}

impl RecordLayout {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Length of the data area, i.e. the record without its terminator.
    pub fn data_len(&self) -> usize {
        self.record_len - usize::from(self.terminator.is_some())
    }

    /// Check that fields are ordered, do not overlap, and exactly fill the
    /// data area.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| DatasetError::InvalidLayout {
            layout: self.kind,
            message,
        };

        let mut cursor = 0;
        for field in self.fields {
            if field.width == 0 {
                return Err(invalid(format!("field '{}' has zero width", field.name)));
            }
            if field.offset < cursor {
                return Err(invalid(format!(
                    "field '{}' at offset {} overlaps the previous field ending at {}",
                    field.name, field.offset, cursor
                )));
            }
            cursor = field.end();
        }

        if cursor != self.data_len() {
            return Err(invalid(format!(
                "fields end at {} but the data area is {} bytes",
                cursor,
                self.data_len()
            )));
        }
        Ok(())
    }

    /// Serialize a record into exactly `record_len` bytes.
    ///
    /// Values are left-justified and blank-padded to their field width;
    /// longer values are cut to the width (on a character boundary when the
    /// value is UTF-8 text). Fields absent from the record are blank.
    pub fn serialize(&self, record: &Record) -> Result<Vec<u8>> {
        if let Some(name) = record.names().find(|name| self.field(name).is_none()) {
            return Err(DatasetError::UnknownField {
                layout: self.kind,
                field: name.to_string(),
            });
        }

        let mut out = vec![b' '; self.record_len];
        for field in self.fields {
            let Some(value) = record.get(field.name) else {
                continue;
            };
            let value = fit(value, field.width);
            if let Some(slot) = out.get_mut(field.offset..field.offset + value.len()) {
                slot.copy_from_slice(value);
            }
        }
        if let (Some(terminator), Some(last)) = (self.terminator, out.last_mut()) {
            *last = terminator;
        }
        Ok(out)
    }

    /// Parse a record, copying each field's bytes unmodified.
    ///
    /// Parsing stops at the first field that extends past the end of
    /// `line`; that field and all later ones are absent from the result.
    pub fn parse(&self, line: &[u8]) -> Record {
        let mut record = Record::new();
        for field in self.fields {
            let Some(bytes) = line.get(field.offset..field.end()) else {
                break;
            };
            record.set(field.name, bytes);
        }
        record
    }
}

/// Cut `value` to at most `width` bytes.
fn fit(value: &[u8], width: usize) -> &[u8] {
    if value.len() <= width {
        return value;
    }
    match std::str::from_utf8(value) {
        Ok(text) => {
            let mut end = width;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            &value[..end]
        }
        Err(_) => &value[..width],
    }
}

/// Field values of one record, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<&'static str, Vec<u8>>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value.
    pub fn set(&mut self, name: &'static str, value: impl AsRef<[u8]>) {
        self.fields.insert(name, value.as_ref().to_vec());
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, name: &'static str, value: impl AsRef<[u8]>) -> Self {
        self.set(name, value);
        self
    }

    /// Raw bytes of a field.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Field bytes as text, replacing invalid UTF-8.
    pub fn text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(String::from_utf8_lossy)
    }

    /// Field text with surrounding blanks removed.
    pub fn trimmed(&self, name: &str) -> Option<String> {
        self.text(name).map(|t| t.trim().to_string())
    }

    /// Whether the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of the fields present.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FIELDS: &[FieldSpec] = &[
        FieldSpec::new("code", 0, 1),
        FieldSpec::new("name", 1, 5),
        FieldSpec::new("count", 6, 3),
    ];

    const SAMPLE: RecordLayout = RecordLayout {
        kind: "sample",
        fields: SAMPLE_FIELDS,
        record_len: 10,
        terminator: Some(b'\n'),
    };

    const BINARY: RecordLayout = RecordLayout {
        kind: "binary",
        fields: SAMPLE_FIELDS,
        record_len: 9,
        terminator: None,
    };

    #[test]
    fn test_validate_sample_layouts() {
        SAMPLE.validate().unwrap();
        BINARY.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_overlap() {
        const FIELDS: &[FieldSpec] = &[FieldSpec::new("a", 0, 3), FieldSpec::new("b", 2, 2)];
        let layout = RecordLayout {
            kind: "overlap",
            fields: FIELDS,
            record_len: 4,
            terminator: None,
        };
        assert!(matches!(
            layout.validate(),
            Err(DatasetError::InvalidLayout { layout: "overlap", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_gap_at_end() {
        let layout = RecordLayout {
            kind: "short",
            fields: SAMPLE_FIELDS,
            record_len: 12,
            terminator: Some(b'\n'),
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_serialize_pads_and_terminates() {
        let record = Record::new().with("code", "D").with("name", "Ana");
        let line = SAMPLE.serialize(&record).unwrap();
        assert_eq!(line, b"DAna     \n");
        assert_eq!(line.len(), SAMPLE.record_len);
    }

    #[test]
    fn test_serialize_empty_record_is_blank() {
        let line = SAMPLE.serialize(&Record::new()).unwrap();
        assert_eq!(line, b"         \n");
    }

    #[test]
    fn test_serialize_truncates_long_values() {
        let record = Record::new().with("name", "Alexandra");
        let line = SAMPLE.serialize(&record).unwrap();
        assert_eq!(&line[1..6], b"Alexa");
        assert_eq!(line.len(), 10);
    }

    #[test]
    fn test_serialize_truncates_on_char_boundary() {
        // "Añañ" is 6 bytes; a 5-byte cut would split the final ñ
        let record = Record::new().with("name", "Añañ");
        let line = SAMPLE.serialize(&record).unwrap();
        assert_eq!(&line[1..6], "Aña ".as_bytes());
    }

    #[test]
    fn test_serialize_without_terminator() {
        let record = Record::new().with("count", [0x00u8, 0x1C]);
        let line = BINARY.serialize(&record).unwrap();
        assert_eq!(line.len(), 9);
        assert_eq!(&line[6..9], &[0x00, 0x1C, b' ']);
    }

    #[test]
    fn test_serialize_rejects_unknown_field() {
        let record = Record::new().with("surname", "Gomez");
        assert!(matches!(
            SAMPLE.serialize(&record),
            Err(DatasetError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_parse_keeps_padding() {
        let record = SAMPLE.parse(b"DAna  042\n");
        assert_eq!(record.get("code"), Some(&b"D"[..]));
        assert_eq!(record.get("name"), Some(&b"Ana  "[..]));
        assert_eq!(record.get("count"), Some(&b"042"[..]));
        assert_eq!(record.trimmed("name").as_deref(), Some("Ana"));
    }

    #[test]
    fn test_parse_stops_at_short_read() {
        let record = SAMPLE.parse(b"DAna  ");
        assert!(record.contains("name"));
        assert!(!record.contains("count"));
        assert_eq!(record.len(), 2);

        let record = SAMPLE.parse(b"DAn");
        assert_eq!(record.len(), 1);
        assert!(SAMPLE.parse(b"").is_empty());
    }

    #[test]
    fn test_parse_reproduces_serialized_fields() {
        let record = Record::new()
            .with("code", "C")
            .with("name", "Bo")
            .with("count", "7");
        let line = SAMPLE.serialize(&record).unwrap();
        let parsed = SAMPLE.parse(&line);
        assert_eq!(parsed.get("code"), Some(&b"C"[..]));
        assert_eq!(parsed.get("name"), Some(&b"Bo   "[..]));
        assert_eq!(parsed.get("count"), Some(&b"7  "[..]));
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(SAMPLE.field("count").map(FieldSpec::end), Some(9));
        assert!(SAMPLE.field("missing").is_none());
        assert_eq!(SAMPLE.data_len(), 9);
        assert_eq!(BINARY.data_len(), 9);
    }
}
