//! Per-run state shared by every PCAS record of one conversion.

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use pcas_encoding::pack_decimal;

use crate::error::DatasetError;
use crate::Result;

/// Reference instant of the unique file identifier, in Unix seconds
/// (Wed Jul 23 18:00:00 2008 UTC).
pub const REFERENCE_EPOCH: i64 = 1_216_836_000;

/// Digits of the unique file identifier (`PIC S9(10) COMP-3`).
pub const FILE_ID_DIGITS: usize = 10;

/// Run-scoped values stamped into every institutional record.
///
/// The file identifier and its packed form are computed once and never
/// change for the lifetime of the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    entity_code: String,
    file_id: u64,
    packed_file_id: Vec<u8>,
    time: NaiveTime,
}

impl RunContext {
    /// Build the context from the current local time.
    pub fn now(entity_code: impl Into<String>) -> Result<Self> {
        Self::at(entity_code, Local::now())
    }

    /// Build the context for a given instant.
    ///
    /// The file identifier counts whole seconds since [`REFERENCE_EPOCH`];
    /// the wall-clock time is taken in the instant's own zone.
    pub fn at<Tz: TimeZone>(entity_code: impl Into<String>, now: DateTime<Tz>) -> Result<Self> {
        let elapsed = now.timestamp() - REFERENCE_EPOCH;
        let file_id = u64::try_from(elapsed).map_err(|_| DatasetError::ClockBeforeReference)?;
        Self::from_parts(entity_code, file_id, now.naive_local().time())
    }

    /// Build the context from explicit parts.
    pub fn from_parts(
        entity_code: impl Into<String>,
        file_id: u64,
        time: NaiveTime,
    ) -> Result<Self> {
        let packed_file_id = pack_decimal(file_id, FILE_ID_DIGITS)?;
        Ok(Self {
            entity_code: entity_code.into(),
            file_id,
            packed_file_id,
            time,
        })
    }

    /// Organization code that prefixes every record.
    pub fn entity_code(&self) -> &str {
        &self.entity_code
    }

    /// Unique file identifier.
    pub fn file_id(&self) -> u64 {
        self.file_id
    }

    /// Unique file identifier as `PIC S9(10) COMP-3`.
    pub fn packed_file_id(&self) -> &[u8] {
        &self.packed_file_id
    }

    /// Wall-clock time as `HH:MM:SS`.
    pub fn time_stamp(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}
