//! Validate command implementation - read and check a NEXUSC file.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use miette::{IntoDiagnostic, Result, WrapErr};
use pcas_dataset::{read_interchange, RecordTypePolicy};

/// Run the validate command.
pub fn run(input: PathBuf, strict: bool) -> Result<()> {
    let file = File::open(&input)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open interchange file: {}", input.display()))?;

    tracing::info!("Validating {}", input.display());

    let policy = if strict {
        RecordTypePolicy::Strict
    } else {
        RecordTypePolicy::Lenient
    };
    let doc = read_interchange(BufReader::new(file), policy)
        .wrap_err_with(|| format!("{} is not a valid interchange file", input.display()))?;

    println!("✓ Header: university {}", doc.university().unwrap_or_default());
    if let Some(date) = doc.header.trimmed("creation_date") {
        println!("  Creation date: {}", date);
    }
    println!("✓ Data records: {}", doc.data.len());
    println!("✓ Footer count matches: {}", doc.declared_count()?);
    if !doc.skipped.is_empty() {
        println!("  {} line(s) with unknown record type skipped:", doc.skipped.len());
        for skipped in &doc.skipped {
            println!("    line {}: '{}'", skipped.line, skipped.code);
        }
    }
    Ok(())
}
