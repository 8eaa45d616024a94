//! Inspect command implementation - decode a PCAS file.

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result, WrapErr};
use pcas_dataset::read_institutional;

/// Run the inspect command.
pub fn run(input: PathBuf) -> Result<()> {
    let bytes = std::fs::read(&input)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read PCAS file: {}", input.display()))?;

    let file = read_institutional(&bytes)
        .wrap_err_with(|| format!("{} is not a valid PCAS file", input.display()))?;
    tracing::info!("Inspected {}: {} records", input.display(), file.records.len());

    let header = &file.header;
    println!("Entity:        {}", header.entity);
    println!("File id:       {}", header.file_id);
    println!("Created:       {} {}", header.creation_date, header.creation_time);
    println!("Total records: {}", header.total_records);
    println!("Data records:  {}", file.records.len());
    for record in &file.records {
        println!(
            "  {:<20} {:<15} {:<20} {}",
            record.trimmed("student_id").unwrap_or_default(),
            record.trimmed("name").unwrap_or_default(),
            record.trimmed("surname1").unwrap_or_default(),
            record.trimmed("birthdate").unwrap_or_default(),
        );
    }
    Ok(())
}
