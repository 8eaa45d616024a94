//! Convert command implementation - roster to NEXUSC to PCAS.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Local;
use miette::{IntoDiagnostic, Result, WrapErr};
use pcas_dataset::{
    read_interchange, write_institutional, write_interchange, RecordTypePolicy, RunContext,
};

use crate::config::Config;
use crate::roster;

/// Output paths derived from the input file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub interchange: PathBuf,
    pub institutional: PathBuf,
}

impl OutputPaths {
    /// `<dir>/<stem>.<ext>` for both outputs.
    pub fn for_input(input: &Path, config: &Config) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "roster".to_string());
        let dir = config.output.dir.clone().unwrap_or_else(|| PathBuf::from("."));
        Self {
            interchange: dir.join(format!("{}.{}", stem, config.output.interchange_extension)),
            institutional: dir.join(format!(
                "{}.{}",
                stem, config.output.institutional_extension
            )),
        }
    }
}

/// Run the conversion.
pub fn run(input: PathBuf, config: &Config) -> Result<()> {
    if !input.is_file() {
        return Err(miette::miette!("File {} does not exist", input.display()));
    }

    let paths = OutputPaths::for_input(&input, config);
    if let Some(parent) = paths.interchange.parent() {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tracing::info!("Converting {}", input.display());

    let rows = roster::read_rows(&input, config.input.delimiter)?;

    // Stage 1: roster -> interchange
    let file = File::create(&paths.interchange)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to create {}", paths.interchange.display()))?;
    let written = write_interchange(
        &rows,
        config.input.header_rows,
        BufWriter::new(file),
        &config.codes.institution,
        Local::now().date_naive(),
    )
    .wrap_err("Interchange writer failed")?;
    println!(
        "NEXUSC file '{}' successfully created, {} records written.",
        paths.interchange.display(),
        written
    );

    // Stage 2: re-read and validate the interchange file
    let policy = if config.validation.strict_record_types {
        RecordTypePolicy::Strict
    } else {
        RecordTypePolicy::Lenient
    };
    let file = File::open(&paths.interchange)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open {}", paths.interchange.display()))?;
    let doc = read_interchange(BufReader::new(file), policy).wrap_err_with(|| {
        format!(
            "Interchange validation failed for {}; no PCAS file was written",
            paths.interchange.display()
        )
    })?;
    for skipped in &doc.skipped {
        println!(
            "Warning: record type is wrong at line {}: '{}'",
            skipped.line, skipped.code
        );
    }
    println!("File {} processed successfully", paths.interchange.display());
    println!("The number of Data records processed is: {}", doc.data.len());

    // Stage 3: interchange -> PCAS
    let run = RunContext::now(config.codes.entity.clone())?;
    let count = write_atomically(&paths.institutional, |out| {
        Ok(write_institutional(&doc, out, &run)?)
    })
    .wrap_err("Institutional writer failed")?;
    println!(
        "PCAS file '{}' successfully created, {} records written",
        paths.institutional.display(),
        count
    );
    tracing::info!("Run complete, file id {}", run.file_id());
    Ok(())
}

/// Write `path` through a temporary sibling so that a failed run never
/// leaves a complete-looking file behind.
fn write_atomically<T>(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<T>,
) -> Result<T> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let file = File::create(&partial)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to create {}", partial.display()))?;
    let mut out = BufWriter::new(file);

    let result = write(&mut out).and_then(|value| {
        out.into_inner()
            .map_err(|e| e.into_error())
            .and_then(|file| file.sync_all())
            .into_diagnostic()?;
        std::fs::rename(&partial, path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to move output into {}", path.display()))?;
        Ok(value)
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}
