//! CLI for converting student rosters to PCAS files.
//!
//! Reads a delimited roster export, writes the NEXUSC interchange file,
//! validates it, and produces the binary PCAS institutional file.
//!
//! # Examples
//!
//! ```bash
//! # Convert a roster; writes ROSTER.TXT and ROSTER.PCAS.TXT
//! pcas convert roster.csv
//!
//! # Check an existing interchange file
//! pcas validate ROSTER.TXT --strict
//!
//! # Show the header of a generated PCAS file
//! pcas inspect ROSTER.PCAS.TXT
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use miette::Result;

mod commands;
mod config;
mod roster;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "pcas")]
#[command(author, version, about = "Student roster to PCAS converter", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./pcas.toml and the user config)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a roster file to NEXUSC and PCAS files
    Convert {
        /// Input roster file (delimited text, first row holds column titles)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory for the generated files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Column delimiter of the roster file
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Leading roster rows holding column titles
        #[arg(long, value_name = "N")]
        header_rows: Option<usize>,

        /// Treat unknown interchange record types as errors
        #[arg(long)]
        strict: bool,

        /// Institution code written to the interchange file
        #[arg(long, value_name = "CODE")]
        institution: Option<String>,

        /// Entity code written to every PCAS record
        #[arg(long, value_name = "CODE")]
        entity: Option<String>,
    },

    /// Validate a NEXUSC interchange file
    Validate {
        /// Input interchange file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Treat unknown record types as errors
        #[arg(long)]
        strict: bool,
    },

    /// Decode a PCAS institutional file and show its header
    Inspect {
        /// Input PCAS file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the default configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Send tracing output to the run log, falling back to stderr.
fn init_logging(path: &Path, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    match std::fs::File::create(path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(e) => {
            eprintln!("Cannot create log file {}: {}", path.display(), e);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load(),
    };
    if let Some(log_file) = cli.log_file {
        config.logging.file = log_file;
    }

    if !matches!(cli.command, Commands::Config | Commands::Completions { .. }) {
        init_logging(&config.logging.file, cli.verbose);
        tracing::info!("Initialized");
    }

    match cli.command {
        Commands::Convert {
            input,
            output_dir,
            delimiter,
            header_rows,
            strict,
            institution,
            entity,
        } => {
            if let Some(dir) = output_dir {
                config.output.dir = Some(dir);
            }
            if let Some(delimiter) = delimiter {
                config.input.delimiter = delimiter;
            }
            if let Some(rows) = header_rows {
                config.input.header_rows = rows;
            }
            if strict {
                config.validation.strict_record_types = true;
            }
            if let Some(code) = institution {
                config.codes.institution = code;
            }
            if let Some(code) = entity {
                config.codes.entity = code;
            }
            commands::convert::run(input, &config)
        }
        Commands::Validate { input, strict } => {
            commands::validate::run(input, strict || config.validation.strict_record_types)
        }
        Commands::Inspect { input } => commands::inspect::run(input),
        Commands::Config => {
            print!("{}", Config::generate_default());
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pcas", &mut std::io::stdout());
            Ok(())
        }
    }
}
