use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::persist::DEFAULT_BATCH_SIZE;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Normalize messy spreadsheets and CSVs into linked tables",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean, factor and save every input file (directories are walked)
    Normalize(NormalizeArgs),
    /// Score candidate header rows and report the chosen one
    DetectHeader(DetectHeaderArgs),
    /// Render the cleaned table of a single file
    Preview(PreviewArgs),
    /// Print the CREATE TABLE statements a file would produce
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Input files or directories
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Directory receiving cleaned CSVs, table definitions and summary.json
    #[arg(short = 'o', long = "output-dir", default_value = "normalized")]
    pub output_dir: PathBuf,
    /// Dataset configuration (YAML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// SQLite database receiving the tables
    #[arg(long, env = "TABLE_NORMALIZE_DATABASE")]
    pub database: Option<PathBuf>,
    /// Write tables to the destination database
    #[arg(long)]
    pub upload: bool,
    /// Skip writing cleaned CSVs and table definitions
    #[arg(long = "no-local")]
    pub no_local: bool,
    /// Rows inspected when locating the header (overrides the config)
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,
    /// Rows per INSERT statement
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Delimiter for text inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of text inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

/// Options shared by the single-file inspection commands.
#[derive(Debug, Args)]
pub struct SingleFileArgs {
    /// Input file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Dataset configuration (YAML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Rows inspected when locating the header (overrides the config)
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,
    /// Delimiter for text inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of text inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct DetectHeaderArgs {
    #[command(flatten)]
    pub file: SingleFileArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub file: SingleFileArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub file: SingleFileArgs,
    /// Describe the cleaned table without extracting configured dimensions
    #[arg(long = "no-dimensions")]
    pub no_dimensions: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
