use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::classify::{ClassifyOptions, DEFAULT_MIN_MATCHES, DEFAULT_SAMPLE_SIZE};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Compare truck ledgers against bill ledgers without a schema",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Match every main-ledger truck entry to a bill and report the missing ones
    Compare(CompareArgs),
    /// Show which columns were detected as truck number, date and invoice
    Detect(DetectArgs),
    /// Preview the first rows of the assembled, header-less dataset
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReadArgs {
    /// Delimiter character for input sheets (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input sheets (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct DetectionArgs {
    /// Number of non-empty values sampled per column
    #[arg(long = "sample-size", default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample_size: usize,
    /// Sampled values that must match before a column is assigned a role
    #[arg(long = "min-matches", default_value_t = DEFAULT_MIN_MATCHES)]
    pub min_matches: usize,
    /// Never assign more than one role to the same column
    #[arg(long = "exclusive-roles")]
    pub exclusive_roles: bool,
}

impl DetectionArgs {
    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            sample_size: self.sample_size,
            min_matches: self.min_matches,
            exclusive_roles: self.exclusive_roles,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Main ledger sheet, or a directory whose delimited files are its sheets
    #[arg(short = 'm', long = "main", required = true, action = clap::ArgAction::Append)]
    pub main: Vec<PathBuf>,
    /// Bill ledger sheet, or a directory whose delimited files are its sheets
    #[arg(short = 'b', long = "bill", required = true, action = clap::ArgAction::Append)]
    pub bill: Vec<PathBuf>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to comma, or tab for .tsv)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Render the result as an elastic table on stdout
    #[arg(long = "table", conflicts_with = "output")]
    pub table: bool,
    /// Emit only main entries that have no matching bill
    #[arg(long = "missing-only")]
    pub missing_only: bool,
    /// Ignore keys whose date or invoice part is empty instead of matching on them
    #[arg(long = "skip-incomplete-keys")]
    pub skip_incomplete_keys: bool,
    #[command(flatten)]
    pub read: ReadArgs,
    #[command(flatten)]
    pub detection: DetectionArgs,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Sheet files or workbook directories to inspect
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Print the detection report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub read: ReadArgs,
    #[command(flatten)]
    pub detection: DetectionArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Sheet files or workbook directories to preview
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    #[command(flatten)]
    pub read: ReadArgs,
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
