pub mod classify;
pub mod cli;
pub mod compare;
pub mod dataset;
pub mod dates;
pub mod detect;
pub mod error;
pub mod io_utils;
pub mod normalize;
pub mod preview;
pub mod reconcile;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    classify::{ClassifyOptions, Role, RoleAssignment, classify},
    compare::{CompareOptions, Comparison, compare_datasets},
    dataset::{ColumnId, Sheet, TabularDataset},
    error::{CompareError, Side},
    normalize::{NormalizedRecord, normalize},
    reconcile::{MatchOptions, MatchStatus, ReconciliationResult, reconcile},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("truck_compare", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Compare(args) => {
            debug!(
                "Reading input with delimiter '{}'",
                args.read
                    .delimiter
                    .map(io_utils::printable_delimiter)
                    .unwrap_or_else(|| "auto".to_string())
            );
            compare::execute(&args)
        }
        Commands::Detect(args) => detect::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}
