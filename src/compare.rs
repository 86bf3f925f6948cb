//! End-to-end comparison: classify both ledgers, normalize their rows and
//! reconcile main entries against bills.

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    classify::{ClassifyOptions, Role, RoleAssignment, classify},
    cli::CompareArgs,
    dataset::{self, LoadOptions, TabularDataset},
    error::{CompareError, Side},
    io_utils,
    normalize::{NormalizedRecord, normalize},
    reconcile::{
        MatchOptions, MatchStatus, RESULT_HEADERS, ReconciliationResult, ReconciliationSummary,
        reconcile,
    },
    table,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    pub classify: ClassifyOptions,
    pub matching: MatchOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub main_roles: RoleAssignment,
    pub bill_roles: RoleAssignment,
    pub results: Vec<ReconciliationResult>,
    pub summary: ReconciliationSummary,
    /// Rows dropped for lacking a truck number, per side.
    pub dropped_main: usize,
    pub dropped_bill: usize,
}

/// Runs the whole comparison over already-loaded datasets.
///
/// Fails only when a side has no rows or no truck number column; every other
/// gap (no date column, unparseable cells) degrades matching instead.
pub fn compare_datasets(
    main: &TabularDataset,
    bills: &TabularDataset,
    options: &CompareOptions,
) -> Result<Comparison, CompareError> {
    if main.is_empty() {
        return Err(CompareError::NoData { side: Side::Main });
    }
    if bills.is_empty() {
        return Err(CompareError::NoData { side: Side::Bill });
    }

    let main_roles = classify_side(main, Side::Main, &options.classify);
    let bill_roles = classify_side(bills, Side::Bill, &options.classify);
    if main_roles.identifier.is_none() {
        return Err(CompareError::MissingIdentifier { side: Side::Main });
    }
    if bill_roles.identifier.is_none() {
        return Err(CompareError::MissingIdentifier { side: Side::Bill });
    }

    let main_records = normalize_side(main, &main_roles, Side::Main);
    let bill_records = normalize_side(bills, &bill_roles, Side::Bill);
    let results = reconcile(&main_records, &bill_records, &options.matching);
    let summary = ReconciliationSummary::from_results(&results);

    Ok(Comparison {
        main_roles,
        bill_roles,
        results,
        summary,
        dropped_main: main.len() - main_records.len(),
        dropped_bill: bills.len() - bill_records.len(),
    })
}

fn classify_side(
    dataset: &TabularDataset,
    side: Side,
    options: &ClassifyOptions,
) -> RoleAssignment {
    let roles = classify(dataset, options);
    for role in Role::ALL {
        if let Some(column) = roles.get(role) {
            info!("Detected {side} {role} column: {column}");
        }
    }
    for role in roles.missing() {
        warn!("Could not detect {role} column in {side} data");
    }
    roles
}

fn normalize_side(
    dataset: &TabularDataset,
    roles: &RoleAssignment,
    side: Side,
) -> Vec<NormalizedRecord> {
    let records = normalize(dataset, roles);
    let dropped = dataset.len() - records.len();
    if dropped > 0 {
        warn!("Skipped {dropped} {side} row(s) without a recognizable truck number");
    }
    records
}

pub fn execute(args: &CompareArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.read.input_encoding.as_deref())?;
    let load = LoadOptions {
        delimiter: args.read.delimiter,
        encoding,
    };
    let main = dataset::load_dataset(&args.main, &load);
    let bills = dataset::load_dataset(&args.bill, &load);
    info!(
        "Assembled {} main row(s) and {} bill row(s)",
        main.len(),
        bills.len()
    );

    let options = CompareOptions {
        classify: args.detection.classify_options(),
        matching: MatchOptions {
            skip_incomplete_keys: args.skip_incomplete_keys,
        },
    };
    let comparison = compare_datasets(&main, &bills, &options)?;

    let emitted = comparison
        .results
        .iter()
        .filter(|result| !args.missing_only || result.status == MatchStatus::Missing)
        .collect::<Vec<_>>();

    if args.table {
        let headers = RESULT_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>();
        let rows = emitted.iter().map(|result| result.to_row()).collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    } else {
        let delimiter =
            io_utils::resolve_output_delimiter(args.output.as_deref(), args.output_delimiter);
        let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
        if emitted.is_empty() {
            writer
                .write_record(RESULT_HEADERS)
                .context("Writing result headers")?;
        }
        for (idx, result) in emitted.iter().enumerate() {
            writer
                .serialize(result)
                .with_context(|| format!("Writing result row {}", idx + 1))?;
        }
        writer.flush().context("Flushing comparison output")?;
    }

    let summary = comparison.summary;
    info!(
        "Comparison complete: {} entr(ies), {} found, {} found via invoice, {} missing",
        summary.total(),
        summary.found,
        summary.found_via_invoice,
        summary.missing
    );
    Ok(())
}
