use anyhow::{Context, Result};
use log::info;

use crate::{
    classify::{self, DetectionReport, Role},
    cli::DetectArgs,
    dataset::{self, LoadOptions},
    io_utils, table,
};

pub fn execute(args: &DetectArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.read.input_encoding.as_deref())?;
    let load = LoadOptions {
        delimiter: args.read.delimiter,
        encoding,
    };
    let data = dataset::load_dataset(&args.inputs, &load);
    let report = classify::detect(&data, &args.detection.classify_options());

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Serializing detection report")?;
        println!("{rendered}");
    } else {
        let (headers, rows) = report_rows(&report);
        table::print_table(&headers, &rows);
    }

    let detected = Role::ALL
        .iter()
        .filter(|role| report.assignment.get(**role).is_some())
        .count();
    info!(
        "Detected {detected} of {} role(s) across {} column(s) and {} row(s)",
        Role::ALL.len(),
        data.width(),
        data.len()
    );
    Ok(())
}

pub fn report_rows(report: &DetectionReport) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = ["column", "sampled", "truck", "date", "invoice", "role", "samples"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = report
        .columns
        .iter()
        .map(|score| {
            let roles = report
                .assignment
                .roles_of(score.column)
                .iter()
                .map(|role| role.label())
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                score.column.to_string(),
                score.sampled.to_string(),
                score.identifier_hits.to_string(),
                score.date_hits.to_string(),
                score.invoice_hits.to_string(),
                roles,
                score.samples.join(" / "),
            ]
        })
        .collect();
    (headers, rows)
}
