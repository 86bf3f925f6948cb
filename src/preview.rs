use anyhow::Result;
use log::info;

use crate::{
    cli::PreviewArgs,
    dataset::{self, LoadOptions},
    io_utils, table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.read.input_encoding.as_deref())?;
    let load = LoadOptions {
        delimiter: args.read.delimiter,
        encoding,
    };
    let data = dataset::load_dataset(&args.inputs, &load);
    let rows = data
        .rows()
        .iter()
        .take(args.rows)
        .map(|row| {
            let mut cells = row.cells().to_vec();
            cells.push(row.source_file().to_string());
            cells.push(row.sheet_name().to_string());
            cells
        })
        .collect::<Vec<_>>();

    table::print_table(&data.headers(), &rows);
    info!(
        "Displayed {} of {} row(s) across {} column(s)",
        rows.len(),
        data.len(),
        data.width()
    );
    Ok(())
}
