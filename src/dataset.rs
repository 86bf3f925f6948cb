//! Header-less tabular data assembled from one or more sheets.
//!
//! Every sheet is read positionally: the first cell of a row is `Col_0`, the
//! next `Col_1`, and so on. Sheets of different widths are unioned into one
//! [`TabularDataset`] whose width is the widest sheet; missing cells read as
//! empty. Each row remembers the file and sheet it came from.

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info, warn};

use crate::io_utils;

pub const SOURCE_FILE_HEADER: &str = "Source File";
pub const SHEET_NAME_HEADER: &str = "Sheet Name";

/// Positional column handle. Renders as `Col_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub usize);

impl ColumnId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Col_{}", self.0)
    }
}

impl serde::Serialize for ColumnId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One sheet's worth of raw cells, before it is unioned into a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub source_file: String,
    pub sheet_name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(
        source_file: impl Into<String>,
        sheet_name: impl Into<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            sheet_name: sheet_name.into(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
    source_file: String,
    sheet_name: String,
}

impl Row {
    /// Cell text at `column`, or `""` when the row is narrower.
    pub fn cell(&self, column: ColumnId) -> &str {
        self.cells
            .get(column.index())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularDataset {
    width: usize,
    rows: Vec<Row>,
}

impl TabularDataset {
    /// Unions sheets in order. Rows whose cells are all blank are dropped,
    /// surviving cells are trimmed and every row is padded to the widest sheet.
    pub fn from_sheets<I>(sheets: I) -> Self
    where
        I: IntoIterator<Item = Sheet>,
    {
        let mut rows = Vec::new();
        let mut width = 0usize;
        for sheet in sheets {
            for raw in sheet.rows {
                if raw.iter().all(|cell| cell.trim().is_empty()) {
                    continue;
                }
                width = width.max(raw.len());
                rows.push(Row {
                    cells: raw.into_iter().map(|cell| cell.trim().to_string()).collect(),
                    source_file: sheet.source_file.clone(),
                    sheet_name: sheet.sheet_name.clone(),
                });
            }
        }
        for row in &mut rows {
            row.cells.resize(width, String::new());
        }
        Self { width, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        (0..self.width).map(ColumnId)
    }

    /// Non-empty cells of `column`, in row order.
    pub fn non_empty_values(&self, column: ColumnId) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.cell(column))
            .filter(|value| !value.is_empty())
    }

    /// Positional headers followed by the two provenance headers.
    pub fn headers(&self) -> Vec<String> {
        self.columns()
            .map(|column| column.to_string())
            .chain([SOURCE_FILE_HEADER.to_string(), SHEET_NAME_HEADER.to_string()])
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

/// Loads every input path into one dataset.
///
/// A file is a single sheet named after its stem. A directory is treated as a
/// workbook whose sheets are the delimited files it contains. Sheets that
/// cannot be read are skipped with a warning.
pub fn load_dataset(inputs: &[PathBuf], options: &LoadOptions) -> TabularDataset {
    let mut sheets = Vec::new();
    for input in inputs {
        if input.is_dir() {
            sheets.extend(load_workbook_dir(input, options));
            continue;
        }
        let source_file = file_label(input);
        let sheet_name = stem_label(input);
        match read_sheet(input, &source_file, &sheet_name, options) {
            Ok(sheet) => {
                info!("Loaded {} row(s) from {:?}", sheet.rows.len(), input);
                sheets.push(sheet);
            }
            Err(err) => warn!("Could not read file {:?}: {err:#}", input),
        }
    }
    TabularDataset::from_sheets(sheets)
}

fn load_workbook_dir(dir: &Path, options: &LoadOptions) -> Vec<Sheet> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Could not read directory {:?}: {err}", dir);
            return Vec::new();
        }
    };
    let source_file = file_label(dir);
    let paths = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && io_utils::is_sheet_file(path))
        .sorted()
        .collect::<Vec<_>>();
    debug!("Workbook {:?} has {} sheet file(s)", dir, paths.len());

    let mut sheets = Vec::with_capacity(paths.len());
    for path in paths {
        let sheet_name = stem_label(&path);
        match read_sheet(&path, &source_file, &sheet_name, options) {
            Ok(sheet) => {
                info!(
                    "Loaded {} row(s) from sheet '{}' of {:?}",
                    sheet.rows.len(),
                    sheet_name,
                    dir
                );
                sheets.push(sheet);
            }
            Err(err) => warn!(
                "Could not read sheet '{}' from {:?}: {err:#}",
                sheet_name, dir
            ),
        }
    }
    sheets
}

pub fn read_sheet(
    path: &Path,
    source_file: &str,
    sheet_name: &str,
    options: &LoadOptions,
) -> Result<Sheet> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_sheet_reader_from_path(path, delimiter)?;
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 1))?;
        let decoded = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {} in {path:?}", row_idx + 1))?;
        rows.push(decoded);
    }
    Ok(Sheet::new(source_file, sheet_name, rows))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn stem_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
