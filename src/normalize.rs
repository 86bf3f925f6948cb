//! Per-row extraction of the truck number, trip date and invoice number.

use chrono::NaiveDate;

use crate::{
    classify::{RoleAssignment, identifier_pattern, invoice_pattern},
    dataset::{Row, TabularDataset},
    dates::parse_fuzzy_date,
};

/// Separator between the two parts of a composite match key.
pub const KEY_SEPARATOR: &str = "|";
/// Stand-in for the date part of a key when the record has no date.
pub const MISSING_DATE_KEY: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub id: String,
    pub date: Option<NaiveDate>,
    /// Empty when no invoice number could be extracted.
    pub invoice: String,
    pub source_file: String,
    pub sheet_name: String,
}

impl NormalizedRecord {
    pub fn new(
        id: impl Into<String>,
        date: Option<NaiveDate>,
        invoice: impl Into<String>,
        source_file: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            invoice: invoice.into(),
            source_file: source_file.into(),
            sheet_name: sheet_name.into(),
        }
    }

    /// `"<file> | <sheet>"`
    pub fn origin(&self) -> String {
        format!("{} | {}", self.source_file, self.sheet_name)
    }

    /// Date plus truck number.
    pub fn primary_key(&self) -> String {
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| MISSING_DATE_KEY.to_string());
        format!("{date}{KEY_SEPARATOR}{}", self.id)
    }

    /// Invoice number plus truck number.
    pub fn fallback_key(&self) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.invoice, self.id)
    }
}

/// First 6-11 character alphanumeric token, trimmed and uppercased.
pub fn extract_identifier(value: &str) -> Option<String> {
    identifier_pattern()
        .find(value)
        .map(|found| found.as_str().trim().to_ascii_uppercase())
}

/// First run of four or more digits.
pub fn extract_invoice(value: &str) -> Option<&str> {
    invoice_pattern().find(value).map(|found| found.as_str())
}

/// Normalizes every row that yields a truck number, preserving row order.
/// Rows without one are skipped; callers can compare lengths to count them.
pub fn normalize(dataset: &TabularDataset, roles: &RoleAssignment) -> Vec<NormalizedRecord> {
    let Some(identifier_column) = roles.identifier else {
        return Vec::new();
    };
    dataset
        .rows()
        .iter()
        .filter_map(|row| {
            let id = extract_identifier(row.cell(identifier_column))?;
            Some(normalize_row(row, id, roles))
        })
        .collect()
}

fn normalize_row(row: &Row, id: String, roles: &RoleAssignment) -> NormalizedRecord {
    let date = roles
        .date
        .and_then(|column| parse_fuzzy_date(row.cell(column)));
    let invoice = roles
        .invoice
        .and_then(|column| extract_invoice(row.cell(column)))
        .unwrap_or_default();
    NormalizedRecord::new(id, date, invoice, row.source_file(), row.sheet_name())
}
