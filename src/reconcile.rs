//! Matching main-ledger records to bill records.
//!
//! Bill records are indexed twice, by date + truck number and by invoice +
//! truck number. Each main record is looked up by date first and by invoice
//! second. When several bills share a key the one seen last is kept.

use std::{collections::HashMap, fmt};

use chrono::NaiveDate;
use log::debug;
use serde::{Serialize, Serializer};

use crate::normalize::NormalizedRecord;

/// Reported in place of a bill origin when nothing matched.
pub const NOT_FOUND: &str = "Not Found";

pub const RESULT_HEADERS: [&str; 7] = [
    "Date",
    "Invoice No",
    "Truck No",
    "Status",
    "Bill Number",
    "Source File",
    "Sheet Name",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Skip keys whose date or invoice part is absent, on both sides.
    pub skip_incomplete_keys: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Found,
    FoundViaInvoice,
    Missing,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Found => "Found",
            MatchStatus::FoundViaInvoice => "Found via Invoice",
            MatchStatus::Missing => "Missing",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MatchStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One output row per main record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Invoice No")]
    pub invoice: String,
    #[serde(rename = "Truck No")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: MatchStatus,
    #[serde(rename = "Bill Number")]
    pub matched_origin: String,
    #[serde(rename = "Source File")]
    pub source_file: String,
    #[serde(rename = "Sheet Name")]
    pub sheet_name: String,
}

impl ReconciliationResult {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            self.invoice.clone(),
            self.id.clone(),
            self.status.to_string(),
            self.matched_origin.clone(),
            self.source_file.clone(),
            self.sheet_name.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub found: usize,
    pub found_via_invoice: usize,
    pub missing: usize,
}

impl ReconciliationSummary {
    pub fn from_results(results: &[ReconciliationResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.status {
                MatchStatus::Found => summary.found += 1,
                MatchStatus::FoundViaInvoice => summary.found_via_invoice += 1,
                MatchStatus::Missing => summary.missing += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.found + self.found_via_invoice + self.missing
    }
}

/// Key lookups built from the bill side.
#[derive(Debug, Default)]
pub struct BillIndex {
    primary: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl BillIndex {
    pub fn build(bills: &[NormalizedRecord], options: &MatchOptions) -> Self {
        let mut index = Self::default();
        let mut overwritten = 0usize;
        for bill in bills {
            let origin = bill.origin();
            if let Some(key) = primary_key(bill, options)
                && index.primary.insert(key, origin.clone()).is_some()
            {
                overwritten += 1;
            }
            if let Some(key) = fallback_key(bill, options)
                && index.fallback.insert(key, origin).is_some()
            {
                overwritten += 1;
            }
        }
        if overwritten > 0 {
            debug!(
                "{overwritten} bill key(s) were shared by more than one bill; the last one wins"
            );
        }
        index
    }

    pub fn resolve(
        &self,
        record: &NormalizedRecord,
        options: &MatchOptions,
    ) -> (MatchStatus, String) {
        if let Some(origin) =
            primary_key(record, options).and_then(|key| self.primary.get(&key))
        {
            return (MatchStatus::Found, origin.clone());
        }
        if let Some(origin) =
            fallback_key(record, options).and_then(|key| self.fallback.get(&key))
        {
            return (MatchStatus::FoundViaInvoice, origin.clone());
        }
        (MatchStatus::Missing, NOT_FOUND.to_string())
    }
}

fn primary_key(record: &NormalizedRecord, options: &MatchOptions) -> Option<String> {
    if options.skip_incomplete_keys && record.date.is_none() {
        return None;
    }
    Some(record.primary_key())
}

fn fallback_key(record: &NormalizedRecord, options: &MatchOptions) -> Option<String> {
    if options.skip_incomplete_keys && record.invoice.is_empty() {
        return None;
    }
    Some(record.fallback_key())
}

/// Resolves every main record against the bills, in main order.
pub fn reconcile(
    main: &[NormalizedRecord],
    bills: &[NormalizedRecord],
    options: &MatchOptions,
) -> Vec<ReconciliationResult> {
    let index = BillIndex::build(bills, options);
    main.iter()
        .map(|record| {
            let (status, matched_origin) = index.resolve(record, options);
            ReconciliationResult {
                date: record.date,
                invoice: record.invoice.clone(),
                id: record.id.clone(),
                status,
                matched_origin,
                source_file: record.source_file.clone(),
                sheet_name: record.sheet_name.clone(),
            }
        })
        .collect()
}
