//! Column role inference.
//!
//! Each positional column is sampled (first non-empty values, in row order)
//! and scored against three detectors. Columns are visited left to right and,
//! within a column, roles are tried in the order identifier, date, invoice.
//! The first column that reaches the hit threshold claims a role.
//!
//! By default a column may claim several roles at once; set
//! [`ClassifyOptions::exclusive_roles`] to stop a column from being assigned
//! more than one role.

use std::{fmt, sync::OnceLock};

use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::{
    dataset::{ColumnId, TabularDataset},
    dates::parse_fuzzy_date,
};

pub const DEFAULT_SAMPLE_SIZE: usize = 30;
pub const DEFAULT_MIN_MATCHES: usize = 2;

pub(crate) fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[A-Za-z0-9]{6,11}\b").expect("valid regex"))
}

pub(crate) fn invoice_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{4,}").expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Non-empty values inspected per column.
    pub sample_size: usize,
    /// Sampled values that must satisfy a detector for the column to qualify.
    pub min_matches: usize,
    pub exclusive_roles: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            min_matches: DEFAULT_MIN_MATCHES,
            exclusive_roles: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Identifier,
    Date,
    Invoice,
}

impl Role {
    /// Detection priority within a single column.
    pub const ALL: [Role; 3] = [Role::Identifier, Role::Date, Role::Invoice];

    pub fn matches(self, value: &str) -> bool {
        match self {
            Role::Identifier => identifier_pattern().is_match(value),
            Role::Date => parse_fuzzy_date(value).is_some(),
            Role::Invoice => invoice_pattern().is_match(value),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Identifier => "truck number",
            Role::Date => "date",
            Role::Invoice => "invoice",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    pub identifier: Option<ColumnId>,
    pub date: Option<ColumnId>,
    pub invoice: Option<ColumnId>,
}

impl RoleAssignment {
    pub fn get(&self, role: Role) -> Option<ColumnId> {
        match role {
            Role::Identifier => self.identifier,
            Role::Date => self.date,
            Role::Invoice => self.invoice,
        }
    }

    fn set(&mut self, role: Role, column: ColumnId) {
        let slot = match role {
            Role::Identifier => &mut self.identifier,
            Role::Date => &mut self.date,
            Role::Invoice => &mut self.invoice,
        };
        *slot = Some(column);
    }

    pub fn roles_of(&self, column: ColumnId) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.get(*role) == Some(column))
            .collect()
    }

    pub fn missing(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }
}

/// Detector hit counts for one column's sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnScore {
    pub column: ColumnId,
    pub sampled: usize,
    pub identifier_hits: usize,
    pub date_hits: usize,
    pub invoice_hits: usize,
    pub samples: Vec<String>,
}

impl ColumnScore {
    pub fn hits(&self, role: Role) -> usize {
        match role {
            Role::Identifier => self.identifier_hits,
            Role::Date => self.date_hits,
            Role::Invoice => self.invoice_hits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    pub assignment: RoleAssignment,
    pub columns: Vec<ColumnScore>,
}

pub fn classify(dataset: &TabularDataset, options: &ClassifyOptions) -> RoleAssignment {
    detect(dataset, options).assignment
}

/// Scores every column and picks one column per role.
pub fn detect(dataset: &TabularDataset, options: &ClassifyOptions) -> DetectionReport {
    let threshold = options.min_matches.max(1);
    let mut assignment = RoleAssignment::default();
    let mut columns = Vec::with_capacity(dataset.width());

    for column in dataset.columns() {
        let sample = dataset
            .non_empty_values(column)
            .take(options.sample_size)
            .collect::<Vec<_>>();
        let count = |role: Role| sample.iter().filter(|value| role.matches(value)).count();
        let score = ColumnScore {
            column,
            sampled: sample.len(),
            identifier_hits: count(Role::Identifier),
            date_hits: count(Role::Date),
            invoice_hits: count(Role::Invoice),
            samples: sample.iter().take(3).map(|value| value.to_string()).collect(),
        };
        debug!(
            "{column}: sampled {} value(s), identifier={} date={} invoice={}",
            score.sampled, score.identifier_hits, score.date_hits, score.invoice_hits
        );

        for role in Role::ALL {
            if assignment.get(role).is_some() {
                continue;
            }
            if options.exclusive_roles && !assignment.roles_of(column).is_empty() {
                continue;
            }
            if score.hits(role) >= threshold {
                assignment.set(role, column);
            }
        }
        columns.push(score);
    }

    DetectionReport {
        assignment,
        columns,
    }
}
