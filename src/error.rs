//! Typed failures raised by the comparison core.
//!
//! Only conditions that make a run impossible surface here. Per-value parse
//! failures are modelled as `Option` outcomes inside the core instead.

use std::fmt;

use thiserror::Error;

/// Which ledger a dataset or record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Main,
    Bill,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Main => "main",
            Side::Bill => "bill",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("could not detect truck number column in {side} data")]
    MissingIdentifier { side: Side },
    #[error("no readable rows were found in {side} inputs")]
    NoData { side: Side },
}
