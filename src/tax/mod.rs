//! Federal income tax tables and liability
//!
//! Tax tables are static reference data keyed by year. The built-in years
//! can be replaced or extended from CSV files without touching the
//! calculation code.

mod brackets;
mod liability;
pub mod loader;
mod tables;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

pub use brackets::{Bracket, BracketSchedule};
pub use liability::{ReturnIncome, TaxBreakdown};
pub use loader::{load_tax_tables, TaxTableError, DEFAULT_TAX_TABLE_PATH};
pub use tables::{ByStatus, ChildTaxCredit, TaxTable, TaxTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FilingStatus::Single => write!(f, "single"),
            FilingStatus::MarriedFilingJointly => write!(f, "married filing jointly"),
        }
    }
}

impl FromStr for FilingStatus {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "single" => Ok(FilingStatus::Single),
            "married_filing_jointly" | "mfj" | "joint" => Ok(FilingStatus::MarriedFilingJointly),
            other => Err(CalcError::invalid(format!("unknown filing status '{other}'"))),
        }
    }
}
