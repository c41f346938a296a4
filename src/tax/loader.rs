//! CSV-based tax table loader
//!
//! Loads tax tables from `data/tax/<year>/`, one directory per tax year:
//!
//! - `brackets.csv`: `filing_status,lower,rate`
//! - `capital_gains.csv`: `filing_status,lower,rate`
//! - `deductions.csv`: `filing_status,standard_deduction`
//! - `child_tax_credit.csv`: `per_child,reduction_per_step,step,single_threshold,joint_threshold`
//!
//! Rates are fractions. Brackets for a status are listed in ascending order.

use std::fmt::Display;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::StringRecord;
use thiserror::Error;

use super::brackets::BracketSchedule;
use super::tables::{ByStatus, ChildTaxCredit, TaxTable, TaxTables};
use super::FilingStatus;
use crate::error::CalcError;

/// Default path to the tax table directory
pub const DEFAULT_TAX_TABLE_PATH: &str = "data/tax";

#[derive(Debug, Error)]
pub enum TaxTableError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .file.display())]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} line {line}: {message}", .file.display())]
    Parse { file: PathBuf, line: u64, message: String },

    #[error("{}: {source}", .file.display())]
    Invalid {
        file: PathBuf,
        #[source]
        source: CalcError,
    },

    #[error("{} has no rows for {status}", .file.display())]
    MissingStatus { file: PathBuf, status: FilingStatus },
}

fn open(path: &Path) -> Result<csv::Reader<File>, TaxTableError> {
    let file = File::open(path).map_err(|source| TaxTableError::Io { path: path.to_path_buf(), source })?;
    Ok(csv::Reader::from_reader(file))
}

fn records(path: &Path) -> Result<Vec<StringRecord>, TaxTableError> {
    open(path)?
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TaxTableError::Csv { file: path.to_path_buf(), source })
}

fn field<T>(path: &Path, record: &StringRecord, index: usize) -> Result<T, TaxTableError>
where
    T: FromStr,
    T::Err: Display,
{
    let line = record.position().map_or(0, |p| p.line());
    let raw = record.get(index).ok_or_else(|| TaxTableError::Parse {
        file: path.to_path_buf(),
        line,
        message: format!("missing column {}", index + 1),
    })?;
    raw.trim().parse().map_err(|e: T::Err| TaxTableError::Parse {
        file: path.to_path_buf(),
        line,
        message: format!("'{raw}': {e}"),
    })
}

/// Load a bracket file with one schedule per filing status
pub fn load_schedules(path: &Path) -> Result<ByStatus<BracketSchedule>, TaxTableError> {
    let mut single = Vec::new();
    let mut joint = Vec::new();

    for record in records(path)? {
        let status: FilingStatus = field(path, &record, 0)?;
        let lower: f64 = field(path, &record, 1)?;
        let rate: f64 = field(path, &record, 2)?;
        match status {
            FilingStatus::Single => single.push((lower, rate)),
            FilingStatus::MarriedFilingJointly => joint.push((lower, rate)),
        }
    }

    let build = |thresholds: &[(f64, f64)], status: FilingStatus| {
        if thresholds.is_empty() {
            return Err(TaxTableError::MissingStatus { file: path.to_path_buf(), status });
        }
        BracketSchedule::from_thresholds(thresholds)
            .map_err(|source| TaxTableError::Invalid { file: path.to_path_buf(), source })
    };

    Ok(ByStatus {
        single: build(&single, FilingStatus::Single)?,
        married_filing_jointly: build(&joint, FilingStatus::MarriedFilingJointly)?,
    })
}

/// Load standard deductions by filing status
pub fn load_deductions(path: &Path) -> Result<ByStatus<f64>, TaxTableError> {
    let mut single = None;
    let mut joint = None;

    for record in records(path)? {
        let status: FilingStatus = field(path, &record, 0)?;
        let amount: f64 = field(path, &record, 1)?;
        match status {
            FilingStatus::Single => single = Some(amount),
            FilingStatus::MarriedFilingJointly => joint = Some(amount),
        }
    }

    let missing = |status: FilingStatus| TaxTableError::MissingStatus { file: path.to_path_buf(), status };
    Ok(ByStatus {
        single: single.ok_or_else(|| missing(FilingStatus::Single))?,
        married_filing_jointly: joint.ok_or_else(|| missing(FilingStatus::MarriedFilingJointly))?,
    })
}

/// Load the child tax credit parameters from the first row
pub fn load_child_tax_credit(path: &Path) -> Result<ChildTaxCredit, TaxTableError> {
    let rows = records(path)?;
    let record = rows.first().ok_or_else(|| TaxTableError::Parse {
        file: path.to_path_buf(),
        line: 1,
        message: "no data rows".to_string(),
    })?;

    let credit = ChildTaxCredit {
        per_child: field(path, record, 0)?,
        reduction_per_step: field(path, record, 1)?,
        step: field(path, record, 2)?,
        phase_out_threshold: ByStatus {
            single: field(path, record, 3)?,
            married_filing_jointly: field(path, record, 4)?,
        },
    };
    if !(credit.step > 0.0) {
        return Err(TaxTableError::Invalid {
            file: path.to_path_buf(),
            source: CalcError::invalid("phase-out step must be greater than zero"),
        });
    }
    Ok(credit)
}

/// Load one year's table from `dir`, which holds the four CSV files
pub fn load_tax_table(dir: &Path, year: u16) -> Result<TaxTable, TaxTableError> {
    Ok(TaxTable {
        year,
        ordinary: load_schedules(&dir.join("brackets.csv"))?,
        capital_gains: load_schedules(&dir.join("capital_gains.csv"))?,
        standard_deduction: load_deductions(&dir.join("deductions.csv"))?,
        child_tax_credit: load_child_tax_credit(&dir.join("child_tax_credit.csv"))?,
    })
}

/// Load every `<year>/` subdirectory of `path` over the built-in tables.
///
/// A loaded year replaces the built-in table for the same year. Entries whose
/// names are not years are ignored.
pub fn load_tax_tables(path: &Path) -> Result<TaxTables, TaxTableError> {
    let mut tables = TaxTables::builtin();
    let io_err = |source| TaxTableError::Io { path: path.to_path_buf(), source };

    let mut years = Vec::new();
    for entry in fs::read_dir(path).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let year = entry.file_name().to_str().and_then(|name| name.parse::<u16>().ok());
        if let Some(year) = year {
            if entry.path().is_dir() {
                years.push((year, entry.path()));
            }
        }
    }
    years.sort();

    for (year, dir) in years {
        log::debug!("loading tax table {} from {}", year, dir.display());
        if tables.insert(load_tax_table(&dir, year)?).is_some() {
            log::info!("tax table {} overrides the built-in table", year);
        }
    }

    Ok(tables)
}
