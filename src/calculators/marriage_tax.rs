//! Marriage penalty or bonus
//!
//! Compares the federal tax two people owe filing separately as single
//! filers with the tax they owe on one joint return.

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::tax::{FilingStatus, ReturnIncome, TaxBreakdown, TaxTable, TaxTables};
use crate::validation::Validator;

fn default_year() -> u16 {
    2024
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Filer {
    pub wages: f64,
    #[serde(default)]
    pub capital_gains: f64,
    #[serde(default)]
    pub children: u32,
}

impl From<&Filer> for ReturnIncome {
    fn from(filer: &Filer) -> Self {
        ReturnIncome { wages: filer.wages, capital_gains: filer.capital_gains, children: filer.children }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarriageTaxInput {
    #[serde(default = "default_year")]
    pub year: u16,
    pub first: Filer,
    pub second: Filer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarriageOutcome {
    Penalty,
    Bonus,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarriageTaxResult {
    pub year: u16,
    pub first: TaxBreakdown,
    pub second: TaxBreakdown,
    pub separate_total: f64,
    pub joint: TaxBreakdown,
    /// Joint tax minus the two single returns: positive is a penalty,
    /// negative a bonus
    pub difference: f64,
    pub outcome: MarriageOutcome,
}

impl MarriageTaxInput {
    fn validate(&self) -> CalcResult<()> {
        let mut v = Validator::new();
        v.non_negative("first filer wages", self.first.wages)
            .non_negative("first filer capital gains", self.first.capital_gains)
            .non_negative("second filer wages", self.second.wages)
            .non_negative("second filer capital gains", self.second.capital_gains);
        v.finish()
    }

    /// Look up the table for `self.year` and compare
    pub fn calculate(&self, tables: &TaxTables) -> CalcResult<MarriageTaxResult> {
        self.calculate_with(tables.get(self.year)?)
    }

    /// Compare using an explicit table, ignoring `self.year`
    pub fn calculate_with(&self, table: &TaxTable) -> CalcResult<MarriageTaxResult> {
        self.validate()?;

        let first_income = ReturnIncome::from(&self.first);
        let second_income = ReturnIncome::from(&self.second);

        let first = table.liability(FilingStatus::Single, &first_income);
        let second = table.liability(FilingStatus::Single, &second_income);
        let joint = table.liability(
            FilingStatus::MarriedFilingJointly,
            &first_income.combine(&second_income),
        );

        let separate_total = first.total_tax + second.total_tax;
        let difference = joint.total_tax - separate_total;
        let outcome = if difference.abs() < 0.005 {
            MarriageOutcome::Neutral
        } else if difference > 0.0 {
            MarriageOutcome::Penalty
        } else {
            MarriageOutcome::Bonus
        };

        log::debug!(
            "marriage tax {}: separate {:.2}, joint {:.2}",
            table.year,
            separate_total,
            joint.total_tax
        );

        Ok(MarriageTaxResult {
            year: table.year,
            first,
            second,
            separate_total,
            joint,
            difference,
            outcome,
        })
    }
}
