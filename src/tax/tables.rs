//! Versioned federal tax tables
//!
//! Every figure a calculation needs for one tax year lives in a `TaxTable`;
//! `TaxTables` holds several years so a newer table can be swapped in without
//! touching the calculation code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::brackets::BracketSchedule;
use super::FilingStatus;
use crate::error::{CalcError, CalcResult};

/// A value that differs between filing statuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
}

impl<T> ByStatus<T> {
    pub fn get(&self, status: FilingStatus) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
        }
    }
}

/// Child tax credit and its income phase-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildTaxCredit {
    pub per_child: f64,
    /// Modified AGI above which the credit starts to shrink
    pub phase_out_threshold: ByStatus<f64>,
    /// Credit lost for each step (or part of a step) of income above the threshold
    pub reduction_per_step: f64,
    pub step: f64,
}

impl ChildTaxCredit {
    pub fn credit(&self, status: FilingStatus, income: f64, children: u32) -> f64 {
        let full = self.per_child * children as f64;
        let excess = income - *self.phase_out_threshold.get(status);
        if excess <= 0.0 {
            return full;
        }
        let steps = (excess / self.step).ceil();
        (full - steps * self.reduction_per_step).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTable {
    pub year: u16,
    pub ordinary: ByStatus<BracketSchedule>,
    pub capital_gains: ByStatus<BracketSchedule>,
    pub standard_deduction: ByStatus<f64>,
    pub child_tax_credit: ChildTaxCredit,
}

fn schedule(thresholds: &[(f64, f64)]) -> BracketSchedule {
    BracketSchedule::from_trusted(thresholds)
}

impl TaxTable {
    pub fn federal_2024() -> Self {
        Self {
            year: 2024,
            ordinary: ByStatus {
                single: schedule(&[
                    (0.0, 0.10),
                    (11_600.0, 0.12),
                    (47_150.0, 0.22),
                    (100_525.0, 0.24),
                    (191_950.0, 0.32),
                    (243_725.0, 0.35),
                    (609_350.0, 0.37),
                ]),
                married_filing_jointly: schedule(&[
                    (0.0, 0.10),
                    (23_200.0, 0.12),
                    (94_300.0, 0.22),
                    (201_050.0, 0.24),
                    (383_900.0, 0.32),
                    (487_450.0, 0.35),
                    (731_200.0, 0.37),
                ]),
            },
            capital_gains: ByStatus {
                single: schedule(&[(0.0, 0.0), (47_025.0, 0.15), (518_900.0, 0.20)]),
                married_filing_jointly: schedule(&[(0.0, 0.0), (94_050.0, 0.15), (583_750.0, 0.20)]),
            },
            standard_deduction: ByStatus { single: 14_600.0, married_filing_jointly: 29_200.0 },
            child_tax_credit: ChildTaxCredit {
                per_child: 2_000.0,
                phase_out_threshold: ByStatus { single: 200_000.0, married_filing_jointly: 400_000.0 },
                reduction_per_step: 50.0,
                step: 1_000.0,
            },
        }
    }

    pub fn federal_2025() -> Self {
        Self {
            year: 2025,
            ordinary: ByStatus {
                single: schedule(&[
                    (0.0, 0.10),
                    (11_925.0, 0.12),
                    (48_475.0, 0.22),
                    (103_350.0, 0.24),
                    (197_300.0, 0.32),
                    (250_525.0, 0.35),
                    (626_350.0, 0.37),
                ]),
                married_filing_jointly: schedule(&[
                    (0.0, 0.10),
                    (23_850.0, 0.12),
                    (96_950.0, 0.22),
                    (206_700.0, 0.24),
                    (394_600.0, 0.32),
                    (501_050.0, 0.35),
                    (751_600.0, 0.37),
                ]),
            },
            capital_gains: ByStatus {
                single: schedule(&[(0.0, 0.0), (48_350.0, 0.15), (533_400.0, 0.20)]),
                married_filing_jointly: schedule(&[(0.0, 0.0), (96_700.0, 0.15), (600_050.0, 0.20)]),
            },
            standard_deduction: ByStatus { single: 15_750.0, married_filing_jointly: 31_500.0 },
            child_tax_credit: ChildTaxCredit {
                per_child: 2_200.0,
                phase_out_threshold: ByStatus { single: 200_000.0, married_filing_jointly: 400_000.0 },
                reduction_per_step: 50.0,
                step: 1_000.0,
            },
        }
    }
}

/// Tax tables keyed by year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxTables {
    tables: BTreeMap<u16, TaxTable>,
}

impl TaxTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables compiled into the crate
    pub fn builtin() -> Self {
        let mut tables = Self::new();
        tables.insert(TaxTable::federal_2024());
        tables.insert(TaxTable::federal_2025());
        tables
    }

    /// Add or replace the table for its year
    pub fn insert(&mut self, table: TaxTable) -> Option<TaxTable> {
        self.tables.insert(table.year, table)
    }

    pub fn get(&self, year: u16) -> CalcResult<&TaxTable> {
        self.tables.get(&year).ok_or(CalcError::UnsupportedTaxYear(year))
    }

    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.tables.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_builtin_years() {
        let tables = TaxTables::builtin();
        assert_eq!(tables.years().collect::<Vec<_>>(), vec![2024, 2025]);
        assert_eq!(tables.get(1999).unwrap_err(), CalcError::UnsupportedTaxYear(1999));
    }

    #[test]
    fn test_builtin_schedules_well_formed() {
        for table in [TaxTable::federal_2024(), TaxTable::federal_2025()] {
            for schedule in [
                &table.ordinary.single,
                &table.ordinary.married_filing_jointly,
                &table.capital_gains.single,
                &table.capital_gains.married_filing_jointly,
            ] {
                assert!(BracketSchedule::new(schedule.brackets().to_vec()).is_ok(), "{}", table.year);
            }
        }
    }

    #[test]
    fn test_insert_replaces_year() {
        let mut tables = TaxTables::builtin();
        let mut custom = TaxTable::federal_2024();
        custom.standard_deduction.single = 15_000.0;
        assert!(tables.insert(custom).is_some());
        assert_abs_diff_eq!(tables.get(2024).unwrap().standard_deduction.single, 15_000.0);
    }

    #[test]
    fn test_child_credit_phase_out() {
        let ctc = TaxTable::federal_2024().child_tax_credit;
        assert_abs_diff_eq!(ctc.credit(FilingStatus::Single, 150_000.0, 2), 4_000.0);
        // 50,000 over: 50 steps of 50
        assert_abs_diff_eq!(ctc.credit(FilingStatus::Single, 250_000.0, 2), 1_500.0);
        // Part of a step counts as a full step
        assert_abs_diff_eq!(ctc.credit(FilingStatus::Single, 200_001.0, 1), 1_950.0);
        assert_abs_diff_eq!(ctc.credit(FilingStatus::MarriedFilingJointly, 250_000.0, 2), 4_000.0);
        assert_abs_diff_eq!(ctc.credit(FilingStatus::Single, 1_000_000.0, 3), 0.0);
    }
}
