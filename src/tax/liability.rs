//! Federal income tax for one return

use serde::{Deserialize, Serialize};

use super::tables::TaxTable;
use super::FilingStatus;

/// Income reported on one return
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnIncome {
    pub wages: f64,
    /// Long-term capital gains and qualified dividends
    pub capital_gains: f64,
    pub children: u32,
}

impl ReturnIncome {
    pub fn gross(&self) -> f64 {
        self.wages + self.capital_gains
    }

    /// Combine two filers' income onto a joint return
    pub fn combine(&self, other: &ReturnIncome) -> ReturnIncome {
        ReturnIncome {
            wages: self.wages + other.wages,
            capital_gains: self.capital_gains + other.capital_gains,
            children: self.children + other.children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub filing_status: FilingStatus,
    pub gross_income: f64,
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub ordinary_tax: f64,
    pub capital_gains_tax: f64,
    /// Child tax credit actually applied, capped at the tax before credits
    pub child_tax_credit: f64,
    pub total_tax: f64,
    /// Total tax as a percent of gross income
    pub effective_rate: f64,
    /// Ordinary marginal rate in percent
    pub marginal_rate: f64,
}

impl TaxTable {
    /// Tax on one return.
    ///
    /// The standard deduction comes off ordinary income first; capital gains
    /// are stacked on top of the remaining ordinary income and taxed at the
    /// capital gains rates for that slice.
    pub fn liability(&self, status: FilingStatus, income: &ReturnIncome) -> TaxBreakdown {
        let gross_income = income.gross();
        let standard_deduction = *self.standard_deduction.get(status);
        let taxable_income = (gross_income - standard_deduction).max(0.0);
        let taxable_gains = income.capital_gains.min(taxable_income);
        let taxable_ordinary = taxable_income - taxable_gains;

        let ordinary_tax = self.ordinary.get(status).tax(taxable_ordinary);
        let capital_gains_tax = self
            .capital_gains
            .get(status)
            .tax_between(taxable_ordinary, taxable_income);
        let before_credits = ordinary_tax + capital_gains_tax;

        let child_tax_credit = self
            .child_tax_credit
            .credit(status, gross_income, income.children)
            .min(before_credits);
        let total_tax = before_credits - child_tax_credit;

        TaxBreakdown {
            filing_status: status,
            gross_income,
            standard_deduction,
            taxable_income,
            ordinary_tax,
            capital_gains_tax,
            child_tax_credit,
            total_tax,
            effective_rate: if gross_income > 0.0 { total_tax / gross_income * 100.0 } else { 0.0 },
            marginal_rate: self.ordinary.get(status).marginal_rate(taxable_ordinary) * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn wages(amount: f64) -> ReturnIncome {
        ReturnIncome { wages: amount, ..Default::default() }
    }

    #[test]
    fn test_single_wage_earner() {
        let table = TaxTable::federal_2024();
        let result = table.liability(FilingStatus::Single, &wages(100_000.0));

        assert_abs_diff_eq!(result.taxable_income, 85_400.0, epsilon = 1e-9);
        // 1,160 + 4,266 + 38,250 at 22%
        assert_abs_diff_eq!(result.total_tax, 13_841.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.marginal_rate, 22.0, epsilon = 1e-9);
    }

    #[test]
    fn test_income_below_deduction() {
        let table = TaxTable::federal_2024();
        let result = table.liability(FilingStatus::Single, &wages(10_000.0));
        assert_abs_diff_eq!(result.taxable_income, 0.0);
        assert_abs_diff_eq!(result.total_tax, 0.0);
    }

    #[test]
    fn test_capital_gains_stack_on_ordinary_income() {
        let table = TaxTable::federal_2024();
        let income = ReturnIncome { wages: 54_600.0, capital_gains: 20_000.0, children: 0 };
        let result = table.liability(FilingStatus::Single, &income);

        // 40,000 ordinary; gains fill 40,000..47,025 at 0% and the rest at 15%
        assert_abs_diff_eq!(result.ordinary_tax, 4_568.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.capital_gains_tax, 12_975.0 * 0.15, epsilon = 1e-6);
    }

    #[test]
    fn test_deduction_absorbed_by_gains_when_wages_are_low() {
        let table = TaxTable::federal_2024();
        let income = ReturnIncome { wages: 4_600.0, capital_gains: 30_000.0, children: 0 };
        let result = table.liability(FilingStatus::Single, &income);

        assert_abs_diff_eq!(result.taxable_income, 20_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.ordinary_tax, 0.0);
        assert_abs_diff_eq!(result.capital_gains_tax, 0.0);
    }

    #[test]
    fn test_child_credit_capped_at_tax() {
        let table = TaxTable::federal_2024();
        let income = ReturnIncome { wages: 20_000.0, capital_gains: 0.0, children: 3 };
        let result = table.liability(FilingStatus::Single, &income);

        // 5,400 taxable at 10%
        assert_abs_diff_eq!(result.child_tax_credit, 540.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_tax, 0.0, epsilon = 1e-9);
    }
}
