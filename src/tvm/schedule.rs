//! Period-by-period balance walk for a solved TVM problem

use serde::{Deserialize, Serialize};

use super::solver::TvmResult;
use crate::error::{CalcError, CalcResult};
use crate::validation::MAX_PERIODS;

/// Balance movement for one payment period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub period: u32,
    pub start_balance: f64,
    pub interest: f64,
    pub payment: f64,
    pub end_balance: f64,
}

impl TvmResult {
    /// Walk the balance from PV through each payment period.
    ///
    /// Only defined for a whole number of periods; the final balance equals
    /// `-FV` up to rounding.
    pub fn balance_schedule(&self) -> CalcResult<Vec<BalanceRow>> {
        let periods = self.n.round();
        if (self.n - periods).abs() > 1e-6 {
            return Err(CalcError::domain(format!(
                "balance schedule needs a whole number of periods, got N = {:.6}",
                self.n
            )));
        }

        if periods > MAX_PERIODS as f64 {
            return Err(CalcError::invalid(format!(
                "balance schedule cannot exceed {MAX_PERIODS} periods, got N = {periods}"
            )));
        }

        let periods = periods as u32;
        let i = self.periodic_rate;
        let mut balance = self.pv;
        let mut rows = Vec::with_capacity(periods as usize);

        for period in 1..=periods {
            let start_balance = balance;
            let interest = if self.timing.is_beginning() {
                (start_balance + self.pmt) * i
            } else {
                start_balance * i
            };
            balance = start_balance + interest + self.pmt;

            rows.push(BalanceRow {
                period,
                start_balance,
                interest,
                payment: self.pmt,
                end_balance: balance,
            });
        }

        Ok(rows)
    }
}
