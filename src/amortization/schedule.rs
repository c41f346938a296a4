//! Period-by-period amortization schedule

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::payment::payment;
use crate::error::{CalcError, CalcResult};
use crate::validation::MAX_PERIODS;

/// A single row of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period index
    pub period: u32,
    /// Payment date, when the schedule is anchored to a start date
    pub date: Option<NaiveDate>,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    /// Balance remaining after this period's payment
    pub balance: f64,
}

/// Complete amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: f64,
    pub periodic_rate: f64,
    /// Scheduled level payment (the final row may differ by rounding drift)
    pub payment: f64,
    pub rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    /// Generate the schedule for a fully amortizing level-payment loan.
    ///
    /// The last period pays off whatever balance remains, so the terminal
    /// balance is exactly zero.
    pub fn generate(principal: f64, periodic_rate: f64, periods: u32) -> CalcResult<Self> {
        if !principal.is_finite() {
            return Err(CalcError::invalid("principal must be a finite number"));
        }
        if periods > MAX_PERIODS {
            return Err(CalcError::invalid(format!("schedule cannot exceed {MAX_PERIODS} periods")));
        }
        let level_payment = payment(principal, periodic_rate, periods)?;

        let mut rows = Vec::with_capacity(periods as usize);
        let mut balance = principal;

        for period in 1..=periods {
            let interest = balance * periodic_rate;
            let (row_payment, principal_paid) = if period == periods {
                (balance + interest, balance)
            } else {
                (level_payment, level_payment - interest)
            };
            balance -= principal_paid;
            if period == periods {
                balance = 0.0;
            }

            rows.push(AmortizationRow {
                period,
                date: None,
                payment: row_payment,
                principal: principal_paid,
                interest,
                balance,
            });
        }

        log::debug!(
            "amortization schedule: principal={:.2} rate={} periods={} payment={:.4}",
            principal,
            periodic_rate,
            periods,
            level_payment
        );

        Ok(Self {
            principal,
            periodic_rate,
            payment: level_payment,
            rows,
        })
    }

    /// Attach a payment date to every row
    pub fn with_dates<F>(mut self, date_of_period: F) -> Self
    where
        F: Fn(u32) -> Option<NaiveDate>,
    {
        for row in &mut self.rows {
            row.date = date_of_period(row.period);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn totals(&self) -> ScheduleTotals {
        let total_payments: f64 = self.rows.iter().map(|r| r.payment).sum();
        let total_interest: f64 = self.rows.iter().map(|r| r.interest).sum();
        let total_principal: f64 = self.rows.iter().map(|r| r.principal).sum();

        ScheduleTotals {
            periods: self.rows.len() as u32,
            total_payments,
            total_interest,
            total_principal,
            final_balance: self.rows.last().map(|r| r.balance).unwrap_or(self.principal),
        }
    }

    /// Sum rows into calendar-year buckets of `periods_per_year` rows
    pub fn yearly(&self, periods_per_year: u32) -> Vec<ScheduleTotals> {
        if periods_per_year == 0 {
            return Vec::new();
        }
        self.rows
            .chunks(periods_per_year as usize)
            .map(|chunk| ScheduleTotals {
                periods: chunk.len() as u32,
                total_payments: chunk.iter().map(|r| r.payment).sum(),
                total_interest: chunk.iter().map(|r| r.interest).sum(),
                total_principal: chunk.iter().map(|r| r.principal).sum(),
                final_balance: chunk.last().map(|r| r.balance).unwrap_or(0.0),
            })
            .collect()
    }
}

/// Summary statistics for a schedule or a slice of one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub periods: u32,
    pub total_payments: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub final_balance: f64,
}
