//! Loan calculator: amount, rate and term to payment and dated schedule

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::schedule::{AmortizationSchedule, ScheduleTotals};
use crate::error::CalcResult;
use crate::frequency::{equivalent_periodic_rate, Frequency};
use crate::validation::Validator;

/// Loan terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub amount: f64,
    /// Nominal annual rate in percent
    pub annual_rate: f64,
    pub term_years: f64,
    #[serde(default = "default_frequency")]
    pub payment_frequency: Frequency,
    /// Compounding frequency; defaults to the payment frequency
    #[serde(default)]
    pub compounding: Option<Frequency>,
    #[serde(default)]
    pub first_payment_date: Option<NaiveDate>,
}

fn default_frequency() -> Frequency {
    Frequency::Monthly
}

/// Loan calculation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanResult {
    pub payment: f64,
    pub periods: u32,
    pub payments_per_year: u32,
    pub periodic_rate: f64,
    pub total_payments: f64,
    pub total_interest: f64,
    pub payoff_date: Option<NaiveDate>,
    pub schedule: AmortizationSchedule,
}

impl LoanInput {
    pub fn new(amount: f64, annual_rate: f64, term_years: f64) -> Self {
        Self {
            amount,
            annual_rate,
            term_years,
            payment_frequency: Frequency::Monthly,
            compounding: None,
            first_payment_date: None,
        }
    }

    pub fn calculate(&self) -> CalcResult<LoanResult> {
        let mut v = Validator::new();
        v.non_negative("loan amount", self.amount)
            .non_negative("interest rate", self.annual_rate)
            .years("loan term", self.term_years);
        v.finish()?;

        let per_year = self.payment_frequency.discrete_periods("payment")?;
        let mut v = Validator::new();
        v.periods("loan payments", self.term_years * per_year as f64);
        v.finish()?;

        let periods = (self.term_years * per_year as f64).round() as u32;
        let mut v = Validator::new();
        v.check(periods >= 1, "loan term is shorter than one payment period");
        v.finish()?;

        let compounding = self.compounding.unwrap_or(self.payment_frequency);
        let periodic_rate = equivalent_periodic_rate(self.annual_rate / 100.0, compounding, per_year);

        let mut schedule = AmortizationSchedule::generate(self.amount, periodic_rate, periods)?;
        if let Some(start) = self.first_payment_date {
            let frequency = self.payment_frequency;
            schedule = schedule.with_dates(|period| payment_date(start, frequency, period));
        }

        let ScheduleTotals {
            total_payments,
            total_interest,
            ..
        } = schedule.totals();
        let payoff_date = schedule.rows.last().and_then(|r| r.date);

        Ok(LoanResult {
            payment: schedule.payment,
            periods,
            payments_per_year: per_year,
            periodic_rate,
            total_payments,
            total_interest,
            payoff_date,
            schedule,
        })
    }
}

impl LoanResult {
    /// Payment, interest and principal totals for each loan year
    pub fn yearly(&self) -> Vec<ScheduleTotals> {
        self.schedule.yearly(self.payments_per_year)
    }
}

/// Date of the `period`-th payment (1-based) given the first payment date
pub(crate) fn payment_date(first: NaiveDate, frequency: Frequency, period: u32) -> Option<NaiveDate> {
    let k = period.checked_sub(1)?;
    match frequency {
        Frequency::Daily | Frequency::Continuous => first.checked_add_days(Days::new(k as u64)),
        Frequency::Weekly => first.checked_add_days(Days::new(7 * k as u64)),
        Frequency::Biweekly => first.checked_add_days(Days::new(14 * k as u64)),
        Frequency::Semimonthly => {
            let base = first.checked_add_months(Months::new(k / 2))?;
            if k % 2 == 1 {
                base.checked_add_days(Days::new(15))
            } else {
                Some(base)
            }
        }
        Frequency::Monthly => first.checked_add_months(Months::new(k)),
        Frequency::Quarterly => first.checked_add_months(Months::new(3 * k)),
        Frequency::Semiannually => first.checked_add_months(Months::new(6 * k)),
        Frequency::Annually => first.checked_add_months(Months::new(12 * k)),
    }
}
