//! Investment growth engine
//!
//! Contributions and compounding run on independent frequencies. Each
//! contribution is compounded individually from the moment it is made to the
//! end of the year, so a weekly deposit into a quarterly-compounding account is
//! priced exactly instead of being forced onto the compounding grid.

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::frequency::{growth_factor, Frequency, PaymentTiming, PeriodsPerYear};
use crate::validation::Validator;

/// Tolerance when counting contributions that fit in a partial year
const PERIOD_EPSILON: f64 = 1e-9;

/// A recurring contribution stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub amount: f64,
    pub frequency: Frequency,
}

impl Contribution {
    pub fn new(amount: f64, frequency: Frequency) -> Self {
        Self { amount, frequency }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentInput {
    pub initial: f64,
    /// Nominal annual rate in percent
    pub annual_rate: f64,
    /// Horizon in years; a fractional tail becomes a final partial year
    pub years: f64,
    pub compounding: Frequency,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    #[serde(default)]
    pub timing: PaymentTiming,
}

/// One year of the growth breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    /// 1-based year index
    pub year: u32,
    /// Fraction of a year covered (1.0 except possibly the last row)
    pub span: f64,
    pub start_balance: f64,
    pub contributions: f64,
    pub interest: f64,
    pub end_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub end_balance: f64,
    /// Initial amount plus every contribution
    pub total_contributions: f64,
    pub total_interest: f64,
    pub breakdown: Vec<YearRow>,
}

impl InvestmentInput {
    pub fn new(initial: f64, annual_rate: f64, years: f64, compounding: Frequency) -> Self {
        Self {
            initial,
            annual_rate,
            years,
            compounding,
            contributions: Vec::new(),
            timing: PaymentTiming::End,
        }
    }

    pub fn with_contribution(mut self, amount: f64, frequency: Frequency) -> Self {
        self.contributions.push(Contribution::new(amount, frequency));
        self
    }

    pub fn with_timing(mut self, timing: PaymentTiming) -> Self {
        self.timing = timing;
        self
    }

    fn validate(&self) -> CalcResult<()> {
        let mut v = Validator::new();
        v.non_negative("initial amount", self.initial)
            .finite("interest rate", self.annual_rate)
            .years("years", self.years);

        if let PeriodsPerYear::Discrete(m) = self.compounding.periods_per_year() {
            v.check(
                self.annual_rate / 100.0 / m as f64 > -1.0,
                "interest rate per compounding period must be greater than -100%",
            );
        }
        for (idx, c) in self.contributions.iter().enumerate() {
            v.non_negative(&format!("contribution {} amount", idx + 1), c.amount);
            v.check(
                !c.frequency.is_continuous(),
                format!("contribution {} frequency cannot be continuous", idx + 1),
            );
        }
        v.finish()
    }

    pub fn calculate(&self) -> CalcResult<InvestmentResult> {
        self.validate()?;

        let rate = self.annual_rate / 100.0;
        let whole_years = self.years.floor() as u32;
        let tail = self.years - whole_years as f64;

        let mut spans: Vec<f64> = vec![1.0; whole_years as usize];
        if tail > PERIOD_EPSILON {
            spans.push(tail);
        }

        let mut balance = self.initial;
        let mut total_contributions = self.initial;
        let mut breakdown = Vec::with_capacity(spans.len());

        for (idx, &span) in spans.iter().enumerate() {
            let start_balance = balance;
            let mut contributed = 0.0;
            let mut end_balance = start_balance * growth_factor(rate, self.compounding, span);

            for stream in &self.contributions {
                let (count, value) = self.stream_value(stream, rate, span);
                contributed += stream.amount * count as f64;
                end_balance += value;
            }

            breakdown.push(YearRow {
                year: idx as u32 + 1,
                span,
                start_balance,
                contributions: contributed,
                interest: end_balance - start_balance - contributed,
                end_balance,
            });

            total_contributions += contributed;
            balance = end_balance;
        }

        log::debug!(
            "investment: years={} compounding={} streams={} end_balance={:.2}",
            self.years,
            self.compounding,
            self.contributions.len(),
            balance
        );

        Ok(InvestmentResult {
            end_balance: balance,
            total_contributions,
            total_interest: balance - total_contributions,
            breakdown,
        })
    }

    /// Number of contributions made in a span and their value at the span's end
    fn stream_value(&self, stream: &Contribution, rate: f64, span: f64) -> (u32, f64) {
        let m = match stream.frequency.periods_per_year() {
            PeriodsPerYear::Discrete(m) => m as f64,
            PeriodsPerYear::Continuous => return (0, 0.0),
        };
        let count = (m * span + PERIOD_EPSILON).floor() as u32;
        let offset = if self.timing.is_beginning() { 0.0 } else { 1.0 };

        let value = (0..count)
            .map(|k| {
                let made_at = (k as f64 + offset) / m;
                let remaining = (span - made_at).max(0.0);
                stream.amount * growth_factor(rate, self.compounding, remaining)
            })
            .sum();

        (count, value)
    }
}
