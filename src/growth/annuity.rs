//! Annuity accumulation and payout

use serde::{Deserialize, Serialize};

use super::investment::{InvestmentInput, InvestmentResult};
use crate::amortization::{payment, payment_due};
use crate::error::CalcResult;
use crate::frequency::{equivalent_periodic_rate, Frequency, PaymentTiming};
use crate::validation::Validator;

/// Accumulation phase: a starting principal plus annual and monthly additions,
/// growing at an annual rate compounded once a year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuityInput {
    pub starting_principal: f64,
    #[serde(default)]
    pub annual_addition: f64,
    #[serde(default)]
    pub monthly_addition: f64,
    /// Annual growth rate in percent
    pub annual_growth_rate: f64,
    pub years: f64,
    #[serde(default)]
    pub timing: PaymentTiming,
}

impl AnnuityInput {
    pub fn calculate(&self) -> CalcResult<InvestmentResult> {
        InvestmentInput {
            initial: self.starting_principal,
            annual_rate: self.annual_growth_rate,
            years: self.years,
            compounding: Frequency::Annually,
            contributions: Vec::new(),
            timing: self.timing,
        }
        .with_contribution(self.annual_addition, Frequency::Annually)
        .with_contribution(self.monthly_addition, Frequency::Monthly)
        .calculate()
    }
}

/// Payout phase: the level payout a balance supports over a number of years
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuityPayoutInput {
    pub balance: f64,
    /// Annual rate in percent earned on the remaining balance
    pub annual_rate: f64,
    pub years: f64,
    #[serde(default = "default_payout_frequency")]
    pub frequency: Frequency,
    #[serde(default)]
    pub timing: PaymentTiming,
}

fn default_payout_frequency() -> Frequency {
    Frequency::Monthly
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnuityPayoutResult {
    pub payout: f64,
    pub payouts: u32,
    pub total_payout: f64,
    pub interest_earned: f64,
}

impl AnnuityPayoutInput {
    pub fn calculate(&self) -> CalcResult<AnnuityPayoutResult> {
        let mut v = Validator::new();
        v.non_negative("starting balance", self.balance)
            .non_negative("interest rate", self.annual_rate)
            .years("payout years", self.years);
        v.finish()?;

        let per_year = self.frequency.discrete_periods("payout")?;
        let mut v = Validator::new();
        v.periods("payouts", self.years * per_year as f64);
        v.finish()?;
        let payouts = (self.years * per_year as f64).round() as u32;
        let rate = equivalent_periodic_rate(self.annual_rate / 100.0, self.frequency, per_year);

        let payout = if self.timing.is_beginning() {
            payment_due(self.balance, rate, payouts)?
        } else {
            payment(self.balance, rate, payouts)?
        };
        let total_payout = payout * payouts as f64;

        Ok(AnnuityPayoutResult {
            payout,
            payouts,
            total_payout,
            interest_earned: total_payout - self.balance,
        })
    }
}
