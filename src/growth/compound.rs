//! Compound interest with regular contributions

use serde::{Deserialize, Serialize};

use super::investment::InvestmentInput;
use crate::error::{CalcError, CalcResult};
use crate::frequency::{Frequency, PaymentTiming, PeriodsPerYear};
use crate::validation::Validator;

const ZERO_RATE_EPSILON: f64 = 1e-12;
const PERIOD_EPSILON: f64 = 1e-9;

/// Contributions made over `periods`, counting only whole periods
fn whole_periods(periods: f64) -> f64 {
    (periods + PERIOD_EPSILON).floor()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInput {
    pub principal: f64,
    /// Nominal annual rate in percent
    pub annual_rate: f64,
    pub years: f64,
    pub compounding: Frequency,
    /// Amount added each contribution period
    #[serde(default)]
    pub contribution: f64,
    /// Defaults to the compounding frequency; required for continuous compounding
    #[serde(default)]
    pub contribution_frequency: Option<Frequency>,
    #[serde(default)]
    pub timing: PaymentTiming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundResult {
    pub future_value: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    /// Number of periodic contributions over the horizon
    pub contribution_count: f64,
}

impl CompoundInput {
    pub fn new(principal: f64, annual_rate: f64, years: f64, compounding: Frequency) -> Self {
        Self {
            principal,
            annual_rate,
            years,
            compounding,
            contribution: 0.0,
            contribution_frequency: None,
            timing: PaymentTiming::End,
        }
    }

    pub fn with_contribution(mut self, amount: f64, frequency: Option<Frequency>, timing: PaymentTiming) -> Self {
        self.contribution = amount;
        self.contribution_frequency = frequency;
        self.timing = timing;
        self
    }

    fn validate(&self) -> CalcResult<()> {
        let mut v = Validator::new();
        v.non_negative("principal", self.principal)
            .non_negative("interest rate", self.annual_rate)
            .years("years", self.years)
            .non_negative("contribution", self.contribution);
        if let Some(freq) = self.contribution_frequency {
            v.check(!freq.is_continuous(), "contribution frequency cannot be continuous");
        }
        v.check(
            !(self.compounding.is_continuous()
                && self.contribution_frequency.is_none()
                && self.contribution != 0.0),
            "contribution frequency is required with continuous compounding",
        );
        v.finish()
    }

    pub fn calculate(&self) -> CalcResult<CompoundResult> {
        self.validate()?;

        match self.compounding.periods_per_year() {
            PeriodsPerYear::Continuous => self.continuous(),
            PeriodsPerYear::Discrete(n) => match self.contribution_frequency {
                Some(freq) if freq != self.compounding && self.contribution != 0.0 => {
                    self.per_contribution(freq)
                }
                // A horizon ending mid-period holds a partial period with no deposit
                _ if self.contribution != 0.0
                    && n as f64 * self.years - whole_periods(n as f64 * self.years) > PERIOD_EPSILON =>
                {
                    self.per_contribution(self.compounding)
                }
                _ => Ok(self.closed_form(n)),
            },
        }
    }

    /// `FV = P(1+r/n)^(nt) + PMT·[((1+r/n)^(nt) − 1)/(r/n)]·(1 + r/n if beginning)`
    fn closed_form(&self, n: u32) -> CompoundResult {
        let i = self.annual_rate / 100.0 / n as f64;
        let periods = n as f64 * self.years;
        let growth = (1.0 + i).powf(periods);

        let annuity = if i.abs() < ZERO_RATE_EPSILON {
            self.contribution * periods
        } else {
            self.contribution * (growth - 1.0) / i * (1.0 + i * self.timing.flag())
        };

        self.result(self.principal * growth + annuity, whole_periods(periods))
    }

    /// `FV = P·e^(rt) + PMT·(e^(rt) − 1)/(e^(r/m) − 1)`, beginning timing scales
    /// the contribution term by `e^(r/m)`. With `c = ⌊m·t⌋` deposits short of the
    /// horizon the annuity is `PMT·e^(r(t − c/m))·(e^(rc/m) − 1)/(e^(r/m) − 1)`.
    fn continuous(&self) -> CalcResult<CompoundResult> {
        let r = self.annual_rate / 100.0;
        let growth = (r * self.years).exp();

        let m = match self.contribution_frequency {
            Some(freq) => freq.discrete_periods("contribution")? as f64,
            // Validated: no contribution to schedule
            None => return Ok(self.result(self.principal * growth, 0.0)),
        };
        let count = whole_periods(m * self.years);

        let annuity = if r.abs() < ZERO_RATE_EPSILON {
            self.contribution * count
        } else {
            let step = (r / m).exp();
            let deposited = (r * count / m).exp();
            let carry = (r * (self.years - count / m)).exp();
            let base = self.contribution * carry * (deposited - 1.0) / (step - 1.0);
            if self.timing.is_beginning() {
                base * step
            } else {
                base
            }
        };

        Ok(self.result(self.principal * growth + annuity, count))
    }

    /// Mismatched discrete frequencies go through the per-contribution engine
    fn per_contribution(&self, frequency: Frequency) -> CalcResult<CompoundResult> {
        let m = frequency.discrete_periods("contribution")?;
        let engine = InvestmentInput::new(self.principal, self.annual_rate, self.years, self.compounding)
            .with_contribution(self.contribution, frequency)
            .with_timing(self.timing);
        let result = engine.calculate()?;

        if !result.end_balance.is_finite() {
            return Err(CalcError::domain("future value overflowed"));
        }

        let count = if self.contribution > 0.0 {
            (result.total_contributions - self.principal) / self.contribution
        } else {
            (m as f64 * self.years).floor()
        };

        Ok(CompoundResult {
            future_value: result.end_balance,
            total_contributions: result.total_contributions,
            total_interest: result.total_interest,
            contribution_count: count,
        })
    }

    fn result(&self, future_value: f64, contribution_count: f64) -> CompoundResult {
        let total_contributions = self.principal + self.contribution * contribution_count;
        CompoundResult {
            future_value,
            total_contributions,
            total_interest: future_value - total_contributions,
            contribution_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_principal_only() {
        let result = CompoundInput::new(10_000.0, 5.0, 10.0, Frequency::Annually)
            .calculate()
            .unwrap();
        assert_abs_diff_eq!(result.future_value, 16_288.95, epsilon = 0.01);
        assert_abs_diff_eq!(result.total_interest, 6_288.95, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_is_simple_sum() {
        for timing in [PaymentTiming::End, PaymentTiming::Beginning] {
            let result = CompoundInput::new(1_000.0, 0.0, 5.0, Frequency::Monthly)
                .with_contribution(50.0, None, timing)
                .calculate()
                .unwrap();
            assert_abs_diff_eq!(result.future_value, 1_000.0 + 50.0 * 60.0, epsilon = 1e-9);
            assert_abs_diff_eq!(result.total_interest, 0.0, epsilon = 1e-9);
        }

        let continuous = CompoundInput::new(1_000.0, 0.0, 5.0, Frequency::Continuous)
            .with_contribution(50.0, Some(Frequency::Monthly), PaymentTiming::End)
            .calculate()
            .unwrap();
        assert_abs_diff_eq!(continuous.future_value, 4_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_timing_monotonicity() {
        for compounding in [Frequency::Monthly, Frequency::Quarterly, Frequency::Continuous] {
            let make = |timing| {
                CompoundInput::new(2_000.0, 6.0, 8.0, compounding)
                    .with_contribution(100.0, Some(Frequency::Monthly), timing)
                    .calculate()
                    .unwrap()
                    .future_value
            };
            assert!(make(PaymentTiming::Beginning) > make(PaymentTiming::End));
        }
    }

    #[test]
    fn test_closed_form_annuity_due() {
        // 100/month at 6% for 1 year, beginning of period
        let result = CompoundInput::new(0.0, 6.0, 1.0, Frequency::Monthly)
            .with_contribution(100.0, None, PaymentTiming::Beginning)
            .calculate()
            .unwrap();
        let g = 1.005_f64.powi(12);
        assert_abs_diff_eq!(result.future_value, 100.0 * (g - 1.0) / 0.005 * 1.005, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution_count, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_continuous_with_contributions() {
        let result = CompoundInput::new(1_000.0, 5.0, 10.0, Frequency::Continuous)
            .with_contribution(100.0, Some(Frequency::Annually), PaymentTiming::End)
            .calculate()
            .unwrap();
        let growth = (0.5_f64).exp();
        let expected = 1_000.0 * growth + 100.0 * (growth - 1.0) / ((0.05_f64).exp() - 1.0);
        assert_abs_diff_eq!(result.future_value, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_mismatched_routes_to_engine() {
        let result = CompoundInput::new(0.0, 12.0, 1.0, Frequency::Annually)
            .with_contribution(100.0, Some(Frequency::Monthly), PaymentTiming::End)
            .calculate()
            .unwrap();
        assert_abs_diff_eq!(result.contribution_count, 12.0, epsilon = 1e-9);
        assert!(result.future_value > 1_200.0);
        assert!(result.future_value < 1_200.0 * 1.12);
    }

    #[test]
    fn test_continuous_requires_contribution_frequency() {
        let input = CompoundInput::new(1_000.0, 5.0, 1.0, Frequency::Continuous)
            .with_contribution(10.0, None, PaymentTiming::End);
        assert!(matches!(input.calculate(), Err(CalcError::InvalidInput(_))));
    }

    #[test]
    fn test_non_positive_horizon_rejected() {
        let input = CompoundInput::new(1_000.0, 5.0, -1.0, Frequency::Monthly);
        assert!(input.calculate().is_err());
    }

    #[test]
    fn test_huge_horizon_rejected() {
        let input = CompoundInput::new(1_000.0, 5.0, 1e9, Frequency::Annually)
            .with_contribution(10.0, Some(Frequency::Monthly), PaymentTiming::End);
        assert!(matches!(input.calculate(), Err(CalcError::InvalidInput(_))));
    }

    #[test]
    fn test_fractional_horizon_counts_whole_deposits() {
        let compound = CompoundInput::new(0.0, 10.0, 1.5, Frequency::Annually)
            .with_contribution(100.0, None, PaymentTiming::End)
            .calculate()
            .unwrap();
        let engine = InvestmentInput::new(0.0, 10.0, 1.5, Frequency::Annually)
            .with_contribution(100.0, Frequency::Annually)
            .calculate()
            .unwrap();

        assert_abs_diff_eq!(compound.contribution_count, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(compound.total_contributions, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compound.future_value, 100.0 * 1.1_f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(compound.future_value, engine.end_balance, epsilon = 1e-9);
        assert_abs_diff_eq!(compound.total_contributions, engine.total_contributions, epsilon = 1e-9);
    }

    #[test]
    fn test_fractional_horizon_continuous() {
        let result = CompoundInput::new(0.0, 5.0, 1.5, Frequency::Continuous)
            .with_contribution(100.0, Some(Frequency::Annually), PaymentTiming::End)
            .calculate()
            .unwrap();
        assert_abs_diff_eq!(result.contribution_count, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.future_value, 100.0 * (0.025_f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_principal_only_fractional_horizon() {
        let result = CompoundInput::new(1_000.0, 10.0, 1.5, Frequency::Annually)
            .calculate()
            .unwrap();
        assert_abs_diff_eq!(result.future_value, 1_000.0 * 1.1_f64.powf(1.5), epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_contributions, 1_000.0, epsilon = 1e-12);
    }
}
