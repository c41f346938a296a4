//! Payment and compounding frequencies, timing, and rate conversions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// How often a payment, contribution or compounding event occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
    Quarterly,
    Semiannually,
    Annually,
    Continuous,
}

/// Number of periods in a year for a frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodsPerYear {
    Discrete(u32),
    /// Routed to the exponential growth formula `e^(rt)`
    Continuous,
}

impl Frequency {
    pub const ALL: [Frequency; 9] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Semimonthly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Semiannually,
        Frequency::Annually,
        Frequency::Continuous,
    ];

    pub fn periods_per_year(self) -> PeriodsPerYear {
        match self {
            Frequency::Daily => PeriodsPerYear::Discrete(365),
            Frequency::Weekly => PeriodsPerYear::Discrete(52),
            Frequency::Biweekly => PeriodsPerYear::Discrete(26),
            Frequency::Semimonthly => PeriodsPerYear::Discrete(24),
            Frequency::Monthly => PeriodsPerYear::Discrete(12),
            Frequency::Quarterly => PeriodsPerYear::Discrete(4),
            Frequency::Semiannually => PeriodsPerYear::Discrete(2),
            Frequency::Annually => PeriodsPerYear::Discrete(1),
            Frequency::Continuous => PeriodsPerYear::Continuous,
        }
    }

    /// Periods per year, or an invalid-input error for continuous frequency.
    ///
    /// Payments and contributions are always discrete events.
    pub fn discrete_periods(self, what: &str) -> CalcResult<u32> {
        match self.periods_per_year() {
            PeriodsPerYear::Discrete(n) => Ok(n),
            PeriodsPerYear::Continuous => Err(CalcError::invalid(format!(
                "{what} frequency cannot be continuous"
            ))),
        }
    }

    pub fn is_continuous(self) -> bool {
        self == Frequency::Continuous
    }

    pub fn name(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Semimonthly => "semimonthly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Semiannually => "semiannually",
            Frequency::Annually => "annually",
            Frequency::Continuous => "continuous",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Frequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();

        match normalized.as_str() {
            "daily" | "day" => Ok(Frequency::Daily),
            "weekly" | "week" => Ok(Frequency::Weekly),
            "biweekly" | "fortnightly" => Ok(Frequency::Biweekly),
            "semimonthly" | "twicemonthly" => Ok(Frequency::Semimonthly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            "quarterly" | "quarter" => Ok(Frequency::Quarterly),
            "semiannually" | "semiannual" | "halfyearly" => Ok(Frequency::Semiannually),
            "annually" | "annual" | "yearly" | "year" => Ok(Frequency::Annually),
            "continuous" | "continuously" => Ok(Frequency::Continuous),
            _ => Err(CalcError::UnknownFrequency(s.to_string())),
        }
    }
}

/// Whether payments fall at the beginning (annuity due) or end (ordinary annuity) of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTiming {
    Beginning,
    #[default]
    End,
}

impl PaymentTiming {
    pub fn is_beginning(self) -> bool {
        self == PaymentTiming::Beginning
    }

    /// The `b` flag in the annuity factor `(1 + i·b)`
    pub fn flag(self) -> f64 {
        match self {
            PaymentTiming::Beginning => 1.0,
            PaymentTiming::End => 0.0,
        }
    }
}

impl fmt::Display for PaymentTiming {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PaymentTiming::Beginning => write!(f, "beginning"),
            PaymentTiming::End => write!(f, "end"),
        }
    }
}

impl FromStr for PaymentTiming {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginning" | "begin" | "start" | "due" | "bgn" => Ok(PaymentTiming::Beginning),
            "end" | "ordinary" => Ok(PaymentTiming::End),
            other => Err(CalcError::invalid(format!(
                "unknown payment timing '{other}' (expected beginning or end)"
            ))),
        }
    }
}

/// Growth factor of one unit over `years` at a nominal annual rate (decimal).
///
/// Discrete compounding uses `(1 + r/m)^(m·t)` with a real exponent, so a span
/// that does not align with compounding boundaries is still priced exactly.
pub fn growth_factor(annual_rate: f64, compounding: Frequency, years: f64) -> f64 {
    match compounding.periods_per_year() {
        PeriodsPerYear::Discrete(m) => {
            let m = m as f64;
            (1.0 + annual_rate / m).powf(m * years)
        }
        PeriodsPerYear::Continuous => (annual_rate * years).exp(),
    }
}

/// Effective rate per payment period equivalent to a nominal annual rate
/// compounded at `compounding`, for `payments_per_year` payments.
pub fn equivalent_periodic_rate(annual_rate: f64, compounding: Frequency, payments_per_year: u32) -> f64 {
    growth_factor(annual_rate, compounding, 1.0 / payments_per_year as f64) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_periods_per_year_table() {
        let expected = [365, 52, 26, 24, 12, 4, 2, 1];
        for (freq, n) in Frequency::ALL.iter().zip(expected.iter()) {
            assert_eq!(freq.periods_per_year(), PeriodsPerYear::Discrete(*n));
        }
        assert_eq!(Frequency::Continuous.periods_per_year(), PeriodsPerYear::Continuous);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Semi-Monthly".parse::<Frequency>().unwrap(), Frequency::Semimonthly);
        assert_eq!("semiannual".parse::<Frequency>().unwrap(), Frequency::Semiannually);
        assert_eq!("yearly".parse::<Frequency>().unwrap(), Frequency::Annually);
        assert_eq!("bi_weekly".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert!(matches!(
            "hourly".parse::<Frequency>(),
            Err(CalcError::UnknownFrequency(_))
        ));
    }

    #[test]
    fn test_continuous_not_discrete() {
        assert!(Frequency::Continuous.discrete_periods("contribution").is_err());
        assert_eq!(Frequency::Monthly.discrete_periods("payment").unwrap(), 12);
    }

    #[test]
    fn test_growth_factor() {
        assert_relative_eq!(growth_factor(0.12, Frequency::Monthly, 1.0), 1.01_f64.powi(12), epsilon = 1e-12);
        assert_relative_eq!(growth_factor(0.05, Frequency::Continuous, 2.0), (0.1_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_equivalent_periodic_rate() {
        // 12% compounded monthly, paid quarterly: (1.01)^3 - 1
        let i = equivalent_periodic_rate(0.12, Frequency::Monthly, 4);
        assert_relative_eq!(i, 1.01_f64.powi(3) - 1.0, epsilon = 1e-12);

        // Matching frequencies reduce to r / m
        let i = equivalent_periodic_rate(0.06, Frequency::Monthly, 12);
        assert_relative_eq!(i, 0.005, epsilon = 1e-12);
    }

    #[test]
    fn test_timing_parse_and_flag() {
        assert_eq!("BGN".parse::<PaymentTiming>().unwrap(), PaymentTiming::Beginning);
        assert_eq!(PaymentTiming::default(), PaymentTiming::End);
        assert_eq!(PaymentTiming::Beginning.flag(), 1.0);
        assert!("middle".parse::<PaymentTiming>().is_err());
    }
}
