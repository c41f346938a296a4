//! Return on investment
//!
//! `gain = returned − invested`, `roi = gain / invested`. Any two of the four
//! values determine the others; an optional holding period adds the
//! annualized return.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::validation::Validator;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "given", rename_all = "snake_case")]
pub enum RoiInput {
    InvestedReturned { invested: f64, returned: f64 },
    InvestedGain { invested: f64, gain: f64 },
    InvestedRoi { invested: f64, roi: f64 },
    ReturnedGain { returned: f64, gain: f64 },
    ReturnedRoi { returned: f64, roi: f64 },
    GainRoi { gain: f64, roi: f64 },
}

/// Holding period used to annualize the return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingPeriod {
    Years(f64),
    Dates { start: NaiveDate, end: NaiveDate },
}

impl HoldingPeriod {
    pub fn years(&self) -> CalcResult<f64> {
        let years = match *self {
            HoldingPeriod::Years(years) => years,
            HoldingPeriod::Dates { start, end } => (end - start).num_days() as f64 / DAYS_PER_YEAR,
        };
        if !(years > 0.0) || !years.is_finite() {
            return Err(CalcError::invalid("investment period must be longer than zero"));
        }
        Ok(years)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub invested: f64,
    pub returned: f64,
    pub gain: f64,
    /// Total return in percent
    pub roi: f64,
    /// Compound annual return in percent, when a holding period was given
    pub annualized_roi: Option<f64>,
    pub years: Option<f64>,
}

/// Optional-field form of the inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoiRequest {
    pub invested: Option<f64>,
    pub returned: Option<f64>,
    pub gain: Option<f64>,
    pub roi: Option<f64>,
    #[serde(default)]
    pub period: Option<HoldingPeriod>,
}

impl RoiRequest {
    pub fn to_input(&self) -> CalcResult<RoiInput> {
        use RoiInput::*;

        let input = match (self.invested, self.returned, self.gain, self.roi) {
            (Some(invested), Some(returned), ..) => InvestedReturned { invested, returned },
            (Some(invested), None, Some(gain), _) => InvestedGain { invested, gain },
            (Some(invested), None, None, Some(roi)) => InvestedRoi { invested, roi },
            (None, Some(returned), Some(gain), _) => ReturnedGain { returned, gain },
            (None, Some(returned), None, Some(roi)) => ReturnedRoi { returned, roi },
            (None, None, Some(gain), Some(roi)) => GainRoi { gain, roi },
            _ => {
                return Err(CalcError::InsufficientInput(
                    "provide two of amount invested, amount returned, gain and ROI".to_string(),
                ))
            }
        };
        Ok(input)
    }

    pub fn calculate(&self) -> CalcResult<RoiResult> {
        self.to_input()?.calculate(self.period)
    }
}

impl RoiInput {
    fn validate(&self) -> CalcResult<()> {
        use RoiInput::*;

        let mut v = Validator::new();
        match *self {
            InvestedReturned { invested, returned } => {
                v.positive("amount invested", invested).non_negative("amount returned", returned);
            }
            InvestedGain { invested, gain } => {
                v.positive("amount invested", invested).finite("gain", gain);
            }
            InvestedRoi { invested, roi } => {
                v.positive("amount invested", invested).finite("ROI", roi);
            }
            ReturnedGain { returned, gain } => {
                v.non_negative("amount returned", returned).finite("gain", gain);
            }
            ReturnedRoi { returned, roi } => {
                v.non_negative("amount returned", returned).finite("ROI", roi);
            }
            GainRoi { gain, roi } => {
                v.finite("gain", gain).finite("ROI", roi);
            }
        }
        v.finish()
    }

    pub fn calculate(&self, period: Option<HoldingPeriod>) -> CalcResult<RoiResult> {
        use RoiInput::*;

        self.validate()?;

        let (invested, returned) = match *self {
            InvestedReturned { invested, returned } => (invested, returned),
            InvestedGain { invested, gain } => (invested, invested + gain),
            InvestedRoi { invested, roi } => (invested, invested * (1.0 + roi / 100.0)),
            ReturnedGain { returned, gain } => (returned - gain, returned),
            ReturnedRoi { returned, roi } => {
                let multiple = 1.0 + roi / 100.0;
                if multiple == 0.0 {
                    return Err(CalcError::domain(
                        "an ROI of -100% leaves nothing returned; the amount invested is undetermined",
                    ));
                }
                (returned / multiple, returned)
            }
            GainRoi { gain, roi } => {
                if roi == 0.0 {
                    if gain == 0.0 {
                        return Err(CalcError::InsufficientInput(
                            "zero gain with zero ROI does not determine the amount invested".to_string(),
                        ));
                    }
                    return Err(CalcError::domain("a non-zero gain cannot have a 0% ROI"));
                }
                let invested = gain / (roi / 100.0);
                (invested, invested + gain)
            }
        };

        let mut v = Validator::new();
        v.check(invested > 0.0, "the values imply an amount invested of zero or less")
            .check(returned >= 0.0, "the values imply a negative amount returned");
        v.finish()?;

        let gain = returned - invested;
        let years = period.map(|p| p.years()).transpose()?;
        let annualized_roi = years.map(|y| ((returned / invested).powf(1.0 / y) - 1.0) * 100.0);

        Ok(RoiResult {
            invested,
            returned,
            gain,
            roi: gain / invested * 100.0,
            annualized_roi,
            years,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_basic_roi() {
        let result = RoiInput::InvestedReturned { invested: 1_000.0, returned: 2_000.0 }
            .calculate(Some(HoldingPeriod::Years(5.0)))
            .unwrap();
        assert_abs_diff_eq!(result.gain, 1_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.roi, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.annualized_roi.unwrap(), 14.8698, epsilon = 1e-4);
    }

    #[test]
    fn test_pairs_round_trip() {
        let inputs = [
            RoiInput::InvestedGain { invested: 800.0, gain: 200.0 },
            RoiInput::InvestedRoi { invested: 800.0, roi: 25.0 },
            RoiInput::ReturnedGain { returned: 1_000.0, gain: 200.0 },
            RoiInput::ReturnedRoi { returned: 1_000.0, roi: 25.0 },
            RoiInput::GainRoi { gain: 200.0, roi: 25.0 },
        ];
        for input in inputs {
            let result = input.calculate(None).unwrap();
            assert_abs_diff_eq!(result.invested, 800.0, epsilon = 1e-9);
            assert_abs_diff_eq!(result.returned, 1_000.0, epsilon = 1e-9);
            assert_eq!(result.annualized_roi, None);
        }
    }

    #[test]
    fn test_dated_period() {
        let period = HoldingPeriod::Dates {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        };
        assert_abs_diff_eq!(period.years().unwrap(), 731.0 / 365.0, epsilon = 1e-12);

        let backwards = HoldingPeriod::Dates {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert!(backwards.years().is_err());
    }

    #[test]
    fn test_degenerate_divisions_guarded() {
        let result = RoiInput::ReturnedRoi { returned: 100.0, roi: -100.0 }.calculate(None);
        assert!(matches!(result, Err(CalcError::Domain(_))));

        let result = RoiInput::GainRoi { gain: 50.0, roi: 0.0 }.calculate(None);
        assert!(matches!(result, Err(CalcError::Domain(_))));

        let result = RoiInput::InvestedReturned { invested: 0.0, returned: 10.0 }.calculate(None);
        assert!(matches!(result, Err(CalcError::InvalidInput(_))));
    }

    #[test]
    fn test_total_loss() {
        let result = RoiInput::InvestedReturned { invested: 500.0, returned: 0.0 }
            .calculate(Some(HoldingPeriod::Years(2.0)))
            .unwrap();
        assert_abs_diff_eq!(result.roi, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.annualized_roi.unwrap(), -100.0, epsilon = 1e-9);
    }
}
