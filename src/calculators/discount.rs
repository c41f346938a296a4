//! Discount: original price, percent off, amount off and final price

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::validation::Validator;

/// The pair of known values. `percent` is the discount in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "given", rename_all = "snake_case")]
pub enum DiscountInput {
    OriginalPercent { original: f64, percent: f64 },
    OriginalAmount { original: f64, amount: f64 },
    OriginalFinal { original: f64, final_price: f64 },
    FinalPercent { final_price: f64, percent: f64 },
    FinalAmount { final_price: f64, amount: f64 },
    PercentAmount { percent: f64, amount: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountResult {
    pub original_price: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub final_price: f64,
    pub savings: f64,
}

/// Optional-field form of the inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscountRequest {
    pub original_price: Option<f64>,
    pub discount_percent: Option<f64>,
    pub discount_amount: Option<f64>,
    pub final_price: Option<f64>,
}

impl DiscountRequest {
    pub fn to_input(&self) -> CalcResult<DiscountInput> {
        use DiscountInput::*;

        let input = match (self.original_price, self.discount_percent, self.discount_amount, self.final_price) {
            (Some(original), Some(percent), ..) => OriginalPercent { original, percent },
            (Some(original), None, Some(amount), _) => OriginalAmount { original, amount },
            (Some(original), None, None, Some(final_price)) => OriginalFinal { original, final_price },
            (None, Some(percent), _, Some(final_price)) => FinalPercent { final_price, percent },
            (None, Some(percent), Some(amount), None) => PercentAmount { percent, amount },
            (None, None, Some(amount), Some(final_price)) => FinalAmount { final_price, amount },
            _ => {
                return Err(CalcError::InsufficientInput(
                    "provide two of original price, discount percent, discount amount and final price"
                        .to_string(),
                ))
            }
        };
        Ok(input)
    }

    pub fn calculate(&self) -> CalcResult<DiscountResult> {
        self.to_input()?.calculate()
    }
}

impl DiscountInput {
    fn validate(&self) -> CalcResult<()> {
        use DiscountInput::*;

        let mut v = Validator::new();
        match *self {
            OriginalPercent { original, percent } => {
                v.non_negative("original price", original)
                    .percent_within("discount percent", percent, 0.0, 100.0);
            }
            OriginalAmount { original, amount } => {
                v.non_negative("original price", original)
                    .non_negative("discount amount", amount)
                    .check(amount <= original, "discount amount cannot exceed the original price");
            }
            OriginalFinal { original, final_price } => {
                v.non_negative("original price", original)
                    .non_negative("final price", final_price)
                    .check(final_price <= original, "final price cannot exceed the original price");
            }
            FinalPercent { final_price, percent } => {
                v.non_negative("final price", final_price)
                    .percent_within("discount percent", percent, 0.0, 100.0);
            }
            FinalAmount { final_price, amount } => {
                v.non_negative("final price", final_price)
                    .non_negative("discount amount", amount);
            }
            PercentAmount { percent, amount } => {
                v.percent_within("discount percent", percent, 0.0, 100.0)
                    .non_negative("discount amount", amount);
            }
        }
        v.finish()
    }

    /// True when the knowns force every price to zero
    fn degenerate(&self) -> bool {
        use DiscountInput::*;

        match *self {
            OriginalPercent { original, .. } | OriginalAmount { original, .. } | OriginalFinal { original, .. } => {
                original == 0.0
            }
            FinalPercent { final_price, .. } => final_price == 0.0,
            FinalAmount { final_price, amount } => final_price == 0.0 && amount == 0.0,
            PercentAmount { amount, .. } => amount == 0.0,
        }
    }

    pub fn calculate(&self) -> CalcResult<DiscountResult> {
        use DiscountInput::*;

        self.validate()?;
        if self.degenerate() {
            return Err(CalcError::InsufficientInput(
                "the supplied prices are all zero; at least one amount must be non-zero".to_string(),
            ));
        }

        let original = match *self {
            OriginalPercent { original, .. }
            | OriginalAmount { original, .. }
            | OriginalFinal { original, .. } => original,
            FinalPercent { final_price, percent } => {
                let kept = 1.0 - percent / 100.0;
                if kept == 0.0 {
                    return Err(CalcError::domain("a 100% discount cannot leave a non-zero final price"));
                }
                final_price / kept
            }
            FinalAmount { final_price, amount } => final_price + amount,
            PercentAmount { percent, amount } => {
                if percent == 0.0 {
                    return Err(CalcError::domain("a 0% discount cannot produce a non-zero discount amount"));
                }
                amount / (percent / 100.0)
            }
        };

        let amount = match *self {
            OriginalPercent { percent, .. } => original * percent / 100.0,
            OriginalAmount { amount, .. } | FinalAmount { amount, .. } | PercentAmount { amount, .. } => amount,
            OriginalFinal { final_price, .. } => original - final_price,
            FinalPercent { final_price, .. } => original - final_price,
        };

        let percent = match *self {
            OriginalPercent { percent, .. } | FinalPercent { percent, .. } | PercentAmount { percent, .. } => {
                percent
            }
            _ if original == 0.0 => 0.0,
            _ => amount / original * 100.0,
        };

        Ok(DiscountResult {
            original_price: original,
            discount_percent: percent,
            discount_amount: amount,
            final_price: original - amount,
            savings: amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_thirty_percent_off() {
        let result = DiscountInput::OriginalPercent { original: 200.0, percent: 30.0 }
            .calculate()
            .unwrap();
        assert_abs_diff_eq!(result.discount_amount, 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.final_price, 140.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.savings, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_all_pairs_agree() {
        let inputs = [
            DiscountInput::OriginalAmount { original: 200.0, amount: 60.0 },
            DiscountInput::OriginalFinal { original: 200.0, final_price: 140.0 },
            DiscountInput::FinalPercent { final_price: 140.0, percent: 30.0 },
            DiscountInput::FinalAmount { final_price: 140.0, amount: 60.0 },
            DiscountInput::PercentAmount { percent: 30.0, amount: 60.0 },
        ];
        for input in inputs {
            let result = input.calculate().unwrap();
            assert_abs_diff_eq!(result.original_price, 200.0, epsilon = 1e-9);
            assert_abs_diff_eq!(result.discount_percent, 30.0, epsilon = 1e-9);
            assert_abs_diff_eq!(result.final_price, 140.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_full_discount_from_final_price_is_guarded() {
        let result = DiscountInput::FinalPercent { final_price: 50.0, percent: 100.0 }.calculate();
        assert!(matches!(result, Err(CalcError::Domain(_))));

        let result = DiscountInput::FinalPercent { final_price: 0.0, percent: 100.0 }.calculate();
        assert!(matches!(result, Err(CalcError::InsufficientInput(_))));
    }

    #[test]
    fn test_all_zero_prices_are_insufficient() {
        let inputs = [
            DiscountInput::OriginalPercent { original: 0.0, percent: 0.0 },
            DiscountInput::OriginalAmount { original: 0.0, amount: 0.0 },
            DiscountInput::OriginalFinal { original: 0.0, final_price: 0.0 },
            DiscountInput::FinalPercent { final_price: 0.0, percent: 20.0 },
            DiscountInput::FinalAmount { final_price: 0.0, amount: 0.0 },
            DiscountInput::PercentAmount { percent: 15.0, amount: 0.0 },
            DiscountInput::PercentAmount { percent: 0.0, amount: 0.0 },
        ];
        for input in inputs {
            assert!(
                matches!(input.calculate(), Err(CalcError::InsufficientInput(_))),
                "{:?}",
                input
            );
        }

        // A free item after a full discount is still a valid answer
        let result = DiscountInput::FinalAmount { final_price: 0.0, amount: 25.0 }
            .calculate()
            .unwrap();
        assert_abs_diff_eq!(result.discount_percent, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_percent_with_amount_is_guarded() {
        let result = DiscountInput::PercentAmount { percent: 0.0, amount: 10.0 }.calculate();
        assert!(matches!(result, Err(CalcError::Domain(_))));
    }

    #[test]
    fn test_final_above_original_rejected() {
        let result = DiscountInput::OriginalFinal { original: 100.0, final_price: 120.0 }.calculate();
        assert!(matches!(result, Err(CalcError::InvalidInput(_))));

        let result = DiscountInput::OriginalAmount { original: 100.0, amount: 150.0 }.calculate();
        assert!(matches!(result, Err(CalcError::InvalidInput(_))));
    }

    #[test]
    fn test_request_dispatch() {
        let request = DiscountRequest {
            original_price: Some(80.0),
            final_price: Some(60.0),
            ..Default::default()
        };
        let result = request.calculate().unwrap();
        assert_abs_diff_eq!(result.discount_percent, 25.0, epsilon = 1e-9);

        let request = DiscountRequest { discount_percent: Some(10.0), ..Default::default() };
        assert!(matches!(request.calculate(), Err(CalcError::InsufficientInput(_))));
    }
}
