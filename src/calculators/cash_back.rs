//! Cash back rebate versus low-interest financing
//!
//! Compares taking a dealer rebate with a standard loan rate against
//! forgoing the rebate for a promotional rate.

use serde::{Deserialize, Serialize};

use crate::amortization::payment;
use crate::error::CalcResult;
use crate::validation::Validator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashBackInput {
    pub vehicle_price: f64,
    pub cash_back: f64,
    /// Loan rate in percent when taking the cash back
    pub cash_back_rate: f64,
    /// Promotional rate in percent when forgoing the cash back
    pub low_interest_rate: f64,
    pub term_months: u32,
    #[serde(default)]
    pub down_payment: f64,
    #[serde(default)]
    pub trade_in_value: f64,
    /// Sales tax in percent, charged on the price after trade-in
    #[serde(default)]
    pub sales_tax_rate: f64,
    /// Title, registration and other fees rolled into the loan
    #[serde(default)]
    pub fees: f64,
}

/// One financing option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingOption {
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub total_payments: f64,
    pub total_interest: f64,
    /// Down payment plus all loan payments
    pub total_cost: f64,
}

/// Months until the cheaper payment of the low-interest loan makes up for the
/// forgone rebate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakEven {
    Months(u32),
    /// The cash back loan's payment is not higher, so the savings never accrue
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    CashBack,
    LowInterest,
    Either,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashBackResult {
    pub cash_back_option: FinancingOption,
    pub low_interest_option: FinancingOption,
    /// Positive when the low-interest option costs less overall
    pub savings: f64,
    pub recommendation: Recommendation,
    pub break_even: BreakEven,
}

/// Smallest whole number of months for which the cumulative monthly savings
/// reach the cash back amount
pub fn break_even_months(cash_back_payment: f64, low_interest_payment: f64, cash_back: f64) -> BreakEven {
    let monthly_savings = cash_back_payment - low_interest_payment;
    if !(monthly_savings > 0.0) {
        return BreakEven::None;
    }
    if cash_back <= 0.0 {
        return BreakEven::Months(0);
    }
    // Absorb representation error so an exact multiple is not pushed up a month
    let months = (cash_back / monthly_savings - 1e-9).ceil();
    BreakEven::Months(months.max(0.0) as u32)
}

impl CashBackInput {
    fn validate(&self) -> CalcResult<()> {
        let mut v = Validator::new();
        v.non_negative("vehicle price", self.vehicle_price)
            .non_negative("cash back", self.cash_back)
            .non_negative("cash back loan rate", self.cash_back_rate)
            .non_negative("low interest rate", self.low_interest_rate)
            .non_negative("down payment", self.down_payment)
            .non_negative("trade-in value", self.trade_in_value)
            .percent_within("sales tax", self.sales_tax_rate, 0.0, 100.0)
            .non_negative("fees", self.fees)
            .check(self.term_months > 0, "loan term must be at least one month")
            .periods("loan term", self.term_months as f64)
            .check(
                self.trade_in_value <= self.vehicle_price,
                "trade-in value cannot exceed the vehicle price",
            )
            .check(
                self.loan_amount(self.cash_back) >= 0.0,
                "cash back, down payment and trade-in cannot exceed the price plus tax and fees",
            );
        v.finish()
    }

    /// Price plus tax and fees, less the rebate, down payment and trade-in
    fn loan_amount(&self, rebate: f64) -> f64 {
        let tax = (self.vehicle_price - self.trade_in_value) * self.sales_tax_rate / 100.0;
        self.vehicle_price + tax + self.fees - rebate - self.down_payment - self.trade_in_value
    }

    fn option(&self, rebate: f64, annual_rate: f64) -> CalcResult<FinancingOption> {
        let loan_amount = self.loan_amount(rebate);

        let monthly_payment = payment(loan_amount, annual_rate / 100.0 / 12.0, self.term_months)?;
        let total_payments = monthly_payment * self.term_months as f64;

        Ok(FinancingOption {
            loan_amount,
            monthly_payment,
            total_payments,
            total_interest: total_payments - loan_amount,
            total_cost: total_payments + self.down_payment,
        })
    }

    pub fn calculate(&self) -> CalcResult<CashBackResult> {
        self.validate()?;

        let cash_back_option = self.option(self.cash_back, self.cash_back_rate)?;
        let low_interest_option = self.option(0.0, self.low_interest_rate)?;

        let savings = cash_back_option.total_cost - low_interest_option.total_cost;
        let recommendation = if savings.abs() < 0.005 {
            Recommendation::Either
        } else if savings > 0.0 {
            Recommendation::LowInterest
        } else {
            Recommendation::CashBack
        };

        let break_even = break_even_months(
            cash_back_option.monthly_payment,
            low_interest_option.monthly_payment,
            self.cash_back,
        );

        Ok(CashBackResult {
            cash_back_option,
            low_interest_option,
            savings,
            recommendation,
            break_even,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_break_even_example() {
        // 2000 / 6.46 = 309.6, so 310 months
        assert_eq!(break_even_months(444.65, 438.19, 2_000.0), BreakEven::Months(310));
    }

    #[test]
    fn test_no_break_even_when_low_rate_payment_higher() {
        assert_eq!(break_even_months(438.19, 444.65, 2_000.0), BreakEven::None);
        assert_eq!(break_even_months(438.19, 438.19, 2_000.0), BreakEven::None);
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(break_even_months(110.0, 100.0, 100.0), BreakEven::Months(10));
    }

    fn sample() -> CashBackInput {
        CashBackInput {
            vehicle_price: 25_000.0,
            cash_back: 2_000.0,
            cash_back_rate: 6.0,
            low_interest_rate: 1.9,
            term_months: 60,
            down_payment: 3_000.0,
            trade_in_value: 0.0,
            sales_tax_rate: 0.0,
            fees: 0.0,
        }
    }

    #[test]
    fn test_options_priced() {
        let result = sample().calculate().unwrap();

        assert_abs_diff_eq!(result.cash_back_option.loan_amount, 20_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.low_interest_option.loan_amount, 22_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.cash_back_option.monthly_payment, 386.66, epsilon = 0.01);
        assert_abs_diff_eq!(result.low_interest_option.monthly_payment, 384.65, epsilon = 0.01);

        assert_eq!(result.recommendation, Recommendation::LowInterest);
        assert!(matches!(result.break_even, BreakEven::Months(m) if m > 60));
    }

    #[test]
    fn test_cash_back_wins_at_high_promo_rate() {
        let input = CashBackInput { low_interest_rate: 5.5, ..sample() };
        let result = input.calculate().unwrap();
        assert_eq!(result.recommendation, Recommendation::CashBack);
        assert_eq!(result.break_even, BreakEven::None);
    }

    #[test]
    fn test_tax_and_fees_financed() {
        let input = CashBackInput {
            sales_tax_rate: 8.0,
            fees: 500.0,
            trade_in_value: 5_000.0,
            ..sample()
        };
        let result = input.calculate().unwrap();
        // 25,000 + 8% of 20,000 + 500 - 2,000 - 3,000 - 5,000
        assert_abs_diff_eq!(result.cash_back_option.loan_amount, 17_100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_excess_down_payment_rejected() {
        let input = CashBackInput {
            vehicle_price: 10_000.0,
            cash_back: 4_000.0,
            down_payment: 8_000.0,
            ..sample()
        };
        let err = input.calculate().unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
        assert_eq!(err.messages().len(), 1);

        // Exactly covering the price leaves a zero loan
        let input = CashBackInput { down_payment: 6_000.0, ..input };
        let result = input.calculate().unwrap();
        assert_abs_diff_eq!(result.cash_back_option.loan_amount, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.cash_back_option.total_cost, 6_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trade_in_above_price_rejected() {
        let input = CashBackInput {
            vehicle_price: 10_000.0,
            trade_in_value: 12_000.0,
            cash_back: 0.0,
            down_payment: 0.0,
            ..sample()
        };
        assert!(matches!(input.calculate(), Err(CalcError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_term_rejected() {
        let input = CashBackInput { term_months: 0, ..sample() };
        assert!(input.calculate().is_err());

        let input = CashBackInput { term_months: u32::MAX, ..sample() };
        assert!(matches!(input.calculate(), Err(CalcError::InvalidInput(_))));
    }
}
