//! JSON request envelope shared by the CLI and the Lambda handler
//!
//! A request names its calculator in a `calculator` field next to that
//! calculator's inputs:
//!
//! ```json
//! {"calculator": "tvm", "solve_for": "fv", "n": 120, "iy": 6, "pv": -5000, "pmt": 0}
//! ```

use serde::{Deserialize, Serialize};

use crate::amortization::{LoanInput, LoanResult};
use crate::calculators::{
    BreakEven, CashBackInput, CashBackResult, DiscountRequest, DiscountResult, LeaseInput, LeaseResult,
    MarginRequest, MarginResult, MarriageOutcome, MarriageTaxInput, MarriageTaxResult, RoiRequest, RoiResult,
};
use crate::error::CalcResult;
use crate::format::{currency, percent};
use crate::growth::{
    AnnuityInput, AnnuityPayoutInput, AnnuityPayoutResult, CompoundInput, CompoundResult, InvestmentInput,
    InvestmentResult, SimpleInterestInput, SimpleInterestResult,
};
use crate::tax::TaxTables;
use crate::tvm::{TvmRequest, TvmResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculatorRequest {
    Tvm(TvmRequest),
    Loan(LoanInput),
    SimpleInterest(SimpleInterestInput),
    CompoundInterest(CompoundInput),
    Investment(InvestmentInput),
    Annuity(AnnuityInput),
    AnnuityPayout(AnnuityPayoutInput),
    Margin(MarginRequest),
    Discount(DiscountRequest),
    Roi(RoiRequest),
    CashBack(CashBackInput),
    AutoLease(LeaseInput),
    MarriageTax(MarriageTaxInput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", content = "result", rename_all = "snake_case")]
pub enum CalculatorResponse {
    Tvm(TvmResult),
    Loan(LoanResult),
    SimpleInterest(SimpleInterestResult),
    CompoundInterest(CompoundResult),
    Investment(InvestmentResult),
    Annuity(InvestmentResult),
    AnnuityPayout(AnnuityPayoutResult),
    Margin(MarginResult),
    Discount(DiscountResult),
    Roi(RoiResult),
    CashBack(CashBackResult),
    AutoLease(LeaseResult),
    MarriageTax(MarriageTaxResult),
}

impl CalculatorRequest {
    pub fn name(&self) -> &'static str {
        match self {
            CalculatorRequest::Tvm(_) => "tvm",
            CalculatorRequest::Loan(_) => "loan",
            CalculatorRequest::SimpleInterest(_) => "simple_interest",
            CalculatorRequest::CompoundInterest(_) => "compound_interest",
            CalculatorRequest::Investment(_) => "investment",
            CalculatorRequest::Annuity(_) => "annuity",
            CalculatorRequest::AnnuityPayout(_) => "annuity_payout",
            CalculatorRequest::Margin(_) => "margin",
            CalculatorRequest::Discount(_) => "discount",
            CalculatorRequest::Roi(_) => "roi",
            CalculatorRequest::CashBack(_) => "cash_back",
            CalculatorRequest::AutoLease(_) => "auto_lease",
            CalculatorRequest::MarriageTax(_) => "marriage_tax",
        }
    }

    /// Run the calculator. `tax` is only consulted by the marriage tax calculator.
    pub fn evaluate(&self, tax: &TaxTables) -> CalcResult<CalculatorResponse> {
        log::debug!("evaluating {} request", self.name());

        Ok(match self {
            CalculatorRequest::Tvm(r) => CalculatorResponse::Tvm(r.solve()?),
            CalculatorRequest::Loan(r) => CalculatorResponse::Loan(r.calculate()?),
            CalculatorRequest::SimpleInterest(r) => CalculatorResponse::SimpleInterest(r.calculate()?),
            CalculatorRequest::CompoundInterest(r) => CalculatorResponse::CompoundInterest(r.calculate()?),
            CalculatorRequest::Investment(r) => CalculatorResponse::Investment(r.calculate()?),
            CalculatorRequest::Annuity(r) => CalculatorResponse::Annuity(r.calculate()?),
            CalculatorRequest::AnnuityPayout(r) => CalculatorResponse::AnnuityPayout(r.calculate()?),
            CalculatorRequest::Margin(r) => CalculatorResponse::Margin(r.calculate()?),
            CalculatorRequest::Discount(r) => CalculatorResponse::Discount(r.calculate()?),
            CalculatorRequest::Roi(r) => CalculatorResponse::Roi(r.calculate()?),
            CalculatorRequest::CashBack(r) => CalculatorResponse::CashBack(r.calculate()?),
            CalculatorRequest::AutoLease(r) => CalculatorResponse::AutoLease(r.calculate()?),
            CalculatorRequest::MarriageTax(r) => CalculatorResponse::MarriageTax(r.calculate(tax)?),
        })
    }
}

fn money(label: &'static str, amount: f64) -> (&'static str, String) {
    (label, currency(amount))
}

fn pct(label: &'static str, value: f64) -> (&'static str, String) {
    (label, percent(value, 2))
}

impl CalculatorResponse {
    /// Headline figures as label/value pairs for display
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        match self {
            CalculatorResponse::Tvm(r) => vec![
                ("Solved for", r.solved_for.to_string()),
                ("N", format!("{:.4}", r.n)),
                ("I/Y", percent(r.iy, 6)),
                ("PV", format!("{:.2}", r.pv)),
                ("PMT", format!("{:.2}", r.pmt)),
                ("FV", format!("{:.2}", r.fv)),
                ("P/Y, C/Y", format!("{}, {}", r.py, r.cy)),
                ("Timing", r.timing.to_string()),
            ],
            CalculatorResponse::Loan(r) => {
                let mut lines = vec![
                    money("Payment", r.payment),
                    ("Payments", r.periods.to_string()),
                    money("Total payments", r.total_payments),
                    money("Total interest", r.total_interest),
                ];
                if let Some(date) = r.payoff_date {
                    lines.push(("Payoff date", date.to_string()));
                }
                lines
            }
            CalculatorResponse::SimpleInterest(r) => {
                vec![money("Interest", r.interest), money("Total", r.total)]
            }
            CalculatorResponse::CompoundInterest(r) => vec![
                money("Future value", r.future_value),
                money("Total contributions", r.total_contributions),
                money("Total interest", r.total_interest),
            ],
            CalculatorResponse::Investment(r) | CalculatorResponse::Annuity(r) => vec![
                money("End balance", r.end_balance),
                money("Total contributions", r.total_contributions),
                money("Total interest", r.total_interest),
            ],
            CalculatorResponse::AnnuityPayout(r) => vec![
                money("Payout", r.payout),
                ("Payouts", r.payouts.to_string()),
                money("Total paid out", r.total_payout),
                money("Interest earned", r.interest_earned),
            ],
            CalculatorResponse::Margin(r) => vec![
                money("Cost", r.cost),
                money("Revenue", r.revenue),
                money("Profit", r.profit),
                pct("Margin", r.margin),
                ("Markup", r.markup.map_or_else(|| "undefined".to_string(), |m| percent(m, 2))),
            ],
            CalculatorResponse::Discount(r) => vec![
                money("Original price", r.original_price),
                pct("Discount", r.discount_percent),
                money("Discount amount", r.discount_amount),
                money("Final price", r.final_price),
                money("You save", r.savings),
            ],
            CalculatorResponse::Roi(r) => {
                let mut lines = vec![
                    money("Invested", r.invested),
                    money("Returned", r.returned),
                    money("Gain", r.gain),
                    pct("ROI", r.roi),
                ];
                if let Some(annualized) = r.annualized_roi {
                    lines.push(pct("Annualized ROI", annualized));
                }
                lines
            }
            CalculatorResponse::CashBack(r) => vec![
                money("Cash back payment", r.cash_back_option.monthly_payment),
                money("Cash back total cost", r.cash_back_option.total_cost),
                money("Low interest payment", r.low_interest_option.monthly_payment),
                money("Low interest total cost", r.low_interest_option.total_cost),
                money("Savings with low interest", r.savings),
                ("Recommendation", format!("{:?}", r.recommendation)),
                (
                    "Break-even",
                    match r.break_even {
                        BreakEven::Months(m) => format!("{m} months"),
                        BreakEven::None => "never".to_string(),
                    },
                ),
            ],
            CalculatorResponse::AutoLease(r) => vec![
                money("Capitalized cost", r.capitalized_cost),
                money("Residual value", r.residual_value),
                ("Money factor", format!("{:.5}", r.money_factor)),
                ("Equivalent APR", percent(r.apr, 2)),
                money("Depreciation fee", r.depreciation_fee),
                money("Finance fee", r.finance_fee),
                money("Monthly payment", r.monthly_payment),
                money("Total cost", r.total_cost),
            ],
            CalculatorResponse::MarriageTax(r) => vec![
                ("Tax year", r.year.to_string()),
                money("First filer (single)", r.first.total_tax),
                money("Second filer (single)", r.second.total_tax),
                money("Filing separately", r.separate_total),
                money("Married filing jointly", r.joint.total_tax),
                (
                    match r.outcome {
                        MarriageOutcome::Penalty => "Marriage penalty",
                        MarriageOutcome::Bonus => "Marriage bonus",
                        MarriageOutcome::Neutral => "No change",
                    },
                    currency(r.difference.abs()),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use approx::assert_abs_diff_eq;

    fn evaluate(json: &str) -> CalcResult<CalculatorResponse> {
        let request: CalculatorRequest = serde_json::from_str(json).unwrap();
        request.evaluate(&TaxTables::builtin())
    }

    #[test]
    fn test_tvm_request() {
        let response =
            evaluate(r#"{"calculator": "tvm", "solve_for": "pmt", "n": 360, "iy": 6, "pv": 200000, "fv": 0}"#)
                .unwrap();
        match response {
            CalculatorResponse::Tvm(r) => assert_abs_diff_eq!(r.pmt, -1_199.10, epsilon = 0.01),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_reverse_solve_requests() {
        let response = evaluate(r#"{"calculator": "margin", "cost": 50, "revenue": 100}"#).unwrap();
        assert!(matches!(response, CalculatorResponse::Margin(ref r) if (r.margin - 50.0).abs() < 1e-9));

        let response =
            evaluate(r#"{"calculator": "discount", "original_price": 200, "discount_percent": 30}"#).unwrap();
        let summary = response.summary();
        assert!(summary.contains(&("Final price", "$140.00".to_string())));

        let response = evaluate(
            r#"{"calculator": "roi", "invested": 1000, "returned": 2000, "period": {"years": 5}}"#,
        )
        .unwrap();
        assert!(response.summary().contains(&("Annualized ROI", "14.87%".to_string())));
    }

    #[test]
    fn test_marriage_tax_request_uses_tables() {
        let response = evaluate(
            r#"{"calculator": "marriage_tax", "year": 2024,
                "first": {"wages": 100000}, "second": {"wages": 0}}"#,
        )
        .unwrap();
        let summary = response.summary();
        assert!(summary.contains(&("Marriage bonus", "$5,809.00".to_string())));
    }

    #[test]
    fn test_errors_propagate() {
        let err = evaluate(r#"{"calculator": "tvm", "solve_for": "fv", "n": 10}"#).unwrap_err();
        assert!(err.to_string().contains("I/Y, PV, PMT"));

        let err = evaluate(r#"{"calculator": "marriage_tax", "year": 1980, "first": {"wages": 1}, "second": {"wages": 1}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("1980"));
    }

    #[test]
    fn test_vehicle_summaries() {
        let response = evaluate(
            r#"{"calculator": "auto_lease", "vehicle_price": 50000, "sales_tax_rate": 7, "term_months": 36,
                "residual": {"percent": 50}, "rate": {"money_factor": 0.00125}}"#,
        )
        .unwrap();
        assert!(response.summary().contains(&("Equivalent APR", "3.00%".to_string())));

        let response = evaluate(
            r#"{"calculator": "cash_back", "vehicle_price": 25000, "cash_back": 2000, "cash_back_rate": 6,
                "low_interest_rate": 1.9, "term_months": 60, "down_payment": 3000}"#,
        )
        .unwrap();
        let summary = response.summary();
        let break_even = summary.iter().find(|(label, _)| *label == "Break-even").unwrap();
        assert!(break_even.1.ends_with(" months"));
    }

    #[test]
    fn test_oversized_horizon_is_invalid_input() {
        let err = evaluate(
            r#"{"calculator": "investment", "initial": 0, "annual_rate": 5, "years": 1e9, "compounding": "annually"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
    }

    #[test]
    fn test_response_serializes_with_tag() {
        let response = evaluate(r#"{"calculator": "simple_interest", "principal": 1000, "annual_rate": 5, "years": 2}"#)
            .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["calculator"], "simple_interest");
        assert_abs_diff_eq!(json["result"]["interest"].as_f64().unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_calculator_rejected() {
        let parsed: Result<CalculatorRequest, _> = serde_json::from_str(r#"{"calculator": "horoscope"}"#);
        assert!(parsed.is_err());
    }
}
