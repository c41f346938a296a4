//! Auto lease payment

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::validation::Validator;

/// Convert an APR in percent to a lease money factor
pub fn money_factor_from_apr(apr: f64) -> f64 {
    apr / 2400.0
}

pub fn apr_from_money_factor(money_factor: f64) -> f64 {
    money_factor * 2400.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseRate {
    /// Annual percentage rate in percent
    Apr(f64),
    MoneyFactor(f64),
}

impl LeaseRate {
    pub fn money_factor(&self) -> f64 {
        match *self {
            LeaseRate::Apr(apr) => money_factor_from_apr(apr),
            LeaseRate::MoneyFactor(mf) => mf,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualValue {
    Amount(f64),
    /// Percent of the vehicle price
    Percent(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseInput {
    pub vehicle_price: f64,
    #[serde(default)]
    pub down_payment: f64,
    #[serde(default)]
    pub trade_in_value: f64,
    /// Sales tax in percent, applied to each monthly payment
    #[serde(default)]
    pub sales_tax_rate: f64,
    pub term_months: u32,
    pub residual: ResidualValue,
    pub rate: LeaseRate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseResult {
    pub capitalized_cost: f64,
    pub residual_value: f64,
    pub money_factor: f64,
    /// APR equivalent of the money factor, in percent
    pub apr: f64,
    pub depreciation_fee: f64,
    pub finance_fee: f64,
    /// Monthly payment before tax
    pub base_payment: f64,
    pub monthly_tax: f64,
    pub monthly_payment: f64,
    /// All monthly payments plus the down payment and trade-in
    pub total_cost: f64,
    pub total_interest: f64,
}

impl LeaseInput {
    fn validate(&self) -> CalcResult<()> {
        let mut v = Validator::new();
        v.non_negative("vehicle price", self.vehicle_price)
            .non_negative("down payment", self.down_payment)
            .non_negative("trade-in value", self.trade_in_value)
            .percent_within("sales tax", self.sales_tax_rate, 0.0, 100.0)
            .check(self.term_months > 0, "lease term must be at least one month");
        match self.residual {
            ResidualValue::Amount(amount) => {
                v.non_negative("residual value", amount);
            }
            ResidualValue::Percent(pct) => {
                v.percent_within("residual value", pct, 0.0, 100.0);
            }
        }
        match self.rate {
            LeaseRate::Apr(apr) => {
                v.non_negative("interest rate", apr);
            }
            LeaseRate::MoneyFactor(mf) => {
                v.non_negative("money factor", mf);
            }
        }
        v.finish()
    }

    pub fn calculate(&self) -> CalcResult<LeaseResult> {
        self.validate()?;

        let capitalized_cost = self.vehicle_price - self.down_payment - self.trade_in_value;
        let residual_value = match self.residual {
            ResidualValue::Amount(amount) => amount,
            ResidualValue::Percent(pct) => self.vehicle_price * pct / 100.0,
        };

        let mut v = Validator::new();
        v.check(
            capitalized_cost >= 0.0,
            "down payment and trade-in cannot exceed the vehicle price",
        )
        .check(
            residual_value <= capitalized_cost,
            "residual value cannot exceed the capitalized cost",
        );
        v.finish()?;

        let term = self.term_months as f64;
        let money_factor = self.rate.money_factor();
        let depreciation_fee = (capitalized_cost - residual_value) / term;
        let finance_fee = (capitalized_cost + residual_value) * money_factor;
        let base_payment = depreciation_fee + finance_fee;
        let monthly_tax = base_payment * self.sales_tax_rate / 100.0;
        let monthly_payment = base_payment + monthly_tax;

        Ok(LeaseResult {
            capitalized_cost,
            residual_value,
            money_factor,
            apr: apr_from_money_factor(money_factor),
            depreciation_fee,
            finance_fee,
            base_payment,
            monthly_tax,
            monthly_payment,
            total_cost: monthly_payment * term + self.down_payment + self.trade_in_value,
            total_interest: finance_fee * term,
        })
    }
}
