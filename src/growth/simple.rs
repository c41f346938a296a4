//! Simple interest

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::validation::Validator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleInterestInput {
    pub principal: f64,
    /// Annual rate in percent
    pub annual_rate: f64,
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleInterestResult {
    pub interest: f64,
    pub total: f64,
}

impl SimpleInterestInput {
    /// `interest = principal × rate × time`
    pub fn calculate(&self) -> CalcResult<SimpleInterestResult> {
        let mut v = Validator::new();
        v.non_negative("principal", self.principal)
            .non_negative("interest rate", self.annual_rate)
            .years("years", self.years);
        v.finish()?;

        let interest = self.principal * self.annual_rate / 100.0 * self.years;
        Ok(SimpleInterestResult {
            interest,
            total: self.principal + interest,
        })
    }
}
