//! Level payment and annuity present value

use crate::error::{CalcError, CalcResult};

/// Rates below this are treated as zero to keep the annuity factor stable
pub(crate) const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Level payment that amortizes `principal` over `periods` at `periodic_rate`,
/// paid at the end of each period.
///
/// Negative principal (a receivable) gives a negative payment.
pub fn payment(principal: f64, periodic_rate: f64, periods: u32) -> CalcResult<f64> {
    if periods == 0 {
        return Err(CalcError::invalid("number of periods must be at least 1"));
    }
    if periodic_rate <= -1.0 {
        return Err(CalcError::invalid("periodic rate must be greater than -100%"));
    }

    if periodic_rate.abs() < ZERO_RATE_EPSILON {
        return Ok(principal / periods as f64);
    }

    let growth = (1.0 + periodic_rate).powi(periods as i32);
    Ok(principal * periodic_rate * growth / (growth - 1.0))
}

/// Level payment for an annuity due (first payment immediate)
pub fn payment_due(principal: f64, periodic_rate: f64, periods: u32) -> CalcResult<f64> {
    Ok(payment(principal, periodic_rate, periods)? / (1.0 + periodic_rate))
}
