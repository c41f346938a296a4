//! Input validation that accumulates every violation instead of stopping at the first

use crate::error::{CalcError, CalcResult};

/// Longest horizon any calculator accepts
pub const MAX_YEARS: f64 = 1_000.0;

/// Most periods any schedule or engine will walk
pub const MAX_PERIODS: u32 = 100_000;

/// Collects human-readable validation messages for one calculation call.
#[derive(Debug, Default)]
pub struct Validator {
    messages: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation when `condition` is false
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.messages.push(message.into());
        }
        self
    }

    pub fn finite(&mut self, name: &str, value: f64) -> &mut Self {
        self.check(value.is_finite(), format!("{name} must be a finite number"))
    }

    pub fn non_negative(&mut self, name: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            return self.finite(name, value);
        }
        self.check(value >= 0.0, format!("{name} must not be negative"))
    }

    pub fn positive(&mut self, name: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            return self.finite(name, value);
        }
        self.check(value > 0.0, format!("{name} must be greater than zero"))
    }

    /// Percentage in the closed range `[min, max]`
    pub fn percent_within(&mut self, name: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !value.is_finite() {
            return self.finite(name, value);
        }
        self.check(
            value >= min && value <= max,
            format!("{name} must be between {min} and {max} percent"),
        )
    }

    /// Percentage in the half-open range `[0, 100)`
    pub fn percent_below_hundred(&mut self, name: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            return self.finite(name, value);
        }
        self.check(
            (0.0..100.0).contains(&value),
            format!("{name} must be at least 0 and less than 100 percent"),
        )
    }

    /// Horizon in years in `(0, MAX_YEARS]`
    pub fn years(&mut self, name: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            return self.finite(name, value);
        }
        self.check(
            value > 0.0 && value <= MAX_YEARS,
            format!("{name} must be greater than zero and at most {MAX_YEARS}"),
        )
    }

    /// Period count no greater than `MAX_PERIODS`
    pub fn periods(&mut self, name: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            return self.finite(name, value);
        }
        self.check(
            value <= MAX_PERIODS as f64,
            format!("{name} cannot exceed {MAX_PERIODS} periods"),
        )
    }

    /// Finish validation: `Ok(())` if nothing was recorded
    pub fn finish(&mut self) -> CalcResult<()> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(CalcError::InvalidInput(std::mem::take(&mut self.messages)))
        }
    }
}
