//! Error taxonomy shared by every calculator

use thiserror::Error;

/// Failure of a single calculation call.
///
/// A calculation either returns a complete result or one of these; there is
/// never a partially filled result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// One or more inputs violate their validation rules.
    #[error("invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),

    /// Fewer known values than needed to determine the rest.
    #[error("insufficient input: {0}")]
    InsufficientInput(String),

    /// The inputs are individually valid but the formula is undefined for them
    /// (zero denominator, logarithm of a non-positive value, ...).
    #[error("domain error: {0}")]
    Domain(String),

    /// The iterative rate solver could not drive the residual below tolerance.
    #[error("rate solver did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergence { iterations: u32, residual: f64 },

    #[error("unknown frequency '{0}'")]
    UnknownFrequency(String),

    #[error("no tax table for year {0}")]
    UnsupportedTaxYear(u16),
}

impl CalcError {
    /// Shorthand for a single invalid-input message
    pub fn invalid(message: impl Into<String>) -> Self {
        CalcError::InvalidInput(vec![message.into()])
    }

    pub fn domain(message: impl Into<String>) -> Self {
        CalcError::Domain(message.into())
    }

    /// Validation messages carried by the error, if any
    pub fn messages(&self) -> Vec<String> {
        match self {
            CalcError::InvalidInput(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;
